use crate::config::mongo_conf::MongoConfig;
use mongodb::{
    options::{ClientOptions, Credential, ResolverConfig},
    Client, Database,
};
use tracing::{info, instrument};

pub const USERS: &str = "users";
pub const SERVICES: &str = "services";
pub const CHATS: &str = "chats";
pub const MESSAGES: &str = "messages";
pub const REVIEWS: &str = "reviews";
pub const SERVICE_REQUESTS: &str = "serviceRequests";
pub const QUESTIONS: &str = "questions";

/// Open one client for the whole process and hand out the database handle.
/// Repositories share it; the driver pools connections internally.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("KabaleMarket".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    info!("MongoDB client created");
    Ok(client.database(&config.database))
}
