pub mod chat;
pub mod listing;
pub mod question;
pub mod review;
pub mod service_request;
pub mod user;

/// Fresh document id, hex encoded like the database's own ids.
pub fn new_id() -> String {
    bson::oid::ObjectId::new().to_hex()
}
