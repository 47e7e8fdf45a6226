use crate::model::service_request::ServiceRequest;
use crate::repository::mongo::SERVICE_REQUESTS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::Database;
use tracing::{error, info, instrument};

#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    async fn create(&self, request: ServiceRequest) -> RepositoryResult<ServiceRequest>;
    async fn list_all(&self) -> RepositoryResult<Vec<ServiceRequest>>;
}

pub struct MongoServiceRequestRepository {
    collection: mongodb::Collection<ServiceRequest>,
}

impl MongoServiceRequestRepository {
    pub fn new(db: &Database) -> Self {
        MongoServiceRequestRepository {
            collection: db.collection::<ServiceRequest>(SERVICE_REQUESTS),
        }
    }
}

#[async_trait]
impl ServiceRequestRepository for MongoServiceRequestRepository {
    #[instrument(skip(self, request), fields(title = %request.title))]
    async fn create(&self, request: ServiceRequest) -> RepositoryResult<ServiceRequest> {
        match self.collection.insert_one(&request, None).await {
            Ok(_) => {
                info!("Service request created");
                Ok(request)
            }
            Err(e) => {
                error!("Failed to create service request: {}", e);
                Err(RepositoryError::database(format!("Failed to create service request: {}", e)))
            }
        }
    }

    async fn list_all(&self) -> RepositoryResult<Vec<ServiceRequest>> {
        let cursor = self
            .collection
            .find(None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list service requests: {}", e)))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| RepositoryError::serialization(format!("Failed to deserialize service request: {}", e)))
    }
}
