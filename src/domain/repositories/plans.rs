use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::value_objects::plans::{PlanPayload, PlanSaveReceipt};

#[derive(Debug, Error)]
pub enum PlanApiError {
    #[error("plan api transport failure: {0}")]
    Transport(String),
    #[error("plan api rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("plan api response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
#[automock]
pub trait PlanAdminRepository {
    /// Creates a plan when `payload.id` is absent, updates it otherwise.
    async fn create_or_update_plan(
        &self,
        payload: PlanPayload,
    ) -> Result<PlanSaveReceipt, PlanApiError>;
    async fn delete_plan(&self, plan_id: i64) -> Result<(), PlanApiError>;
}
