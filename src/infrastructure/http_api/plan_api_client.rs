use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error};
use url::Url;

use crate::{
    config::config_model::PlanApi,
    domain::{
        repositories::plans::{PlanAdminRepository, PlanApiError},
        value_objects::plans::{DeletePlanModel, PlanPayload, PlanSaveReceipt},
    },
};

pub const SAVE_PLAN_PATH: &str = "plan/save";
pub const DELETE_PLAN_PATH: &str = "plan/delete";

const ERROR_BODY_LIMIT: usize = 512;

/// JSON client for the plan admin endpoints, built on reqwest.
pub struct PlanApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PlanApiClient {
    pub fn new(config: &PlanApi) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("failed to build plan api http client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PlanApiError> {
        endpoint(&self.base_url, path)
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response, PlanApiError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        error!(
            status = status.as_u16(),
            context, "plan_api: request rejected"
        );
        Err(rejection(status, &body))
    }
}

#[async_trait]
impl PlanAdminRepository for PlanApiClient {
    async fn create_or_update_plan(
        &self,
        payload: PlanPayload,
    ) -> Result<PlanSaveReceipt, PlanApiError> {
        let url = self.endpoint(SAVE_PLAN_PATH)?;
        debug!(%url, plan_id = ?payload.id, "plan_api: posting plan");

        let resp = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;
        let resp = Self::ensure_success(resp, "save plan").await?;

        let body = resp.text().await.map_err(sanitize_reqwest_error)?;
        decode_receipt(&body)
    }

    async fn delete_plan(&self, plan_id: i64) -> Result<(), PlanApiError> {
        let url = self.endpoint(DELETE_PLAN_PATH)?;
        debug!(%url, plan_id, "plan_api: deleting plan");

        let resp = self
            .http
            .post(url)
            .json(&DeletePlanModel { id: plan_id })
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;
        Self::ensure_success(resp, "delete plan").await?;

        Ok(())
    }
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, PlanApiError> {
    base_url
        .join(path)
        .map_err(|err| PlanApiError::Transport(format!("invalid endpoint {}: {}", path, err)))
}

// An empty success body carries no receipt details.
fn decode_receipt(body: &str) -> Result<PlanSaveReceipt, PlanApiError> {
    if body.trim().is_empty() {
        return Ok(PlanSaveReceipt::default());
    }
    serde_json::from_str(body).map_err(|err| PlanApiError::Decode(err.to_string()))
}

fn rejection(status: StatusCode, body: &str) -> PlanApiError {
    let trimmed = body.trim();
    let message = if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.chars().take(ERROR_BODY_LIMIT).collect()
    };

    PlanApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn sanitize_reqwest_error(error: reqwest::Error) -> PlanApiError {
    if error.is_timeout() {
        return PlanApiError::Transport("plan api request timed out".to_string());
    }
    if error.is_connect() {
        return PlanApiError::Transport("plan api connection failed".to_string());
    }
    if error.is_decode() {
        return PlanApiError::Decode("plan api response body could not be read".to_string());
    }
    PlanApiError::Transport("plan api request failed".to_string())
}
