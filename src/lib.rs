pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::{
    application::usercases::{plan_dialog::PlanDialogUseCase, plan_table::PlanTableUseCase},
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::page_navigator::PlanPageNavigator, value_objects::plan_rows::PlanRowModel,
    },
    infrastructure::http_api::plan_api_client::PlanApiClient,
};

/// Initializes tracing and loads configuration from the environment.
pub fn init(component: &str) -> Result<DotEnvyConfig> {
    let dotenvy_env = config::config_loader::load()?;
    observability::init_observability(component)?;

    info!(
        base_url = %dotenvy_env.plan_api.base_url,
        reference_time_zone = %dotenvy_env.plan_dialog.reference_time_zone,
        "ENV has been loaded"
    );

    Ok(dotenvy_env)
}

/// Wires the plan dialog and table to the HTTP plan API and a page navigator.
pub fn plan_admin<N>(
    config: &DotEnvyConfig,
    navigator: Arc<N>,
    rows: Vec<PlanRowModel>,
) -> Result<(PlanDialogUseCase<PlanApiClient, N>, PlanTableUseCase<N>)>
where
    N: PlanPageNavigator + Send + Sync,
{
    let plan_api_client = PlanApiClient::new(&config.plan_api)?;
    let dialog = PlanDialogUseCase::new(
        Arc::new(plan_api_client),
        Arc::clone(&navigator),
        config.plan_dialog.reference_time_zone,
    );
    let table = PlanTableUseCase::new(navigator, rows, config.plan_dialog.default_row_limit);

    Ok((dialog, table))
}
