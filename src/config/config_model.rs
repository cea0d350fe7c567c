use chrono_tz::Tz;
use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub plan_api: PlanApi,
    pub plan_dialog: PlanDialog,
}

#[derive(Debug, Clone)]
pub struct PlanApi {
    pub base_url: Url,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct PlanDialog {
    pub reference_time_zone: Tz,
    pub default_row_limit: u32,
}
