use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use url::Url;

use super::config_model::{DotEnvyConfig, PlanApi, PlanDialog};

pub const DEFAULT_PLAN_API_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REFERENCE_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;
pub const DEFAULT_ROW_LIMIT: u32 = 100;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

pub fn from_lookup<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let raw_base_url = lookup("PLAN_API_BASE_URL")
        .filter(|v| !v.trim().is_empty())
        .context("PLAN_API_BASE_URL is not set")?;
    let plan_api = PlanApi {
        base_url: parse_base_url(&raw_base_url)?,
        timeout: optional(&lookup, "PLAN_API_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_PLAN_API_TIMEOUT_SECS),
    };

    let reference_time_zone = match lookup("PLAN_REFERENCE_TIME_ZONE")
        .filter(|v| !v.trim().is_empty())
    {
        Some(raw) => Tz::from_str(raw.trim())
            .map_err(|err| anyhow!("PLAN_REFERENCE_TIME_ZONE is invalid: {}", err))?,
        None => DEFAULT_REFERENCE_TIME_ZONE,
    };

    let plan_dialog = PlanDialog {
        reference_time_zone,
        default_row_limit: optional(&lookup, "PLAN_DEFAULT_ROW_LIMIT")?
            .unwrap_or(DEFAULT_ROW_LIMIT),
    };

    Ok(DotEnvyConfig {
        plan_api,
        plan_dialog,
    })
}

// Endpoint paths are joined onto the base, so it must end with a slash.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash).context("PLAN_API_BASE_URL is invalid")
}

fn optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} is invalid", key)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| env.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config =
            from_lookup(lookup_from(&[("PLAN_API_BASE_URL", "https://admin.example.com/apis/v1")]))
                .unwrap();

        assert_eq!(config.plan_api.base_url.as_str(), "https://admin.example.com/apis/v1/");
        assert_eq!(config.plan_api.timeout, DEFAULT_PLAN_API_TIMEOUT_SECS);
        assert_eq!(config.plan_dialog.reference_time_zone, DEFAULT_REFERENCE_TIME_ZONE);
        assert_eq!(config.plan_dialog.default_row_limit, DEFAULT_ROW_LIMIT);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = from_lookup(lookup_from(&[
            ("PLAN_API_BASE_URL", "https://admin.example.com/"),
            ("PLAN_API_TIMEOUT_SECS", "3"),
            ("PLAN_REFERENCE_TIME_ZONE", "Europe/Berlin"),
            ("PLAN_DEFAULT_ROW_LIMIT", "25"),
        ]))
        .unwrap();

        assert_eq!(config.plan_api.timeout, 3);
        assert_eq!(config.plan_dialog.reference_time_zone, chrono_tz::Europe::Berlin);
        assert_eq!(config.plan_dialog.default_row_limit, 25);
    }

    #[test]
    fn missing_base_url_is_reported_as_not_set() {
        let err = from_lookup(lookup_from(&[])).unwrap_err().to_string();
        assert_eq!(err, "PLAN_API_BASE_URL is not set");

        let err = from_lookup(lookup_from(&[("PLAN_API_BASE_URL", "  ")]))
            .unwrap_err()
            .to_string();
        assert_eq!(err, "PLAN_API_BASE_URL is not set");
    }

    #[test]
    fn unparsable_base_url_is_reported_as_invalid() {
        let err = from_lookup(lookup_from(&[("PLAN_API_BASE_URL", "not a url")]))
            .unwrap_err()
            .to_string();
        assert_eq!(err, "PLAN_API_BASE_URL is invalid");
    }

    #[test]
    fn malformed_values_are_reported_by_key() {
        let err = from_lookup(lookup_from(&[
            ("PLAN_API_BASE_URL", "https://admin.example.com/"),
            ("PLAN_DEFAULT_ROW_LIMIT", "lots"),
        ]))
        .unwrap_err()
        .to_string();
        assert!(err.contains("PLAN_DEFAULT_ROW_LIMIT"), "got: {err}");

        let err = from_lookup(lookup_from(&[
            ("PLAN_API_BASE_URL", "https://admin.example.com/"),
            ("PLAN_REFERENCE_TIME_ZONE", "Mars/Olympus"),
        ]))
        .unwrap_err()
        .to_string();
        assert!(err.contains("PLAN_REFERENCE_TIME_ZONE"), "got: {err}");
    }
}
