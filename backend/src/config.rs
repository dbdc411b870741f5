use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

/// Which calendar source answers busy-interval queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarBackend {
    /// Cal.com REST API
    Calcom,
    /// In-process calendars, every user free unless seeded
    Static,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub calendar_provider: CalendarBackend,
    pub calcom_api_url: String,
    #[serde(default)]
    pub calcom_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub search_horizon_days: u32,
    pub default_timezone: Tz,
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    /// Layer defaults, an optional `rendezvous.toml` and `RENDEZVOUS_*`
    /// environment variables, in that order.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("port", 8080_i64)?
            .set_default("calendar_provider", "calcom")?
            .set_default("calcom_api_url", "https://api.cal.com/v1")?
            .set_default("request_timeout_secs", 10_i64)?
            .set_default("search_horizon_days", 14_i64)?
            .set_default("default_timezone", "UTC")?
            .add_source(config::File::with_name("rendezvous").required(false))
            .add_source(config::Environment::with_prefix("RENDEZVOUS").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Configuration has invalid values")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=60).contains(&self.search_horizon_days) {
            bail!(
                "RENDEZVOUS_SEARCH_HORIZON_DAYS must be between 1 and 60, got {}",
                self.search_horizon_days
            );
        }
        if self.calendar_provider == CalendarBackend::Calcom
            && self
                .calcom_api_key
                .as_deref()
                .map_or(true, |key| key.trim().is_empty())
        {
            bail!("RENDEZVOUS_CALCOM_API_KEY must be set when the calcom provider is selected");
        }
        Ok(())
    }

    /// Parsed CORS origins; empty means permissive.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            port: 8080,
            calendar_provider: CalendarBackend::Static,
            calcom_api_url: "https://api.cal.com/v1".to_string(),
            calcom_api_key: None,
            request_timeout_secs: 10,
            search_horizon_days: 14,
            default_timezone: chrono_tz::UTC,
            cors_allowed_origins: None,
        }
    }

    #[test]
    fn test_static_provider_needs_no_api_key() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_calcom_provider_requires_api_key() {
        let mut config = base_config();
        config.calendar_provider = CalendarBackend::Calcom;
        assert!(config.validate().is_err());

        config.calcom_api_key = Some("cal_live_123".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_horizon_must_be_bounded() {
        let mut config = base_config();
        config.search_horizon_days = 0;
        assert!(config.validate().is_err());
        config.search_horizon_days = 90;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cors_origins_are_trimmed() {
        let mut config = base_config();
        assert!(config.cors_origins().is_empty());

        config.cors_allowed_origins =
            Some(" https://app.example.com, ,http://localhost:3000 ".to_string());
        assert_eq!(
            config.cors_origins(),
            vec![
                "https://app.example.com".to_string(),
                "http://localhost:3000".to_string()
            ]
        );
    }
}
