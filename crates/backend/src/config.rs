use anyhow::{ensure, Context, Result};
use std::time::Duration;

use crate::report::{ReportSettings, DEFAULT_GEMINI_MODEL, DEFAULT_MAX_CHARS};

/// Credentials used to sign in once at start-up to check the identity provider.
#[derive(Clone)]
pub struct ProbeCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_key: String,
    pub supabase_jwt_secret: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// API root override for the generation provider
    pub gemini_base_url: Option<String>,
    pub report: ReportSettings,
    pub auth_probe: Option<ProbeCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match get("PORT") {
            Some(v) => v.trim().parse().context("PORT must be a valid number")?,
            None => 3000,
        };

        let max_chars: usize = match get("REPORT_MAX_CHARS") {
            Some(v) => v
                .trim()
                .parse()
                .context("REPORT_MAX_CHARS must be a valid number")?,
            None => DEFAULT_MAX_CHARS,
        };
        ensure!(max_chars > 0, "REPORT_MAX_CHARS must be greater than zero");

        let timeout_secs: u64 = match get("GENERATION_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .context("GENERATION_TIMEOUT_SECS must be a valid number")?,
            None => 30,
        };
        ensure!(
            timeout_secs > 0,
            "GENERATION_TIMEOUT_SECS must be greater than zero"
        );

        let auth_probe = match (get("AUTH_PROBE_EMAIL"), get("AUTH_PROBE_PASSWORD")) {
            (Some(email), Some(password)) => Some(ProbeCredentials { email, password }),
            (None, None) => None,
            _ => anyhow::bail!("AUTH_PROBE_EMAIL and AUTH_PROBE_PASSWORD must be set together"),
        };

        Ok(Self {
            port,
            supabase_url: get("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_key: get("SUPABASE_KEY").context("SUPABASE_KEY must be set")?,
            supabase_jwt_secret: get("SUPABASE_JWT_SECRET"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL"),
            report: ReportSettings {
                max_chars,
                timeout: Duration::from_secs(timeout_secs),
            },
            auth_probe,
        })
    }
}
