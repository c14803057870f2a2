use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::EnrichmentError;

/// Parameters for one enrichment invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    /// Logical job name; batch runs holding the same name never overlap.
    pub job_name: String,
    /// Upper bound on candidates considered per batch run.
    pub max_queries_per_run: usize,
    /// Requested avatar size in pixels.
    pub photo_size_pixels: u32,
    /// Also fetch the profile and merge names and social links.
    pub enable_profile_enrichment: bool,
    /// Per-request timeout for outbound Gravatar calls.
    pub request_timeout: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            job_name: "gravatar-photo-enrichment".to_string(),
            max_queries_per_run: 2000,
            photo_size_pixels: 200,
            enable_profile_enrichment: true,
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl EnrichmentConfig {
    /// Load configuration from environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, EnrichmentError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnrichmentError> {
        let defaults = Self::default();
        let config = Self {
            job_name: lookup("ENRICH_JOB_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.job_name),
            max_queries_per_run: parse_var(&lookup, "ENRICH_MAX_QUERIES_PER_RUN")?
                .unwrap_or(defaults.max_queries_per_run),
            photo_size_pixels: parse_var(&lookup, "ENRICH_PHOTO_SIZE")?
                .unwrap_or(defaults.photo_size_pixels),
            enable_profile_enrichment: parse_var(&lookup, "ENRICH_PROFILES")?
                .unwrap_or(defaults.enable_profile_enrichment),
            request_timeout: parse_var::<u64>(&lookup, "ENRICH_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    /// Gravatar serves sizes from 1 to 2048 pixels.
    pub fn validate(&self) -> Result<(), EnrichmentError> {
        if !(1..=2048).contains(&self.photo_size_pixels) {
            return Err(EnrichmentError::Config(format!(
                "photo size must be between 1 and 2048 pixels, got {}",
                self.photo_size_pixels
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(EnrichmentError::Config(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            job_name = self.job_name.as_str(),
            max_queries_per_run = self.max_queries_per_run,
            photo_size_pixels = self.photo_size_pixels,
            enable_profile_enrichment = self.enable_profile_enrichment,
            request_timeout_secs = self.request_timeout.as_secs(),
            "Enrichment config loaded"
        );
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, EnrichmentError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EnrichmentError::Config(format!("{key} has invalid value '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<EnrichmentConfig, EnrichmentError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnrichmentConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn unset_vars_use_defaults() {
        assert_eq!(from_map(&[]).unwrap(), EnrichmentConfig::default());
    }

    #[test]
    fn vars_override_defaults() {
        let config = from_map(&[
            ("ENRICH_MAX_QUERIES_PER_RUN", "3"),
            ("ENRICH_PHOTO_SIZE", " 80 "),
            ("ENRICH_PROFILES", "false"),
            ("ENRICH_REQUEST_TIMEOUT_SECS", "5"),
            ("ENRICH_JOB_NAME", "nightly"),
        ])
        .unwrap();
        assert_eq!(config.max_queries_per_run, 3);
        assert_eq!(config.photo_size_pixels, 80);
        assert!(!config.enable_profile_enrichment);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.job_name, "nightly");
    }

    #[test]
    fn unparseable_value_is_config_error() {
        let err = from_map(&[("ENRICH_MAX_QUERIES_PER_RUN", "lots")]).unwrap_err();
        assert!(matches!(err, EnrichmentError::Config(ref m) if m.contains("ENRICH_MAX_QUERIES_PER_RUN")));
    }

    #[test]
    fn out_of_range_size_is_rejected() {
        assert!(from_map(&[("ENRICH_PHOTO_SIZE", "0")]).is_err());
        assert!(from_map(&[("ENRICH_PHOTO_SIZE", "4096")]).is_err());
    }
}
