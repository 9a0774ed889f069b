//! Client configuration validation with aggregated errors.
//! - every problem is collected into one Vec<String>
//! - a missing fallback SV code is only warned about

use tracing::{error, info, warn};
use url::Url;

use crate::config::settings::{ClientConfig, LoggingConfig};
use crate::manager::service_vendor::ServiceVendor;
use crate::observability::metrics::get_metrics;

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_client_config(cfg: &ClientConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.creds.client_id.trim().is_empty() {
        errors.push("creds.client_id must not be empty".to_string());
    }
    if cfg.creds.client_secret.trim().is_empty() {
        errors.push("creds.client_secret must not be empty".to_string());
    }

    validate_url("uris.token_uri", &cfg.token_endpoint(), &mut errors);
    validate_url("uris.authorization_uri", &cfg.authorization_endpoint(), &mut errors);
    validate_url("authorization.redirect_uri", &cfg.authorization.redirect_uri, &mut errors);

    if cfg.timeout_ms == Some(0) {
        errors.push("timeout_ms must be > 0".to_string());
    }

    if let Some(logging) = &cfg.logging {
        validate_logging(logging, &mut errors);
    }

    let fallback = ServiceVendor::default().config_key();
    if cfg.service_vendor_code(fallback).is_none() {
        warn!("sv.{} is not configured; calls to unknown endpoints will be sent without SV", fallback);
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

fn validate_url(path: &str, value: &str, errors: &mut Vec<String>) {
    if let Err(err) = Url::parse(value) {
        errors.push(format!("{} '{}' is not a valid URL: {}", path, value, err));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    let valid = ["trace", "debug", "info", "warn", "error"];
    if !valid.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "logging.level '{}' invalid; allowed: {:?}",
            logging.level, valid
        ));
    }
}
