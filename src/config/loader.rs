use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{ClientConfig, LoggingConfig};
use crate::config::validator;
use crate::observability::metrics::get_metrics;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read config '{}'", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded).await
}

pub async fn parse_config(content: &str) -> Result<ClientConfig> {
    let metrics = get_metrics().await;
    let mut client_config: ClientConfig = serde_yaml::from_str(content).inspect_err(|e| {
        error!("parse config error: {}", e);
        metrics.config_parse_failures.inc();
    })?;

    // Apply defaults
    if client_config.logging.is_none() {
        client_config.logging = Some(LoggingConfig::default());
    }

    debug!("validation config ...");
    validator::validate_client_config(&client_config)
        .await
        .map_err(|errors| {
            anyhow!(
                "config is not valid, total errors: {}\n{}",
                errors.len(),
                errors.join("\n")
            )
        })?;

    Ok(client_config.with_defaults())
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::LogFormat;
    use crate::utils::constants::DEFAULT_TIMEOUT_MS;
    use std::io::Write;

    const LEGACY_CONFIG: &str = r#"
creds:
  clientID: "${IHEALTH_TEST_CLIENT_ID:cid}"
  clientSecret: secret
uris:
  authorizationUri: https://oauthuser.ihealthlabs.com
  authorizationPath: /OpenApiV2/OAuthv2/userauthorization/
  tokenUri: https://oauthuser.ihealthlabs.com
  tokenPath: /OpenApiV2/OAuthv2/userauthorization/
authorization_uri:
  redirect_uri: http://localhost:3000/auth_callback/
  scope: OpenApiWeight OpenApiBP
  state: "3(#0/!~"
SC: sc-constant
SV:
  OpenApiWeight: sv-weight
  OpenApiUserInfo: sv-user
"#;

    #[test]
    fn env_vars_expand_with_defaults() {
        std::env::set_var("IHEALTH_LOADER_TEST_VAR", "from-env");
        let out = expand_env_vars("a=${IHEALTH_LOADER_TEST_VAR} b=${IHEALTH_LOADER_UNSET:fallback} c=${IHEALTH_LOADER_UNSET}").unwrap();
        assert_eq!(out, "a=from-env b=fallback c=");
    }

    #[tokio::test]
    async fn legacy_keys_are_accepted_and_defaults_filled() {
        let cfg = parse_config(&expand_env_vars(LEGACY_CONFIG).unwrap()).await.unwrap();
        assert_eq!(cfg.creds.client_id, "cid");
        assert_eq!(cfg.authorization.response_type, "code");
        assert_eq!(cfg.sc.as_deref(), Some("sc-constant"));
        assert_eq!(cfg.service_vendor_code("OpenApiWeight"), Some("sv-weight"));
        assert_eq!(cfg.timeout_ms, Some(DEFAULT_TIMEOUT_MS));
        assert_eq!(cfg.logging.unwrap().format, LogFormat::Compact);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let broken = LEGACY_CONFIG.replace("clientSecret: secret", "clientSecret: \"\"");
        let err = parse_config(&broken).await.unwrap_err();
        assert!(err.to_string().contains("creds.client_secret"));
    }

    #[tokio::test]
    async fn zero_timeout_in_file_is_rejected() {
        let zero = format!("{}timeout_ms: 0\n", LEGACY_CONFIG);
        let err = parse_config(&zero).await.unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LEGACY_CONFIG.as_bytes()).unwrap();
        let cfg = file_to_config(file.path()).await.unwrap();
        assert_eq!(
            cfg.token_endpoint(),
            "https://oauthuser.ihealthlabs.com/OpenApiV2/OAuthv2/userauthorization/"
        );
    }
}
