use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let graph_base_url = or_default("INSTAMON_GRAPH_BASE_URL", "https://graph.facebook.com");
    let graph_api_version = or_default("INSTAMON_GRAPH_API_VERSION", "v18.0");
    let request_timeout_secs = parse_u64("INSTAMON_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("INSTAMON_USER_AGENT", "instamon/0.1 (comment-monitoring)");
    let inter_post_delay_ms = parse_u64("INSTAMON_INTER_POST_DELAY_MS", "3000")?;
    let output_dir = PathBuf::from(or_default("INSTAMON_OUTPUT_DIR", "."));
    let log_level = or_default("INSTAMON_LOG_LEVEL", "info");
    let access_token = lookup("INSTAMON_ACCESS_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let page_size = parse_u32("INSTAMON_PAGE_SIZE", "25")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "INSTAMON_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        graph_base_url,
        graph_api_version,
        request_timeout_secs,
        user_agent,
        page_size,
        inter_post_delay_ms,
        output_dir,
        log_level,
        access_token,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_uses_defaults_for_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.graph_base_url, "https://graph.facebook.com");
        assert_eq!(cfg.graph_api_version, "v18.0");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "instamon/0.1 (comment-monitoring)");
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.inter_post_delay_ms, 3000);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.access_token.is_none());
    }

    #[test]
    fn inter_post_delay_override() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_INTER_POST_DELAY_MS", "500");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.inter_post_delay_ms, 500);
    }

    #[test]
    fn inter_post_delay_invalid() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_INTER_POST_DELAY_MS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "INSTAMON_INTER_POST_DELAY_MS"),
            "expected InvalidEnvVar(INSTAMON_INTER_POST_DELAY_MS), got: {result:?}"
        );
    }

    #[test]
    fn request_timeout_invalid() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_REQUEST_TIMEOUT_SECS", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "INSTAMON_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(INSTAMON_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn page_size_zero_is_rejected() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_PAGE_SIZE", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "INSTAMON_PAGE_SIZE"),
            "expected InvalidEnvVar(INSTAMON_PAGE_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn graph_endpoint_overrides() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_GRAPH_BASE_URL", "http://127.0.0.1:9000");
        map.insert("INSTAMON_GRAPH_API_VERSION", "v19.0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.graph_base_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.graph_api_version, "v19.0");
    }

    #[test]
    fn blank_access_token_is_ignored() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_ACCESS_TOKEN", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.access_token.is_none());
    }

    #[test]
    fn debug_redacts_access_token() {
        let mut map = HashMap::new();
        map.insert("INSTAMON_ACCESS_TOKEN", "EAAG-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("EAAG-secret"), "token leaked: {rendered}");
        assert!(rendered.contains("[redacted]"));
    }
}
