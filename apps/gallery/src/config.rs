use std::{collections::HashMap, fs};

use anyhow::{bail, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "gallery.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub user_id: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            user_id: None,
            request_timeout_secs: Some(30),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

/// Layers defaults, the optional settings file and environment overrides.
pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)
            .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;
        if let Some(v) = file_cfg.get("base_url") {
            settings.base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("user_id") {
            settings.user_id = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("request_timeout_secs") {
            settings.request_timeout_secs = parse_timeout(v)?;
        }
    }

    if let Some(v) = env("GALLERY_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("GALLERY_USER_ID") {
        settings.user_id = Some(v);
    }
    if let Some(v) = env("APP__USER_ID") {
        settings.user_id = Some(v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_timeout(&v)?;
    }

    settings.base_url = normalize_base_url(&settings.base_url)?;
    Ok(settings)
}

/// `0` disables the request timeout.
fn parse_timeout(raw: &str) -> anyhow::Result<Option<u64>> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid request timeout '{raw}'"))?;
    Ok((secs > 0).then_some(secs))
}

pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid gallery base url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("gallery base url '{raw}' must use http or https");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_sources() {
        let settings = settings_from_sources(None, no_env).expect("settings");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = r#"
            base_url = "https://gallery.example.com/"
            user_id = "dog"
            request_timeout_secs = "5"
        "#;
        let settings = settings_from_sources(Some(file), no_env).expect("settings");
        assert_eq!(settings.base_url, "https://gallery.example.com");
        assert_eq!(settings.user_id.as_deref(), Some("dog"));
        assert_eq!(settings.request_timeout_secs, Some(5));
    }

    #[test]
    fn app_prefixed_env_wins_over_file_and_plain_env() {
        let file = r#"base_url = "http://file.local:8000""#;
        let env = |key: &str| match key {
            "GALLERY_BASE_URL" => Some("http://plain.local:8000".to_string()),
            "APP__BASE_URL" => Some("http://app.local:8000".to_string()),
            "GALLERY_USER_ID" => Some("cat".to_string()),
            "APP__REQUEST_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        };
        let settings = settings_from_sources(Some(file), env).expect("settings");
        assert_eq!(settings.base_url, "http://app.local:8000");
        assert_eq!(settings.user_id.as_deref(), Some("cat"));
        assert_eq!(settings.request_timeout_secs, None);
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(normalize_base_url("ftp://gallery.local").is_err());
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = settings_from_sources(Some(r#"request_timeout_secs = "soon""#), no_env)
            .expect_err("should fail");
        assert!(err.to_string().contains("invalid request timeout"));
    }
}
