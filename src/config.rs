//! Site configuration module.
//!
//! Handles loading, validating, and merging `basil.toml`. Stock defaults are
//! serialized to a TOML value and the user's file is merged over them, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "http://localhost:8000"   # Backend serving /api/...
//! # session_cookie = "..."             # Sent as `Cookie: session=...`
//!
//! [site]
//! title = "Basil"                      # Page <title> and header brand
//! login_url = "/login"
//! logout_url = "/logout"
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#212529"
//! text_muted = "#6c757d"    # Info bar, author usernames
//! border = "#dee2e6"
//! link = "#0d6efd"
//! link_hover = "#0a58ca"
//! spoiler = "#202225"       # Unrevealed spoiler background
//!
//! [colors.dark]
//! background = "#212529"
//! text = "#f8f9fa"
//! text_muted = "#adb5bd"
//! border = "#495057"
//! link = "#6ea8fe"
//! link_hover = "#9ec5fe"
//! spoiler = "#4f545c"
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Only point at a different backend
//! [api]
//! base_url = "https://basil.example.org"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `basil.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Backend location and credentials.
    pub api: ApiConfig,
    /// Page chrome: title and header links.
    pub site: SiteMeta,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.api.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    /// Value of the `session` cookie to authenticate as. Anonymous if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            session_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub login_url: String,
    pub logout_url: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Basil".to_string(),
            login_url: "/login".to_string(),
            logout_url: "/logout".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    pub spoiler: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#212529".to_string(),
            text_muted: "#6c757d".to_string(),
            border: "#dee2e6".to_string(),
            link: "#0d6efd".to_string(),
            link_hover: "#0a58ca".to_string(),
            spoiler: "#202225".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#212529".to_string(),
            text: "#f8f9fa".to_string(),
            text_muted: "#adb5bd".to_string(),
            border: "#495057".to_string(),
            link: "#6ea8fe".to_string(),
            link_hover: "#9ec5fe".to_string(),
            spoiler: "#4f545c".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; anything else
/// in the overlay replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. A missing file is `None`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `path` over the stock defaults. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// A fully commented `basil.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r##"# Basil Web Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Backend API
# ---------------------------------------------------------------------------
[api]
# Server that answers /api/series, /api/snippet/{id} and /api/auth/me.
base_url = "http://localhost:8000"

# Session cookie to authenticate as. Without it, pages are generated for an
# anonymous visitor and no series are editable.
# session_cookie = "..."

# ---------------------------------------------------------------------------
# Page chrome
# ---------------------------------------------------------------------------
[site]
title = "Basil"
login_url = "/login"
logout_url = "/logout"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#212529"
text_muted = "#6c757d"    # Info bar, author usernames
border = "#dee2e6"
link = "#0d6efd"
link_hover = "#0a58ca"
spoiler = "#202225"       # Unrevealed spoiler background

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#212529"
text = "#f8f9fa"
text_muted = "#adb5bd"
border = "#495057"
link = "#6ea8fe"
link_hover = "#9ec5fe"
spoiler = "#4f545c"
"##
}

/// CSS custom properties for both color schemes.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
{light}
}}

@media (prefers-color-scheme: dark) {{
    :root {{
{dark}
    }}
}}"#,
        light = color_vars(&colors.light, "    "),
        dark = color_vars(&colors.dark, "        "),
    )
}

fn color_vars(scheme: &ColorScheme, indent: &str) -> String {
    [
        ("bg", &scheme.background),
        ("text", &scheme.text),
        ("text-muted", &scheme.text_muted),
        ("border", &scheme.border),
        ("link", &scheme.link),
        ("link-hover", &scheme.link_hover),
        ("spoiler", &scheme.spoiler),
    ]
    .iter()
    .map(|(name, value)| format!("{indent}--color-{name}: {value};"))
    .collect::<Vec<_>>()
    .join("\n")
}
