// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be `true` or `false`, got `{value}`")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the analysis backend, without a trailing slash
    pub backend_url: String,
    /// Require sign-in before annotating
    pub auth_enabled: bool,
    pub timeouts: Timeouts,
    /// Location of the persisted token/preferences file
    pub storage_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            auth_enabled: false,
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            storage_path: None,
        }
    }
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `PDFBOX_BACKEND_URL`: default `http://localhost:5000`
    /// - `PDFBOX_AUTH_ENABLED`: `true` or `false` (default)
    /// - `PDFBOX_REQUEST_TIMEOUT_SECS`: default 120
    /// - `PDFBOX_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PDFBOX_STORAGE_PATH`: overrides the storage file location
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = lookup("PDFBOX_BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let auth_enabled = parse_bool("PDFBOX_AUTH_ENABLED", lookup("PDFBOX_AUTH_ENABLED"), false)?;
        let timeouts = Timeouts {
            request_secs: parse_u64(
                lookup("PDFBOX_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            connect_secs: parse_u64(
                lookup("PDFBOX_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        };
        let storage_path = lookup("PDFBOX_STORAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            backend_url,
            auth_enabled,
            timeouts,
            storage_path,
        })
    }

    /// Full URL of a backend route such as `/api/submit`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }
}

fn parse_bool(var: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::InvalidBool {
            var,
            value: v.to_string(),
        }),
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
