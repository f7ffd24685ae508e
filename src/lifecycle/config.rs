//! # Configuration
//!
//! Plain `serde` structs with defaults, so a table can be configured from any
//! deserializable source (a JSON file, environment-backed settings) or built in code.
//! Missing fields fall back to their defaults.

use std::time::Duration;

use serde::Deserialize;

use crate::model::TableDataParams;

/// Settings of a [`TableStateProvider`](super::TableStateProvider).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub page_size: usize,
    pub page: usize,
    /// Jump back to page 1 when a settled result on a later page has no rows.
    pub reset_empty_page: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 15,
            page: 1,
            reset_empty_page: true,
        }
    }
}

impl TableConfig {
    /// Initial parameter snapshot, seeded with a fresh request id.
    pub fn initial_params(&self) -> TableDataParams {
        TableDataParams::new(self.page_size, self.page)
    }
}

/// Timeouts of [`HttpFetch`](crate::clients::HttpFetch).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Delay between the end of one response and the start of the next poll.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 30_000 }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{ "page_size": 50 }"#).unwrap();
        assert_eq!(
            config,
            TableConfig {
                page_size: 50,
                ..TableConfig::default()
            }
        );

        let http: HttpSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(http.request_timeout(), Duration::from_secs(30));
        assert_eq!(http.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn initial_params_are_clamped() {
        let config = TableConfig {
            page_size: 0,
            page: 0,
            reset_empty_page: false,
        };
        let params = config.initial_params();
        assert_eq!((params.page_size, params.page), (1, 1));
        assert_eq!(PollingConfig { interval_ms: 250 }.interval(), Duration::from_millis(250));
    }
}
