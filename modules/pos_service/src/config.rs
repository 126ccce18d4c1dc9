//! Configuration for the POS service module

use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// POS service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Realtime channel throttling
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Allow sales, voids and returns that drive stock below zero
    #[serde(default)]
    pub allow_negative_stock: bool,

    /// Tax applied on the discounted subtotal of every sale, in percent
    #[serde(default)]
    pub tax_rate_percent: Decimal,

    /// Overwrite a product's cost price with the unit cost of each purchase
    #[serde(default)]
    pub update_cost_on_purchase: bool,

    /// Append audit entries for every write
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Page size when a list request names none
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Upper bound for requested page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

/// Realtime channel configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Quiet period that ends a burst of change events
    #[serde(default = "default_debounce", with = "humantime_serde")]
    pub debounce: Duration,

    /// Longest a burst may be held back before subscribers are notified
    #[serde(default = "default_max_wait", with = "humantime_serde")]
    pub max_wait: Duration,

    /// Notices buffered per channel before slow subscribers are told to resync
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            realtime: RealtimeConfig::default(),
            allow_negative_stock: false,
            tax_rate_percent: Decimal::ZERO,
            update_cost_on_purchase: false,
            audit_enabled: true,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            debounce: default_debounce(),
            max_wait: default_max_wait(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Config {
    /// Clamp a requested page size into `1..=max_page_size`
    pub fn page_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    500
}

fn default_debounce() -> Duration {
    Duration::from_millis(250)
}

fn default_max_wait() -> Duration {
    Duration::from_secs(2)
}

fn default_channel_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let cfg: Config = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(cfg.realtime.debounce, Duration::from_millis(250));
        assert_eq!(cfg.realtime.max_wait, Duration::from_secs(2));
        assert_eq!(cfg.realtime.channel_capacity, 64);
        assert!(!cfg.allow_negative_stock);
        assert!(cfg.audit_enabled);
        assert_eq!(cfg.tax_rate_percent, Decimal::ZERO);
    }

    #[test]
    fn test_humantime_durations_and_tax() {
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "realtime": { "debounce": "50ms", "max_wait": "1s 500ms" },
            "tax_rate_percent": "11"
        }))
        .unwrap();

        assert_eq!(cfg.realtime.debounce, Duration::from_millis(50));
        assert_eq!(cfg.realtime.max_wait, Duration::from_millis(1500));
        assert_eq!(cfg.tax_rate_percent, Decimal::from(11));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<Config, _> =
            serde_json::from_value(serde_json::json!({ "strict_mode": true }));
        assert!(result.is_err());
    }

    #[test]
    fn test_page_limit_clamped() {
        let cfg = Config::default();
        assert_eq!(cfg.page_limit(None), 50);
        assert_eq!(cfg.page_limit(Some(0)), 1);
        assert_eq!(cfg.page_limit(Some(10_000)), 500);
    }
}
