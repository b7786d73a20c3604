//! Environment-driven configuration for a single stalewatch run.

use anyhow::{bail, Result};

use crate::report::ReportConfig;

/// Shopify Admin API version used when `SHOPIFY_API_VERSION` is unset.
pub const DEFAULT_API_VERSION: &str = "2025-10";

/// Resolved runtime configuration. All credentials are supplied through the
/// environment; validation happens before any network call.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub shop: String,
    pub admin_token: String,
    pub slack_bot_token: String,
    pub slack_channel_id: String,
    pub api_version: String,
    pub store_handle: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Missing or
    /// blank required variables are collected so the startup error names every
    /// one of them at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut missing = Vec::new();
        let mut require = |name: &'static str| match get(name) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        };

        let shop = require("SHOPIFY_SHOP");
        let admin_token = require("SHOPIFY_ADMIN_TOKEN");
        let slack_bot_token = require("SLACK_BOT_TOKEN");
        let slack_channel_id = require("SLACK_CHANNEL_ID");
        if !missing.is_empty() {
            bail!(
                "missing required environment variables: {}",
                missing.join(", ")
            );
        }

        Ok(Self {
            shop,
            admin_token,
            slack_bot_token,
            slack_channel_id,
            api_version: get("SHOPIFY_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            store_handle: get("SHOPIFY_ADMIN_STORE_HANDLE"),
        })
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            shop: self.shop.clone(),
            store_handle: self.store_handle.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn required_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SHOPIFY_SHOP", "example.myshopify.com"),
            ("SHOPIFY_ADMIN_TOKEN", "shpat_test"),
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL_ID", "C0123456789"),
        ]
    }

    #[test]
    fn from_lookup_accepts_complete_environment() {
        let config = AppConfig::from_lookup(lookup_from(&required_pairs())).expect("config");
        assert_eq!(config.shop, "example.myshopify.com");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.store_handle, None);
    }

    #[test]
    fn from_lookup_lists_every_missing_variable() {
        let error = AppConfig::from_lookup(lookup_from(&[(
            "SHOPIFY_SHOP",
            "example.myshopify.com",
        )]))
        .expect_err("should fail");
        let message = error.to_string();
        assert!(message.contains("SHOPIFY_ADMIN_TOKEN"));
        assert!(message.contains("SLACK_BOT_TOKEN"));
        assert!(message.contains("SLACK_CHANNEL_ID"));
        assert!(!message.contains("SHOPIFY_SHOP"));
    }

    #[test]
    fn from_lookup_treats_blank_values_as_missing() {
        let mut pairs = required_pairs();
        pairs[2] = ("SLACK_BOT_TOKEN", "   ");
        let error = AppConfig::from_lookup(lookup_from(&pairs)).expect_err("should fail");
        assert!(error.to_string().contains("SLACK_BOT_TOKEN"));
    }

    #[test]
    fn from_lookup_honors_optional_overrides() {
        let mut pairs = required_pairs();
        pairs.push(("SHOPIFY_API_VERSION", "2024-07"));
        pairs.push(("SHOPIFY_ADMIN_STORE_HANDLE", "acme-store"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).expect("config");
        assert_eq!(config.api_version, "2024-07");
        assert_eq!(config.store_handle.as_deref(), Some("acme-store"));
    }
}
