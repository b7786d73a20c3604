//! Order model and the pure report formatter.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Fixed rendering timezone for report timestamps.
pub const LOCAL_TZ: Tz = chrono_tz::America::Chicago;

pub const REPORT_HEADER: &str =
    "*Unfulfilled orders > 24hrs (within last 30 days) — Please Review*";
pub const EMPTY_REPORT_HEADER: &str =
    ":white_check_mark: No unfulfilled orders in the 30d→24h window.";

/// One order row as returned by the Shopify orders query. Immutable once
/// deserialized; `id` is the platform GID and is retained even though nothing
/// downstream consumes it yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    pub legacy_resource_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "displayFulfillmentStatus")]
    pub fulfillment_status: String,
    #[serde(rename = "displayFinancialStatus")]
    pub financial_status: String,
}

/// Settings that shape the admin deep links in the report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub shop: String,
    pub store_handle: Option<String>,
}

/// Header plus one bullet line per order, in the order the query returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub header: String,
    pub lines: Vec<String>,
}

/// Admin URL for one order. A configured store handle selects the
/// `admin.shopify.com` path; otherwise the raw shop domain form is used.
/// Whichever shape is configured is emitted without fallback probing.
pub fn order_admin_url(config: &ReportConfig, legacy_id: &str) -> String {
    match config.store_handle.as_deref() {
        Some(handle) => format!("https://admin.shopify.com/store/{handle}/orders/{legacy_id}"),
        None => format!("https://{}/admin/orders/{legacy_id}", config.shop),
    }
}

/// Renders a UTC instant as local wall-clock time, e.g.
/// `Jan 15, 2024 12:30 PM CST`. Zone-aware, so DST transitions resolve to the
/// correct abbreviation.
pub fn format_local_timestamp(created_at: DateTime<Utc>) -> String {
    created_at
        .with_timezone(&LOCAL_TZ)
        .format("%b %d, %Y %I:%M %p %Z")
        .to_string()
}

pub fn build_report(config: &ReportConfig, orders: &[OrderSummary]) -> Report {
    if orders.is_empty() {
        return Report {
            header: EMPTY_REPORT_HEADER.to_string(),
            lines: Vec::new(),
        };
    }

    let lines = orders
        .iter()
        .map(|order| {
            let link = order_admin_url(config, &order.legacy_resource_id);
            let when = format_local_timestamp(order.created_at);
            format!(
                "• <{link}|{}> — {when} — Financial: `{}` — Fulfillment: `{}`",
                order.name, order.financial_status, order.fulfillment_status
            )
        })
        .collect();

    Report {
        header: REPORT_HEADER.to_string(),
        lines,
    }
}
