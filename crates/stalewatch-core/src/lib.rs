//! Shared foundations for the stalewatch pipeline.
//!
//! Provides environment-driven configuration, the report time window, the
//! order model, and the pure report formatter used by the Shopify and Slack
//! client crates.

pub mod config;
pub mod report;
pub mod text;
pub mod window;

pub use config::{AppConfig, DEFAULT_API_VERSION};
pub use report::{
    build_report, format_local_timestamp, order_admin_url, OrderSummary, Report, ReportConfig,
    EMPTY_REPORT_HEADER, LOCAL_TZ, REPORT_HEADER,
};
pub use text::truncate_for_error;
pub use window::ReportWindow;
