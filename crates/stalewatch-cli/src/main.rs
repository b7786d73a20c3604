//! One-shot unfulfilled-order notifier: query Shopify, post the report to
//! Slack, print a summary line, exit. Scheduling is external.

use anyhow::{Context, Result};
use chrono::Utc;
use stalewatch_core::{build_report, AppConfig, ReportWindow};
use stalewatch_shopify::{ShopifyConfig, ShopifyOrdersClient};
use stalewatch_slack::{SlackConfig, SlackPublisher};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let window = ReportWindow::from_now(Utc::now());

    let shopify = ShopifyOrdersClient::new(&ShopifyConfig::for_shop(
        &config.shop,
        &config.admin_token,
        &config.api_version,
    ))?;
    let orders = shopify
        .fetch_unfulfilled_orders(&window)
        .await
        .context("failed to fetch unfulfilled orders")?;
    tracing::info!(
        orders = orders.len(),
        lower = %window.lower_bound(),
        upper = %window.upper_bound(),
        "fetched unfulfilled order window"
    );

    let report = build_report(&config.report_config(), &orders);
    let publisher = SlackPublisher::new(&SlackConfig::new(
        &config.slack_bot_token,
        &config.slack_channel_id,
    ))?;
    let messages = publisher
        .post_report(&report.header, &report.lines)
        .await
        .context("failed to deliver report to slack")?;

    println!(
        "Posted {messages} Slack message(s) with {} order(s).",
        orders.len()
    );
    Ok(())
}
