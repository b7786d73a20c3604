//! Shopify Admin GraphQL client for the unfulfilled-order window query.
//!
//! Issues the paginated orders query and materializes every matching row in
//! the order received (reverse-chronological). Retries are deliberately an
//! external concern; any transport or embedded-error failure aborts the fetch
//! with no partial results.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use stalewatch_core::{truncate_for_error, OrderSummary, ReportWindow};

const ORDERS_QUERY: &str = r#"query UnfulfilledWindow($q: String!, $first: Int = 50, $after: String) {
  orders(first: $first, after: $after, query: $q, sortKey: CREATED_AT, reverse: true) {
    pageInfo { hasNextPage endCursor }
    edges {
      node {
        id
        legacyResourceId
        name
        createdAt
        displayFulfillmentStatus
        displayFinancialStatus
      }
    }
  }
}"#;

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub shop: String,
    pub access_token: String,
    pub api_version: String,
    pub api_base: String,
    pub request_timeout_ms: u64,
}

impl ShopifyConfig {
    /// Production defaults: endpoint rooted at the shop domain, 30s budget
    /// for the paginated query.
    pub fn for_shop(shop: &str, access_token: &str, api_version: &str) -> Self {
        Self {
            shop: shop.to_string(),
            access_token: access_token.to_string(),
            api_version: api_version.to_string(),
            api_base: format!("https://{shop}"),
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    orders: OrdersConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrdersConnection {
    page_info: PageInfo,
    edges: Vec<OrderEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderEdge {
    node: OrderSummary,
}

pub struct ShopifyOrdersClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ShopifyOrdersClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let token = reqwest::header::HeaderValue::from_str(config.access_token.trim())
            .context("shopify access token is not a valid header value")?;
        headers.insert("X-Shopify-Access-Token", token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create shopify api client")?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/admin/api/{}/graphql.json",
                config.api_base.trim_end_matches('/'),
                config.api_version
            ),
        })
    }

    /// Filter string sent as the `query` argument: unfulfilled, open, not
    /// pending payment, created within the half-open window.
    pub fn search_query(window: &ReportWindow) -> String {
        format!(
            "fulfillment_status:unfulfilled AND status:open AND -financial_status:pending \
             AND created_at:>={} AND created_at:<{}",
            window.lower_bound(),
            window.upper_bound()
        )
    }

    /// Fetches every order matching the window, following cursor pagination
    /// until the API reports no further pages.
    pub async fn fetch_unfulfilled_orders(
        &self,
        window: &ReportWindow,
    ) -> Result<Vec<OrderSummary>> {
        let search = Self::search_query(window);
        let mut after: Option<String> = None;
        let mut out = Vec::new();

        loop {
            let payload = json!({
                "query": ORDERS_QUERY,
                "variables": { "q": search, "first": PAGE_SIZE, "after": after },
            });
            let response = self
                .http
                .post(&self.endpoint)
                .json(&payload)
                .send()
                .await
                .context("shopify orders query request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                bail!(
                    "shopify orders query failed with status {}: {}",
                    status.as_u16(),
                    truncate_for_error(&body, 800)
                );
            }

            let body: Value = response
                .json()
                .await
                .context("failed to decode shopify orders response")?;
            if let Some(errors) = body.get("errors") {
                bail!("shopify graphql errors: {errors}");
            }

            let data = body
                .get("data")
                .cloned()
                .ok_or_else(|| anyhow!("shopify orders response missing data payload"))?;
            let OrdersConnection { page_info, edges } = serde_json::from_value::<OrdersData>(data)
                .context("failed to decode shopify orders payload")?
                .orders;

            tracing::debug!(
                rows = edges.len(),
                has_next_page = page_info.has_next_page,
                "fetched shopify orders page"
            );
            out.extend(edges.into_iter().map(|edge| edge.node));

            if !page_info.has_next_page {
                break;
            }
            after = page_info.end_cursor;
            if after.is_none() {
                bail!("shopify reported another page without an end cursor");
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_combines_all_predicates() {
        let window = ReportWindow {
            lower: "2024-02-14T12:00:00Z".parse().unwrap(),
            upper: "2024-03-14T12:00:00Z".parse().unwrap(),
        };
        let query = ShopifyOrdersClient::search_query(&window);
        assert_eq!(
            query,
            "fulfillment_status:unfulfilled AND status:open AND -financial_status:pending \
             AND created_at:>=2024-02-14T12:00:00Z AND created_at:<2024-03-14T12:00:00Z"
        );
    }
}
