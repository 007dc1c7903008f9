use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::toml_config::StorefrontConfig;
use crate::domain::model::{Opinion, OpinionKind};
use crate::utils::error::{Result, TaskError};

/// Client for the storefront AJAX endpoints. The endpoints answer with
/// HTML-wrapped JSON; the payload is the fragment between the first `{"`
/// and the last `}`.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: String,
    language: String,
    shop_id: u32,
    page_size: usize,
}

impl StorefrontClient {
    pub fn new(config: &StorefrontConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            shop_id: config.shop_id,
            page_size: config.page_size,
        })
    }

    /// One page of the opinions feed, newest first.
    pub async fn opinions_page(&self, kind: OpinionKind, page: usize) -> Result<Vec<Opinion>> {
        let response = self
            .http
            .get(format!("{}/ajax/opinions.php", self.base_url))
            .query(&[
                ("action", "get"),
                ("type", kind.as_query()),
                ("language", &self.language),
                ("resultsLimit", &self.page_size.to_string()),
                ("shopId", &self.shop_id.to_string()),
                ("resultsPage", &page.to_string()),
                ("ordersBy[0][elementName]", "date"),
                ("ordersBy[0][sortDirection]", "DESC"),
            ])
            .send()
            .await?;

        let text = response.text().await?;
        let fragment = extract_json_fragment(&text).ok_or_else(|| {
            TaskError::processing(format!("opinions page {} carried no JSON payload", page))
        })?;
        let body: Value = serde_json::from_str(fragment)?;

        let opinions = body["results"]
            .as_array()
            .map(|results| results.iter().map(parse_opinion).collect())
            .unwrap_or_default();
        Ok(opinions)
    }

    /// Product name via the projector endpoint; `None` when the reply
    /// carries no product.
    pub async fn product_name(&self, product_id: i64) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!("{}/ajax/projector.php", self.base_url))
            .query(&[
                ("action", "get"),
                ("product", &product_id.to_string()),
                ("get", "product"),
            ])
            .send()
            .await?;

        let text = response.text().await?;
        let Some(fragment) = extract_json_fragment(&text) else {
            return Ok(None);
        };
        let body: Value = serde_json::from_str(fragment)?;
        Ok(body["product"]["name"].as_str().map(str::to_string))
    }
}

/// The AJAX endpoints wrap their JSON in HTML noise. Returns the slice
/// between the first `{"` and the last `}`, if both are present.
pub fn extract_json_fragment(text: &str) -> Option<&str> {
    let start = text.find("{\"")?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_opinion(entry: &Value) -> Opinion {
    Opinion {
        order_sn: field_string(&entry["orderSn"]),
        create_date: field_string(&entry["createDate"]),
        product_id: entry["product"]["id"].as_i64(),
        rating: field_string(&entry["rating"]),
        content: entry["content"].as_str().unwrap_or_default().trim().to_string(),
    }
}

fn field_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
