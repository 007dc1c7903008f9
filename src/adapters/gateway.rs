use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::config::toml_config::GatewayConfig;
use crate::utils::error::Result;

/// Client for the IAI gateway API. Authentication chains the current
/// date with the hashed secret key, as the gateway expects.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    login: String,
    secret_key: String,
}

/// `sha1(date + sha1_hex(secret))`, hex-encoded. `date` is `YYYYMMDD`.
pub fn auth_key(secret_key: &str, date: &str) -> String {
    let mut inner = Sha1::new();
    inner.update(secret_key.as_bytes());
    let inner_hex = format!("{:x}", inner.finalize());

    let mut outer = Sha1::new();
    outer.update(date.as_bytes());
    outer.update(inner_hex.as_bytes());
    format!("{:x}", outer.finalize())
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login: config.login.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Resolves "name size" for one EAN via `getSKUbyBarcode`. `None`
    /// when the gateway knows nothing about the barcode.
    pub async fn product_name(&self, ean: &str) -> Result<Option<String>> {
        let today = Utc::now().format("%Y%m%d").to_string();
        let request_data = serde_json::json!({
            "authenticate": {
                "userLogin": self.login,
                "authenticateKey": auth_key(&self.secret_key, &today),
            },
            "params": {
                "productIndices": [ean],
                "searchOnlyInCodeIai": "False",
            }
        });

        let response = self
            .http
            .post(format!(
                "{}/api/?gate=products/getSKUbyBarcode/193/json",
                self.base_url
            ))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json;charset=UTF-8")
            .json(&request_data)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let sku = &body["results"][0]["productSkuList"][0];
        let Some(name) = sku["productName"].as_str() else {
            return Ok(None);
        };
        let size = sku["sizeName"].as_str().unwrap_or_default();
        Ok(Some(format!("{} {}", name.trim(), size.trim()).trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn auth_key_chains_date_and_hashed_secret() {
        assert_eq!(
            auth_key("sekret", "20240115"),
            "528de0e67bf3b63c98ec1e7ea8c16a2d20e1c6ba"
        );
    }

    #[tokio::test]
    async fn product_name_joins_trimmed_name_and_size() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/");
            then.status(200).json_body(serde_json::json!({
                "results": [{
                    "productSkuList": [
                        {"productName": " Botki skórzane ", "sizeName": " 38 "}
                    ]
                }]
            }));
        });

        let client = GatewayClient::new(&GatewayConfig {
            base_url: server.base_url(),
            login: "login".to_string(),
            secret_key: "sekret".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();

        let name = client.product_name("5901234123457").await.unwrap();
        assert_eq!(name.as_deref(), Some("Botki skórzane 38"));
    }

    #[tokio::test]
    async fn product_name_is_none_for_unknown_barcode() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/");
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let client = GatewayClient::new(&GatewayConfig {
            base_url: server.base_url(),
            login: "login".to_string(),
            secret_key: "sekret".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();

        let name = client.product_name("000").await.unwrap();
        assert!(name.is_none());
    }
}
