use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::config::toml_config::PanelConfig;
use crate::domain::model::{CostLookup, ProductInfo, ShippingCost, SkuInfo};
use crate::utils::error::{Result, TaskError};

/// Client for the shop admin-panel v3 REST API. One request per call,
/// fixed timeout, no retry; callers decide how a failure maps to row
/// sentinels.
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: Client,
    base_url: String,
    api_key: String,
    not_found_message: String,
}

impl PanelClient {
    pub fn new(config: &PanelConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            not_found_message: config.not_found_message.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Shipping cost for one parcel number. The panel answers 200 or 207;
    /// a not-found parcel and a parcel without payment data are reported
    /// in-band, not as HTTP errors.
    pub async fn shipping_cost(&self, parcel_number: &str) -> Result<CostLookup> {
        let response = self
            .http
            .get(self.endpoint("/api/admin/v3/orders/packages"))
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .query(&[("deliveryPackageNumbers", parcel_number)])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 && status != 207 {
            return Err(TaskError::processing(format!(
                "shipping cost request for parcel {} failed with status {}",
                parcel_number, status
            )));
        }

        let body: Value = response.json().await?;
        let results = body["results"].as_array().cloned().unwrap_or_default();
        if results.is_empty() {
            return Ok(CostLookup::NoResults);
        }

        for result in &results {
            if result["errors"]["faultString"].as_str() == Some(self.not_found_message.as_str()) {
                return Ok(CostLookup::NotFound);
            }
        }

        let costs = &results[0]["deliveryPackage"]["deliveryPackageParameters"]["shippingCosts"];
        match costs.as_array().and_then(|c| c.first()) {
            Some(cost) => Ok(CostLookup::Found(ShippingCost {
                net: number_at(cost, "shippingCostNet"),
                gross: number_at(cost, "shippingCostGross"),
                vat: number_at(cost, "shippingCostVat"),
            })),
            None => Ok(CostLookup::NoPaymentData),
        }
    }

    /// Product parameters by product index: size chart name, auction
    /// icon, photo URLs. `None` when the panel returned no results.
    pub async fn product_parameters(&self, product_id: &str) -> Result<Option<ProductInfo>> {
        let request_data = serde_json::json!({
            "params": {
                "returnElements": ["sizeschart_name", "icon_for_auctions", "pictures"],
                "productIndexes": [{"productIndex": product_id}],
            }
        });

        let response = self
            .http
            .post(self.endpoint("/api/admin/v3/products/products/get"))
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .json(&request_data)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let Some(product) = body["results"].as_array().and_then(|r| r.first()) else {
            return Ok(None);
        };

        let image_urls = product["productImages"]
            .as_array()
            .map(|images| {
                images
                    .iter()
                    .filter_map(|img| img["productImageLargeUrl"].as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(ProductInfo {
            size_chart_name: string_at(product, "sizeChartName"),
            auction_icon_url: product["productAuctionIcon"]["productAuctionIconLargeUrl"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            image_urls,
        }))
    }

    /// SKU fields (size name, producer code) by product index. The SKU
    /// list can span several results; the last entry wins.
    pub async fn sku_info(&self, product_id: &str) -> Result<Option<SkuInfo>> {
        let response = self
            .http
            .get(self.endpoint("/api/admin/v3/products/SKUbyBarcode"))
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .query(&[("productIndices", product_id)])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let mut info: Option<SkuInfo> = None;
        for result in body["results"].as_array().unwrap_or(&Vec::new()) {
            for sku in result["productSkuList"].as_array().unwrap_or(&Vec::new()) {
                let entry = info.get_or_insert_with(SkuInfo::default);
                if let Some(size) = sku["sizeName"].as_str() {
                    entry.size_name = size.to_string();
                }
                if let Some(code) = sku["codeProducer"].as_str() {
                    entry.code_producer = code.to_string();
                }
            }
        }
        Ok(info)
    }

    /// Displayed product code by product ID; the last result wins.
    pub async fn displayed_code(&self, product_id: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(self.endpoint("/api/admin/v3/products/products"))
            .header("Accept", "application/json")
            .header("X-API-KEY", &self.api_key)
            .query(&[("productIds", product_id)])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        let mut code = None;
        for result in body["results"].as_array().unwrap_or(&Vec::new()) {
            if let Some(value) = result["productDisplayedCode"].as_str() {
                code = Some(value.to_string());
            }
        }
        Ok(code)
    }
}

fn number_at(value: &Value, field: &str) -> Option<f64> {
    match &value[field] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_at(value: &Value, field: &str) -> String {
    value[field].as_str().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> PanelClient {
        PanelClient::new(&PanelConfig {
            base_url: server.base_url(),
            api_key: "test-key".to_string(),
            timeout_seconds: 5,
            not_found_message: "Nie odnaleziono paczki o podanym numerze".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn shipping_cost_extracts_the_first_cost_entry() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/admin/v3/orders/packages")
                .query_param("deliveryPackageNumbers", "A1")
                .header("X-API-KEY", "test-key");
            then.status(200).json_body(serde_json::json!({
                "results": [{
                    "deliveryPackage": {
                        "deliveryPackageParameters": {
                            "shippingCosts": [
                                {"shippingCostNet": 10.0, "shippingCostGross": "12.30", "shippingCostVat": 2.3},
                                {"shippingCostNet": 99.0}
                            ]
                        }
                    }
                }]
            }));
        });

        let lookup = client_for(&server).shipping_cost("A1").await.unwrap();
        mock.assert();
        assert_eq!(
            lookup,
            CostLookup::Found(ShippingCost {
                net: Some(10.0),
                gross: Some(12.3),
                vat: Some(2.3),
            })
        );
    }

    #[tokio::test]
    async fn shipping_cost_maps_fault_string_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/v3/orders/packages");
            then.status(207).json_body(serde_json::json!({
                "results": [{
                    "errors": {"faultString": "Nie odnaleziono paczki o podanym numerze"}
                }]
            }));
        });

        let lookup = client_for(&server).shipping_cost("A2").await.unwrap();
        assert_eq!(lookup, CostLookup::NotFound);
    }

    #[tokio::test]
    async fn shipping_cost_with_empty_results_is_not_the_fault_string_case() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/v3/orders/packages");
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let lookup = client_for(&server).shipping_cost("A5").await.unwrap();
        assert_eq!(lookup, CostLookup::NoResults);
    }

    #[tokio::test]
    async fn shipping_cost_without_cost_entries_means_no_payment_data() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/v3/orders/packages");
            then.status(200).json_body(serde_json::json!({
                "results": [{
                    "deliveryPackage": {
                        "deliveryPackageParameters": {"shippingCosts": []}
                    }
                }]
            }));
        });

        let lookup = client_for(&server).shipping_cost("A3").await.unwrap();
        assert_eq!(lookup, CostLookup::NoPaymentData);
    }

    #[tokio::test]
    async fn shipping_cost_rejects_unexpected_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/v3/orders/packages");
            then.status(500);
        });

        assert!(client_for(&server).shipping_cost("A4").await.is_err());
    }

    #[tokio::test]
    async fn product_parameters_walks_the_fixed_result_path() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/admin/v3/products/products/get");
            then.status(200).json_body(serde_json::json!({
                "results": [{
                    "sizeChartName": "41-26,5/42-27",
                    "productAuctionIcon": {"productAuctionIconLargeUrl": "icons/1.jpg"},
                    "productImages": [
                        {"productImageLargeUrl": "img/a.jpg"},
                        {"productImageLargeUrl": "img/b.jpg"}
                    ]
                }]
            }));
        });

        let info = client_for(&server)
            .product_parameters("1001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.size_chart_name, "41-26,5/42-27");
        assert_eq!(info.auction_icon_url, "icons/1.jpg");
        assert_eq!(info.image_urls, vec!["img/a.jpg", "img/b.jpg"]);
    }

    #[tokio::test]
    async fn product_parameters_with_empty_results_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/admin/v3/products/products/get");
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let info = client_for(&server).product_parameters("1001").await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn sku_info_keeps_the_last_sku_entry() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/admin/v3/products/SKUbyBarcode")
                .query_param("productIndices", "1001");
            then.status(200).json_body(serde_json::json!({
                "results": [{
                    "productSkuList": [
                        {"sizeName": "41", "codeProducer": "111"},
                        {"sizeName": "42", "codeProducer": "222"}
                    ]
                }]
            }));
        });

        let info = client_for(&server).sku_info("1001").await.unwrap().unwrap();
        assert_eq!(info.size_name, "42");
        assert_eq!(info.code_producer, "222");
    }
}
