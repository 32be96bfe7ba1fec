//! Stateless request builder and response normalizer for the ad service.
//!
//! # Design
//! `AdClient` holds only a `base_url`. Each generation mode is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that turns an `HttpResponse` into a normalized `ProductData`. Whoever sits
//! between the two performs the round-trip, keeping this type free of I/O.
//!
//! Response handling is the same for both modes: a non-2xx status is
//! `RequestFailed`, a body without a string `adCopy` is `MalformedResponse`,
//! and everything else is defaulted rather than rejected. The modes differ
//! only in where the product fields come from.

use tracing::debug;

use crate::error::AdError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AdResponse, CreateAdRequest, ManualFields, ProductData};

pub const CREATE_AD_PATH: &str = "/createAd";
pub const GENERATE_AD_PROMPT_PATH: &str = "/generateAdPrompt";

#[derive(Debug, Clone)]
pub struct AdClient {
    base_url: String,
}

impl AdClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate-from-URL request. Callers are expected to skip the call
    /// entirely for an empty `product_url`.
    pub fn build_create_ad(&self, product_url: &str) -> Result<HttpRequest, AdError> {
        self.post_json(CREATE_AD_PATH, &CreateAdRequest::for_url(product_url))
    }

    /// Generate-from-fields request. All five fields are sent even when empty.
    pub fn build_generate_ad_prompt(&self, fields: &ManualFields) -> Result<HttpRequest, AdError> {
        self.post_json(GENERATE_AD_PROMPT_PATH, fields)
    }

    /// Normalize a `/createAd` response. Product fields come from the body.
    pub fn parse_create_ad(&self, response: HttpResponse) -> Result<ProductData, AdError> {
        let decoded = decode(response)?;
        let product = decoded.into_scraped_product();
        debug!(product = product.id(), image = ?product.image_url(), "normalized scraped product");
        Ok(product)
    }

    /// Normalize a `/generateAdPrompt` response. Product fields are echoed
    /// from `fields`; only ad copy and image come from the body.
    pub fn parse_generate_ad_prompt(
        &self,
        fields: &ManualFields,
        response: HttpResponse,
    ) -> Result<ProductData, AdError> {
        let decoded = decode(response)?;
        let product = decoded.into_manual_product(fields);
        debug!(product = product.id(), image = ?product.image_url(), "normalized manual product");
        Ok(product)
    }

    fn post_json<T: serde::Serialize>(&self, path: &str, payload: &T) -> Result<HttpRequest, AdError> {
        let body = serde_json::to_string(payload).map_err(|e| AdError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Classify the status, then decode the body into an `AdResponse`.
fn decode(response: HttpResponse) -> Result<AdResponse, AdError> {
    if !response.is_success() {
        return Err(AdError::RequestFailed {
            status: Some(response.status),
            cause: format!("HTTP {}: {}", response.status, response.body),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| AdError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PLACEHOLDER_IMAGE_URL;

    fn client() -> AdClient {
        AdClient::new("http://localhost:3000")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_create_ad_produces_correct_request() {
        let req = client().build_create_ad("https://shop.example/p/1").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/createAd");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"url": "https://shop.example/p/1", "gender": "global", "ageGroup": "9-18"})
        );
    }

    #[test]
    fn build_generate_ad_prompt_sends_all_fields() {
        let fields = ManualFields::new("Acme", "Widget").with_target_audience("Makers");
        let req = client().build_generate_ad_prompt(&fields).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/generateAdPrompt");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "brandName": "Acme",
                "productName": "Widget",
                "productDescription": "",
                "targetAudience": "Makers",
                "uniqueSellingPoints": ""
            })
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = AdClient::new("http://localhost:3000/");
        let req = client.build_create_ad("https://x").unwrap();
        assert_eq!(req.path, "http://localhost:3000/createAd");
    }

    #[test]
    fn parse_create_ad_reads_fields_with_defaults() {
        let product = client()
            .parse_create_ad(ok(r#"{"adCopy":"Great!","brandName":"X","imageUrl":"https://img/a.png"}"#))
            .unwrap();
        assert_eq!(product.ad_copy(), "Great!");
        assert_eq!(product.brand_name(), "X");
        assert_eq!(product.product_name(), "Unknown Product");
        assert_eq!(product.image_url(), Some("https://img/a.png"));
        assert_eq!(product.product_description(), "");
        assert_eq!(product.target_audience(), "");
        assert_eq!(product.unique_selling_points(), "");
    }

    #[test]
    fn parse_create_ad_defaults_names_when_absent() {
        let product = client().parse_create_ad(ok(r#"{"adCopy":"Hi"}"#)).unwrap();
        assert_eq!(product.brand_name(), "Unknown Brand");
        assert_eq!(product.product_name(), "Unknown Product");
        assert_eq!(product.image_url(), Some(PLACEHOLDER_IMAGE_URL));
    }

    #[test]
    fn parse_create_ad_replaces_invalid_image_urls() {
        for image in [r#""ftp://x""#, r#""""#, "null", "17"] {
            let body = format!(r#"{{"adCopy":"Hi","imageUrl":{image}}}"#);
            let product = client().parse_create_ad(ok(&body)).unwrap();
            assert_eq!(product.image_url(), Some(PLACEHOLDER_IMAGE_URL), "{image}");
        }
    }

    #[test]
    fn parse_generate_ad_prompt_echoes_input_fields() {
        let fields = ManualFields::new("Acme", "Widget");
        let product = client()
            .parse_generate_ad_prompt(
                &fields,
                ok(r#"{"adCopy":"Buy now!","brandName":"Server Brand","productName":"Server Product"}"#),
            )
            .unwrap();
        assert_eq!(product.brand_name(), "Acme");
        assert_eq!(product.product_name(), "Widget");
        assert_eq!(product.product_description(), "");
        assert_eq!(product.ad_copy(), "Buy now!");
        assert_eq!(product.image_url(), Some(PLACEHOLDER_IMAGE_URL));
    }

    #[test]
    fn parse_generate_ad_prompt_replaces_invalid_image_urls() {
        let fields = ManualFields::new("Acme", "Widget");
        for image in [r#""ftp://x""#, r#""""#, "null", "17"] {
            let body = format!(r#"{{"adCopy":"Hi","imageUrl":{image}}}"#);
            let product = client().parse_generate_ad_prompt(&fields, ok(&body)).unwrap();
            assert_eq!(product.image_url(), Some(PLACEHOLDER_IMAGE_URL), "{image}");
        }
    }

    #[test]
    fn parse_generate_ad_prompt_keeps_valid_image() {
        let fields = ManualFields::new("Acme", "Widget");
        let product = client()
            .parse_generate_ad_prompt(&fields, ok(r#"{"adCopy":"Go","imageUrl":"http://img/w.png"}"#))
            .unwrap();
        assert_eq!(product.image_url(), Some("http://img/w.png"));
    }

    #[test]
    fn missing_ad_copy_is_malformed_in_both_modes() {
        let err = client().parse_create_ad(ok(r#"{"brandName":"X"}"#)).unwrap_err();
        assert!(matches!(err, AdError::MalformedResponse(_)));

        let fields = ManualFields::new("Acme", "Widget");
        let err = client()
            .parse_generate_ad_prompt(&fields, ok(r#"{"imageUrl":"http://x"}"#))
            .unwrap_err();
        assert!(matches!(err, AdError::MalformedResponse(_)));
    }

    #[test]
    fn non_string_ad_copy_is_malformed() {
        let err = client().parse_create_ad(ok(r#"{"adCopy":["a"]}"#)).unwrap_err();
        assert!(matches!(err, AdError::MalformedResponse(_)));
    }

    #[test]
    fn unparseable_body_is_malformed() {
        for body in ["not json", "", "[1,2]", "\"adCopy\""] {
            let err = client().parse_create_ad(ok(body)).unwrap_err();
            assert!(matches!(err, AdError::MalformedResponse(_)), "{body:?}");
        }
    }

    #[test]
    fn non_success_status_is_request_failed() {
        let response = HttpResponse {
            status: 503,
            headers: Vec::new(),
            body: r#"{"adCopy":"should be ignored"}"#.to_string(),
        };
        let err = client().parse_create_ad(response).unwrap_err();
        assert!(matches!(err, AdError::RequestFailed { status: Some(503), .. }));
    }
}
