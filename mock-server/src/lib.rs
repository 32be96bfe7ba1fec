//! Stand-in for the remote ad-generation service.
//!
//! Serves `POST /createAd` and `POST /generateAdPrompt` with deterministic
//! copy so clients can be exercised end-to-end without the real backend.
//! Product URLs on a few reserved hosts trigger failure modes:
//!
//! - `error.test`: 500 with a plain-text body
//! - `malformed.test`: 200 with a body that has no `adCopy`
//! - `garbage.test`: 200 with a body that is not JSON

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAd {
    pub url: String,
    pub gender: String,
    pub age_group: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAdPrompt {
    pub brand_name: String,
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub unique_selling_points: String,
}

/// What a "scrape" of a product page yields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProduct {
    pub brand_name: String,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_selling_points: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdResponse {
    pub ad_copy: String,
    #[serde(flatten)]
    pub product: ScrapedProduct,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAdPromptResponse {
    pub ad_copy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Product pages the server "knows", keyed by URL. Fixed at startup.
pub type Catalog = Arc<HashMap<String, ScrapedProduct>>;

pub fn app() -> Router {
    app_with_catalog(HashMap::new())
}

pub fn app_with_catalog(products: HashMap<String, ScrapedProduct>) -> Router {
    let catalog: Catalog = Arc::new(products);
    Router::new()
        .route("/createAd", post(create_ad))
        .route("/generateAdPrompt", post(generate_ad_prompt))
        .with_state(catalog)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_ad(State(catalog): State<Catalog>, Json(input): Json<CreateAd>) -> Response {
    info!(url = %input.url, gender = %input.gender, age_group = %input.age_group, "createAd");
    if input.url.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "url must not be empty").into_response();
    }
    match host_of(&input.url) {
        "error.test" => return (StatusCode::INTERNAL_SERVER_ERROR, "scraper crashed").into_response(),
        "malformed.test" => {
            return Json(serde_json::json!({"brandName": "Broken", "imageUrl": "https://img.test/x.png"}))
                .into_response()
        }
        "garbage.test" => return (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => {}
    }

    let product = match catalog.get(&input.url) {
        Some(known) => known.clone(),
        None => scrape(&input.url),
    };
    let ad_copy = ad_copy_for(&product.brand_name, &product.product_name, &input.age_group);
    Json(CreateAdResponse { ad_copy, product }).into_response()
}

async fn generate_ad_prompt(Json(input): Json<GenerateAdPrompt>) -> Json<GenerateAdPromptResponse> {
    info!(brand = %input.brand_name, product = %input.product_name, "generateAdPrompt");
    let mut ad_copy = ad_copy_for(&input.brand_name, &input.product_name, &input.target_audience);
    if !input.unique_selling_points.is_empty() {
        ad_copy.push_str(&format!(" {}", input.unique_selling_points));
    }
    Json(GenerateAdPromptResponse {
        ad_copy,
        image_url: None,
    })
}

fn ad_copy_for(brand: &str, product: &str, audience: &str) -> String {
    if audience.is_empty() {
        format!("Meet the {product} from {brand}.")
    } else {
        format!("Meet the {product} from {brand}, made for {audience}.")
    }
}

/// Derive brand and product names from the URL alone.
fn scrape(url: &str) -> ScrapedProduct {
    let host = host_of(url);
    let brand = host
        .trim_start_matches("www.")
        .split('.')
        .next()
        .unwrap_or_default();
    let product = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && *segment != host)
        .unwrap_or_default();
    ScrapedProduct {
        brand_name: capitalize(brand),
        product_name: capitalize(&product.replace('-', " ")),
        ..ScrapedProduct::default()
    }
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', '?', '#']).next().unwrap_or_default()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
