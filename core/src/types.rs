//! Domain types and wire DTOs for the ad-generation service.
//!
//! # Design
//! `ProductData` is the single record the app keeps. Every way of creating
//! one (the constructor, and deserialization of a persisted blob) goes
//! through the same normalization, so a `ProductData` value always satisfies
//! the field rules regardless of where it came from.
//!
//! `AdResponse` is the typed decode of a service response. Only `adCopy` is
//! strict; every other field is read leniently so a wrong JSON type counts
//! as "absent" and gets the default instead of failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};

/// Substituted whenever no usable image URL is available.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://dummyimage.com/300x300/cccccc/ffffff.png";

pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Audience parameters attached to every generate-from-URL request.
pub const DEFAULT_GENDER: &str = "global";
pub const DEFAULT_AGE_GROUP: &str = "9-18";

/// The generated advertisement together with the product it describes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StoredProductData")]
pub struct ProductData {
    brand_name: String,
    product_name: String,
    product_description: String,
    target_audience: String,
    unique_selling_points: String,
    image_url: Option<String>,
    ad_copy: String,
}

impl ProductData {
    /// Build a normalized record.
    ///
    /// Empty brand/product names fall back to `UNKNOWN_BRAND` /
    /// `UNKNOWN_PRODUCT`. A present image URL that fails `is_valid_image_url`
    /// is replaced with `PLACEHOLDER_IMAGE_URL`; `None` stays `None`.
    pub fn new(
        brand_name: impl Into<String>,
        product_name: impl Into<String>,
        product_description: impl Into<String>,
        target_audience: impl Into<String>,
        unique_selling_points: impl Into<String>,
        image_url: Option<String>,
        ad_copy: impl Into<String>,
    ) -> Self {
        Self {
            brand_name: non_empty_or(brand_name.into(), UNKNOWN_BRAND),
            product_name: non_empty_or(product_name.into(), UNKNOWN_PRODUCT),
            product_description: product_description.into(),
            target_audience: target_audience.into(),
            unique_selling_points: unique_selling_points.into(),
            image_url: image_url.map(|url| resolve_image_url(Some(url))),
            ad_copy: ad_copy.into(),
        }
    }

    /// Identity key of the record.
    pub fn id(&self) -> &str {
        &self.product_name
    }

    pub fn brand_name(&self) -> &str {
        &self.brand_name
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_description(&self) -> &str {
        &self.product_description
    }

    pub fn target_audience(&self) -> &str {
        &self.target_audience
    }

    pub fn unique_selling_points(&self) -> &str {
        &self.unique_selling_points
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn ad_copy(&self) -> &str {
        &self.ad_copy
    }
}

/// Shape of a persisted record before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProductData {
    brand_name: String,
    product_name: String,
    product_description: String,
    target_audience: String,
    unique_selling_points: String,
    #[serde(default)]
    image_url: Option<String>,
    ad_copy: String,
}

impl From<StoredProductData> for ProductData {
    fn from(raw: StoredProductData) -> Self {
        ProductData::new(
            raw.brand_name,
            raw.product_name,
            raw.product_description,
            raw.target_audience,
            raw.unique_selling_points,
            raw.image_url,
            raw.ad_copy,
        )
    }
}

/// `true` for a non-empty URL starting with `http` in any letter case.
pub fn is_valid_image_url(url: &str) -> bool {
    url.get(..4)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"))
}

/// Keep a valid image URL, otherwise fall back to the placeholder.
pub fn resolve_image_url(url: Option<String>) -> String {
    match url {
        Some(url) if is_valid_image_url(&url) => url,
        _ => PLACEHOLDER_IMAGE_URL.to_string(),
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Product fields typed in by the user for generate-from-fields.
///
/// Serializes directly as the `/generateAdPrompt` body; all five keys are
/// always sent, empty or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManualFields {
    pub brand_name: String,
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub unique_selling_points: String,
}

impl ManualFields {
    pub fn new(brand_name: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.product_description = description.into();
        self
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    pub fn with_selling_points(mut self, points: impl Into<String>) -> Self {
        self.unique_selling_points = points.into();
        self
    }
}

/// Body of a `/createAd` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdRequest {
    pub url: String,
    pub gender: String,
    pub age_group: String,
}

impl CreateAdRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            gender: DEFAULT_GENDER.to_string(),
            age_group: DEFAULT_AGE_GROUP.to_string(),
        }
    }
}

/// Typed decode of a response from either endpoint.
///
/// `/generateAdPrompt` only returns `adCopy` and `imageUrl`; the remaining
/// fields are simply absent there.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdResponse {
    pub ad_copy: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub brand_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_audience: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unique_selling_points: Option<String>,
}

impl AdResponse {
    /// Record for a generate-from-URL call: every field comes from the
    /// response, defaulted where absent.
    pub fn into_scraped_product(self) -> ProductData {
        ProductData::new(
            self.brand_name.unwrap_or_default(),
            self.product_name.unwrap_or_default(),
            self.product_description.unwrap_or_default(),
            self.target_audience.unwrap_or_default(),
            self.unique_selling_points.unwrap_or_default(),
            Some(resolve_image_url(self.image_url)),
            self.ad_copy,
        )
    }

    /// Record for a generate-from-fields call: product fields are echoed from
    /// the caller's input, only the ad copy and image come from the server.
    pub fn into_manual_product(self, fields: &ManualFields) -> ProductData {
        ProductData::new(
            fields.brand_name.clone(),
            fields.product_name.clone(),
            fields.product_description.clone(),
            fields.target_audience.clone(),
            fields.unique_selling_points.clone(),
            Some(resolve_image_url(self.image_url)),
            self.ad_copy,
        )
    }
}

/// Accept a string, treat any other JSON value (or null) as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}
