//! Per-platform preview model for a generated ad.
//!
//! A photo the user picked on the device always wins over the record's
//! image URL. It is only ever composited locally; nothing here sends it
//! anywhere.

use std::fmt;

use crate::types::ProductData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Instagram,
    Twitter,
    Facebook,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 3] = [
        SocialPlatform::Instagram,
        SocialPlatform::Twitter,
        SocialPlatform::Facebook,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::Twitter => "Twitter",
            SocialPlatform::Facebook => "Facebook",
        }
    }

    /// Height of the preview frame in points.
    pub fn preview_height(self) -> u32 {
        match self {
            SocialPlatform::Instagram => 300,
            SocialPlatform::Twitter => 200,
            SocialPlatform::Facebook => 400,
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Opaque handle to a photo held by the host (file path, asset id, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewImage {
    Local(LocalImage),
    Remote(String),
    /// Solid frame; no image available.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdPreview {
    pub platform: SocialPlatform,
    pub height: u32,
    pub image: PreviewImage,
    pub caption: String,
}

impl AdPreview {
    pub fn compose(product: &ProductData, platform: SocialPlatform, overlay: Option<LocalImage>) -> Self {
        let image = match (overlay, product.image_url()) {
            (Some(local), _) => PreviewImage::Local(local),
            (None, Some(url)) => PreviewImage::Remote(url.to_string()),
            (None, None) => PreviewImage::Blank,
        };
        Self {
            platform,
            height: platform.preview_height(),
            image,
            caption: product.ad_copy().to_string(),
        }
    }

    /// One preview per platform, in `SocialPlatform::ALL` order.
    pub fn for_all_platforms(product: &ProductData, overlay: Option<LocalImage>) -> Vec<Self> {
        SocialPlatform::ALL
            .into_iter()
            .map(|platform| Self::compose(product, platform, overlay.clone()))
            .collect()
    }
}
