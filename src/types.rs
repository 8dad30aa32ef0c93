//! Shared identifiers, catalog records, and global-id templates.

use serde::{Deserialize, Serialize};

/// Opaque global identifier of a product media image.
pub type ImageId = String;
/// Opaque global identifier of a product variant.
pub type VariantId = String;
/// Opaque global identifier of a product.
pub type ProductId = String;
/// Displayable image URL.
pub type Url = String;

/// Prefix of canonical media image ids.
pub const MEDIA_IMAGE_GID_PREFIX: &str = "gid://shopify/MediaImage/";
/// Prefix of canonical product variant ids.
pub const PRODUCT_VARIANT_GID_PREFIX: &str = "gid://shopify/ProductVariant/";

/// Product image in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Global image id.
    pub id: ImageId,
    /// Display URL.
    pub url: Url,
    /// Optional alt text.
    #[serde(default)]
    pub alt: Option<String>,
}

impl Image {
    /// Builds an image without alt text.
    pub fn new(id: impl Into<ImageId>, url: impl Into<Url>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            alt: None,
        }
    }
}

/// Purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Global variant id.
    pub id: VariantId,
    /// Human label.
    pub title: String,
}

impl Variant {
    /// Builds a variant.
    pub fn new(id: impl Into<VariantId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Canonical media image id for a page-local media id.
///
/// Values that already carry a `gid://` scheme are returned unchanged.
pub fn media_image_gid(local_id: &str) -> ImageId {
    canonical_gid(MEDIA_IMAGE_GID_PREFIX, local_id)
}

/// Canonical variant id for a page-local variant id.
///
/// Values that already carry a `gid://` scheme are returned unchanged.
pub fn product_variant_gid(local_id: &str) -> VariantId {
    canonical_gid(PRODUCT_VARIANT_GID_PREFIX, local_id)
}

fn canonical_gid(prefix: &str, local_id: &str) -> String {
    let trimmed = local_id.trim();
    if trimmed.starts_with("gid://") {
        trimmed.to_string()
    } else {
        format!("{prefix}{trimmed}")
    }
}
