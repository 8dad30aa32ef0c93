//! Request handlers for the storefront read and editor save endpoints.
//!
//! Transport, routing, and authentication stay with the host; handlers take
//! already-extracted inputs and return a status plus JSON body.

/// Public storefront read endpoint.
pub mod public;
/// Authenticated editor save endpoint.
pub mod save;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    persist::{MetafieldKey, PersistError},
    types::{ImageId, ProductId, Url},
};

/// Failure talking to the product catalog.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("persistence: {0}")]
    Persist(#[from] PersistError),
    #[error("upstream: {0}")]
    Upstream(String),
}

/// One media node as listed by the catalog. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaNode {
    pub id: Option<ImageId>,
    pub preview_url: Option<Url>,
}

impl MediaNode {
    pub fn new(id: impl Into<ImageId>, preview_url: impl Into<Url>) -> Self {
        Self {
            id: Some(id.into()),
            preview_url: Some(preview_url.into()),
        }
    }
}

/// Product data the read endpoint needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogProduct {
    pub product_id: ProductId,
    /// Raw value of the map metafield, if set.
    pub image_map_value: Option<String>,
    /// Media in catalog order, already limited by the caller's page size.
    pub media: Vec<MediaNode>,
}

/// Product lookup by storefront handle.
pub trait ProductCatalog {
    fn product_by_handle(
        &self,
        shop: &str,
        handle: &str,
        key: &MetafieldKey,
        media_limit: usize,
    ) -> Result<Option<CatalogProduct>, GatewayError>;
}

/// Authenticated admin session resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub shop: String,
}

/// Handler result: HTTP status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn with_error(status: u16, error: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": error }),
        }
    }

    fn with_message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "message": message }),
        }
    }
}
