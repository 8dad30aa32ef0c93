use crate::{
    config::GalleryConfig,
    engine::resolver::GalleryPayload,
    map::{MediaTable, VariantImageMap},
};

use super::{ApiResponse, MediaNode, ProductCatalog};

/// Serves `{ imageMap, mediaMap }` for the product at `shop`/`handle`.
///
/// Failures always come back as a `{ error }` body with status >= 400 so the
/// page can fall back to its native gallery.
pub fn public_variant_images<C: ProductCatalog + ?Sized>(
    catalog: &C,
    config: &GalleryConfig,
    shop: &str,
    handle: &str,
) -> ApiResponse {
    if handle.trim().is_empty() {
        return ApiResponse::with_error(400, "Product handle is required");
    }
    if shop.trim().is_empty() {
        return ApiResponse::with_error(400, "Shop domain is required");
    }

    let product = match catalog.product_by_handle(shop, handle, &config.metafield, config.media_page_size) {
        Ok(Some(product)) => product,
        Ok(None) => {
            tracing::debug!(shop, handle, "product not found");
            return ApiResponse::with_error(404, "Product not found");
        }
        Err(err) => {
            tracing::error!(shop, handle, error = %err, "catalog lookup failed");
            return ApiResponse::with_error(500, "Failed to fetch product data");
        }
    };

    let payload = GalleryPayload {
        image_map: VariantImageMap::from_metafield_value(product.image_map_value.as_deref()),
        media_map: media_table(&product.media),
    };
    match serde_json::to_value(&payload) {
        Ok(body) => ApiResponse::ok(body),
        Err(err) => {
            tracing::error!(shop, handle, error = %err, "encoding gallery payload failed");
            ApiResponse::with_error(500, "Failed to fetch product data")
        }
    }
}

/// Keeps only nodes that carry both an id and a preview URL.
pub fn media_table(nodes: &[MediaNode]) -> MediaTable {
    nodes
        .iter()
        .filter_map(|node| match (&node.id, &node.preview_url) {
            (Some(id), Some(url)) if !id.is_empty() => Some((id.clone(), url.clone())),
            _ => None,
        })
        .collect()
}
