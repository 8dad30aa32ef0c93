use serde_json::{Value, json};

use crate::{
    config::GalleryConfig,
    map::VariantImageMap,
    persist::{MetafieldStore, save_image_map},
};

use super::{ApiResponse, Session};

/// Persists `{ productId, imageMap }` for an authenticated editor.
///
/// The whole map slot is overwritten; nothing is written when validation
/// fails.
pub fn save_mapping<S: MetafieldStore + ?Sized>(
    session: Option<&Session>,
    store: &mut S,
    config: &GalleryConfig,
    body: &[u8],
) -> ApiResponse {
    let Some(session) = session else {
        return ApiResponse::with_message(401, "Unauthorized");
    };

    let body: Value = match serde_json::from_slice(body) {
        Ok(body) => body,
        Err(_) => return ApiResponse::with_message(400, "Invalid JSON body"),
    };

    let product_id = body.get("productId").and_then(Value::as_str).filter(|id| !id.trim().is_empty());
    let raw_map = body.get("imageMap").filter(|map| map.is_object());
    let (Some(product_id), Some(raw_map)) = (product_id, raw_map) else {
        return ApiResponse::with_message(400, "Missing productId or imageMap");
    };

    let map: VariantImageMap = match serde_json::from_value(raw_map.clone()) {
        Ok(map) => map,
        Err(_) => return ApiResponse::with_message(400, "imageMap values must be arrays of image ids"),
    };

    tracing::info!(shop = %session.shop, product_id, variants = map.len(), "saving variant image map");
    match save_image_map(store, product_id, &config.metafield, &map) {
        Ok(payload) if !payload.user_errors.is_empty() => {
            tracing::error!(product_id, errors = ?payload.user_errors, "metafield write rejected");
            ApiResponse {
                status: 500,
                body: json!({
                    "message": "Error saving metafield",
                    "errors": payload.user_errors,
                }),
            }
        }
        Ok(payload) => ApiResponse::ok(json!({
            "success": true,
            "metafields": payload.metafields,
        })),
        Err(err) => {
            tracing::error!(product_id, error = %err, "metafield write failed");
            ApiResponse::with_message(500, "An internal server error occurred.")
        }
    }
}
