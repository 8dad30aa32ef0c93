//! Storefront visibility resolution for the selected variant.

use hashbrown::HashSet;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::{
    map::{MediaTable, VariantImageMap},
    types::{ImageId, Url, media_image_gid, product_variant_gid},
};

use super::traits::MediaLookup;

/// Which images a page should show for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryFilter {
    /// No usable group; leave the native gallery untouched.
    ShowAll,
    /// Show only images whose resolved URL is in this set.
    Only(HashSet<Url>),
}

impl GalleryFilter {
    /// Whether `image` is visible under this filter. Lookup misses are hidden.
    pub fn shows<M: MediaLookup + ?Sized>(&self, media: &M, image: &str) -> bool {
        match self {
            Self::ShowAll => true,
            Self::Only(urls) => media.url_for(image).is_some_and(|url| urls.contains(url)),
        }
    }
}

/// Result of one visibility evaluation over the page's images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryView {
    /// Images to display, in page order.
    pub shown: Vec<ImageId>,
    /// Images to hide, in page order.
    pub hidden: Vec<ImageId>,
    /// Resolved URLs of the shown images.
    pub urls: HashSet<Url>,
}

impl GalleryView {
    /// True when `image` ended up visible.
    pub fn is_shown(&self, image: &str) -> bool {
        self.shown.iter().any(|id| id == image)
    }
}

/// Computes the filter for `selected`.
///
/// An empty map, or a variant without a non-empty group, falls back to
/// [`GalleryFilter::ShowAll`].
pub fn resolve<M: MediaLookup + ?Sized>(map: &VariantImageMap, media: &M, selected: &str) -> GalleryFilter {
    if map.is_empty() {
        return GalleryFilter::ShowAll;
    }
    match map.get(selected) {
        Some(group) if !group.is_empty() => GalleryFilter::Only(
            group
                .iter()
                .filter_map(|image| media.url_for(image))
                .map(str::to_string)
                .collect(),
        ),
        _ => GalleryFilter::ShowAll,
    }
}

/// Splits `known_images` into shown and hidden for the selected variant.
pub fn visible_images<M, I>(map: &VariantImageMap, media: &M, selected: &str, known_images: I) -> GalleryView
where
    M: MediaLookup + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let filter = resolve(map, media, selected);
    let mut view = GalleryView::default();
    for image in known_images {
        let image = image.as_ref();
        if filter.shows(media, image) {
            if let Some(url) = media.url_for(image) {
                view.urls.insert(url.to_string());
            }
            view.shown.push(image.to_string());
        } else {
            view.hidden.push(image.to_string());
        }
    }
    view
}

/// Payload returned by the public read endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPayload {
    /// Persisted variant image map.
    #[serde(default, deserialize_with = "or_empty")]
    pub image_map: VariantImageMap,
    /// Image id -> URL table.
    #[serde(default, deserialize_with = "or_empty")]
    pub media_map: MediaTable,
}

/// Null or ill-typed fields decode as empty instead of failing the payload.
fn or_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(raw).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring malformed gallery payload field");
        T::default()
    }))
}

/// Page-side state: the fetched payload plus the page's images.
///
/// Holds no selection state; every call re-evaluates from scratch.
#[derive(Debug, Clone, Default)]
pub struct GalleryResolver {
    payload: GalleryPayload,
    page_images: Vec<ImageId>,
}

impl GalleryResolver {
    /// Builds a resolver from page-local media ids (numeric or global).
    pub fn new<I>(payload: GalleryPayload, page_media_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            payload,
            page_images: page_media_ids
                .into_iter()
                .map(|id| media_image_gid(id.as_ref()))
                .collect(),
        }
    }

    /// Resolver for a failed fetch: every image stays visible.
    pub fn inert<I>(page_media_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::new(GalleryPayload::default(), page_media_ids)
    }

    /// Canonical ids of the page's images, in page order.
    pub fn page_images(&self) -> &[ImageId] {
        &self.page_images
    }

    /// Variant-change callback. Accepts a numeric or global variant id.
    pub fn on_variant_change(&self, variant_id: &str) -> GalleryView {
        let selected = product_variant_gid(variant_id);
        visible_images(
            &self.payload.image_map,
            &self.payload.media_map,
            &selected,
            &self.page_images,
        )
    }
}
