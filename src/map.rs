//! Assignment, variant image map, and media table data model.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{ImageId, Url, VariantId};

/// Sparse explicit image -> variant choices ("group starts").
pub type Assignment = HashMap<ImageId, VariantId>;

/// Image -> variant inverse of a [`VariantImageMap`]. Never persisted.
pub type ReverseImageMap = HashMap<ImageId, VariantId>;

/// Image -> display URL table supplied by the catalog.
pub type MediaTable = HashMap<ImageId, Url>;

/// Dense variant -> ordered image list grouping.
///
/// Variant keys keep first-appearance order so the persisted JSON is stable.
/// Equality ignores key order but not list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantImageMap(IndexMap<VariantId, Vec<ImageId>>);

impl VariantImageMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no variant owns any group.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of variant groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ordered images for `variant`, if it has a group.
    pub fn get(&self, variant: &str) -> Option<&[ImageId]> {
        self.0.get(variant).map(Vec::as_slice)
    }

    /// Appends `image` to the group of `variant`, creating it on first use.
    pub fn push(&mut self, variant: VariantId, image: ImageId) {
        self.0.entry(variant).or_default().push(image);
    }

    /// Iterates groups in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariantId, &[ImageId])> {
        self.0.iter().map(|(v, images)| (v, images.as_slice()))
    }

    /// Total number of grouped image entries.
    pub fn image_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Decodes the persisted JSON object form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Decodes a possibly absent or malformed metafield value.
    ///
    /// Anything that is not an object of string arrays yields an empty map.
    pub fn from_metafield_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
            return Self::new();
        };
        match Self::from_json(raw) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed variant image map");
                Self::new()
            }
        }
    }

    /// Encodes the persisted JSON object form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<(VariantId, Vec<ImageId>)> for VariantImageMap {
    fn from_iter<T: IntoIterator<Item = (VariantId, Vec<ImageId>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VariantImageMap {
    type Item = (&'a VariantId, &'a Vec<ImageId>);
    type IntoIter = indexmap::map::Iter<'a, VariantId, Vec<ImageId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_variant_order() {
        let map: VariantImageMap = [
            ("V2".to_string(), vec!["I1".to_string()]),
            ("V1".to_string(), vec!["I2".to_string(), "I3".to_string()]),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.to_json().unwrap(), r#"{"V2":["I1"],"V1":["I2","I3"]}"#);
    }

    #[test]
    fn malformed_values_decode_as_empty() {
        for raw in [None, Some(""), Some("not json"), Some("[]"), Some("null"), Some(r#"{"V1": 3}"#)] {
            assert!(VariantImageMap::from_metafield_value(raw).is_empty(), "{raw:?}");
        }
    }

    #[test]
    fn valid_value_decodes() {
        let map = VariantImageMap::from_metafield_value(Some(r#"{"V1":["I1","I2"]}"#));
        assert_eq!(map.get("V1"), Some(&["I1".to_string(), "I2".to_string()][..]));
        assert_eq!(map.image_count(), 2);
    }
}
