pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::{map::VariantImageMap, types::ProductId};

/// Namespace of the metafield holding the variant image map.
pub const DEFAULT_NAMESPACE: &str = "variant_media";
/// Key of the metafield holding the variant image map.
pub const DEFAULT_KEY: &str = "image_map";
/// Metafield value type used for the map.
pub const JSON_TYPE: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Namespace/key pair addressing one metafield slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MetafieldKey {
    pub namespace: String,
    pub key: String,
}

impl Default for MetafieldKey {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

/// Write request for one metafield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldInput {
    pub owner_id: ProductId,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: String,
}

impl MetafieldInput {
    /// Input that overwrites the map slot of `owner_id` with `map`.
    pub fn for_image_map(owner_id: &str, key: &MetafieldKey, map: &VariantImageMap) -> PersistResult<Self> {
        Ok(Self {
            owner_id: owner_id.to_string(),
            namespace: key.namespace.clone(),
            key: key.key.clone(),
            value_type: JSON_TYPE.to_string(),
            value: map.to_json()?,
        })
    }
}

/// Stored metafield as returned after a write or read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafieldRecord {
    pub id: String,
    pub namespace: String,
    pub key: String,
    pub value: String,
}

/// Rejection reported by the store for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    pub field: Vec<String>,
    pub message: String,
}

/// Outcome of a metafield write: written records plus per-input rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetPayload {
    pub metafields: Vec<MetafieldRecord>,
    pub user_errors: Vec<UserError>,
}

/// Key-value metafield storage. Writes overwrite wholesale; last writer wins.
pub trait MetafieldStore: Send {
    fn read_metafield(&self, owner_id: &str, key: &MetafieldKey) -> PersistResult<Option<MetafieldRecord>>;
    fn set_metafields(&mut self, inputs: &[MetafieldInput]) -> PersistResult<MetafieldsSetPayload>;
}

impl<T: MetafieldStore + ?Sized> MetafieldStore for Box<T> {
    fn read_metafield(&self, owner_id: &str, key: &MetafieldKey) -> PersistResult<Option<MetafieldRecord>> {
        (**self).read_metafield(owner_id, key)
    }

    fn set_metafields(&mut self, inputs: &[MetafieldInput]) -> PersistResult<MetafieldsSetPayload> {
        (**self).set_metafields(inputs)
    }
}

/// Reads the persisted map of `owner_id`.
///
/// Store failures and malformed values are logged and yield an empty map.
pub fn load_image_map<S: MetafieldStore + ?Sized>(store: &S, owner_id: &str, key: &MetafieldKey) -> VariantImageMap {
    match store.read_metafield(owner_id, key) {
        Ok(record) => VariantImageMap::from_metafield_value(record.as_ref().map(|r| r.value.as_str())),
        Err(err) => {
            tracing::warn!(owner_id, error = %err, "variant image map read failed");
            VariantImageMap::new()
        }
    }
}

/// Overwrites the persisted map of `owner_id`.
pub fn save_image_map<S: MetafieldStore + ?Sized>(
    store: &mut S,
    owner_id: &str,
    key: &MetafieldKey,
    map: &VariantImageMap,
) -> PersistResult<MetafieldsSetPayload> {
    let input = MetafieldInput::for_image_map(owner_id, key, map)?;
    store.set_metafields(std::slice::from_ref(&input))
}
