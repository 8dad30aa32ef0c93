//! SQLite-backed catalog and metafield store.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};

use crate::api::{CatalogProduct, GatewayError, MediaNode, ProductCatalog};

use super::{
    MetafieldInput, MetafieldKey, MetafieldRecord, MetafieldStore, MetafieldsSetPayload,
    PersistResult, UserError,
};

const METAFIELD_GID_PREFIX: &str = "gid://shopify/Metafield/";

/// SQLite implementation of [`MetafieldStore`] and [`ProductCatalog`].
pub struct SqliteMetafieldStore {
    conn: Connection,
}

impl SqliteMetafieldStore {
    /// Opens or creates a store at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Registers or moves a product under `shop`/`handle`.
    pub fn upsert_product(&mut self, product_id: &str, shop: &str, handle: &str) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO products(product_id, shop, handle) VALUES (?1, ?2, ?3)
             ON CONFLICT(product_id) DO UPDATE SET shop = excluded.shop, handle = excluded.handle",
            params![product_id, shop, handle],
        )?;
        Ok(())
    }

    /// Replaces the ordered media list of `product_id`.
    pub fn replace_media(&mut self, product_id: &str, media: &[MediaNode]) -> PersistResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM media WHERE product_id = ?1", params![product_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO media(product_id, position, media_id, preview_url) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, node) in media.iter().enumerate() {
                stmt.execute(params![product_id, position as i64, node.id, node.preview_url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Ordered media of `product_id`, at most `limit` entries.
    pub fn media(&self, product_id: &str, limit: usize) -> PersistResult<Vec<MediaNode>> {
        let mut stmt = self.conn.prepare(
            "SELECT media_id, preview_url FROM media WHERE product_id = ?1 ORDER BY position ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![product_id, limit as i64], |row| {
            Ok(MediaNode {
                id: row.get(0)?,
                preview_url: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn product_exists(&self, product_id: &str) -> PersistResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM products WHERE product_id = ?1",
                params![product_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn validate(&self, idx: usize, input: &MetafieldInput) -> PersistResult<Option<UserError>> {
        let field = |name: &str| vec!["metafields".to_string(), idx.to_string(), name.to_string()];
        if !self.product_exists(&input.owner_id)? {
            return Ok(Some(UserError {
                field: field("ownerId"),
                message: "Owner does not exist".to_string(),
            }));
        }
        if input.value_type == super::JSON_TYPE
            && serde_json::from_str::<serde_json::Value>(&input.value).is_err()
        {
            return Ok(Some(UserError {
                field: field("value"),
                message: "Value is invalid JSON".to_string(),
            }));
        }
        Ok(None)
    }
}

impl MetafieldStore for SqliteMetafieldStore {
    fn read_metafield(&self, owner_id: &str, key: &MetafieldKey) -> PersistResult<Option<MetafieldRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, namespace, key, value FROM metafields
                 WHERE owner_id = ?1 AND namespace = ?2 AND key = ?3",
                params![owner_id, key.namespace, key.key],
                |row| {
                    let id: i64 = row.get(0)?;
                    Ok(MetafieldRecord {
                        id: format!("{METAFIELD_GID_PREFIX}{id}"),
                        namespace: row.get(1)?,
                        key: row.get(2)?,
                        value: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn set_metafields(&mut self, inputs: &[MetafieldInput]) -> PersistResult<MetafieldsSetPayload> {
        let mut user_errors = Vec::new();
        for (idx, input) in inputs.iter().enumerate() {
            if let Some(err) = self.validate(idx, input)? {
                user_errors.push(err);
            }
        }
        if !user_errors.is_empty() {
            return Ok(MetafieldsSetPayload {
                metafields: Vec::new(),
                user_errors,
            });
        }

        let ts_ms = now_ms();
        let tx = self.conn.transaction()?;
        let mut metafields = Vec::with_capacity(inputs.len());
        {
            let mut upsert = tx.prepare(
                "INSERT INTO metafields(owner_id, namespace, key, type, value, updated_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(owner_id, namespace, key)
                 DO UPDATE SET type = excluded.type, value = excluded.value, updated_ms = excluded.updated_ms",
            )?;
            let mut lookup = tx.prepare(
                "SELECT id FROM metafields WHERE owner_id = ?1 AND namespace = ?2 AND key = ?3",
            )?;
            for input in inputs {
                upsert.execute(params![
                    input.owner_id,
                    input.namespace,
                    input.key,
                    input.value_type,
                    input.value,
                    ts_ms as i64,
                ])?;
                let id: i64 = lookup.query_row(
                    params![input.owner_id, input.namespace, input.key],
                    |row| row.get(0),
                )?;
                metafields.push(MetafieldRecord {
                    id: format!("{METAFIELD_GID_PREFIX}{id}"),
                    namespace: input.namespace.clone(),
                    key: input.key.clone(),
                    value: input.value.clone(),
                });
            }
        }
        tx.commit()?;

        Ok(MetafieldsSetPayload {
            metafields,
            user_errors: Vec::new(),
        })
    }
}

impl ProductCatalog for SqliteMetafieldStore {
    fn product_by_handle(
        &self,
        shop: &str,
        handle: &str,
        key: &MetafieldKey,
        media_limit: usize,
    ) -> Result<Option<CatalogProduct>, GatewayError> {
        let product_id: Option<String> = self
            .conn
            .query_row(
                "SELECT product_id FROM products WHERE shop = ?1 AND handle = ?2",
                params![shop, handle],
                |row| row.get(0),
            )
            .optional()
            .map_err(super::PersistError::from)?;

        let Some(product_id) = product_id else {
            return Ok(None);
        };

        let image_map_value = self.read_metafield(&product_id, key)?.map(|r| r.value);
        let media = self.media(&product_id, media_limit)?;
        Ok(Some(CatalogProduct {
            product_id,
            image_map_value,
            media,
        }))
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
