//! Variant-scoped product galleries: carry-forward image grouping on the
//! editor side and selected-variant filtering on the storefront side.
//!
//! # Examples
//!
//! Grouping and reloading with [`engine::grouping`]:
//! ```
//! use variant_gallery::{
//!     engine::grouping::{derive, reverse_derive},
//!     map::Assignment,
//! };
//!
//! let images: Vec<String> = ["I1", "I2", "I3", "I4"].map(String::from).to_vec();
//! let mut assignments = Assignment::new();
//! assignments.insert("I1".to_string(), "V1".to_string());
//! assignments.insert("I3".to_string(), "V2".to_string());
//!
//! let map = derive(&images, &assignments);
//! assert_eq!(map.to_json().unwrap(), r#"{"V1":["I1","I2"],"V2":["I3","I4"]}"#);
//! assert_eq!(reverse_derive(&images, &map), assignments);
//! ```
//!
//! Storefront filtering with [`engine::resolver`]:
//! ```
//! use variant_gallery::{engine::resolver::visible_images, map::{MediaTable, VariantImageMap}};
//!
//! let map = VariantImageMap::from_json(r#"{"V1":["I1"]}"#).unwrap();
//! let mut media = MediaTable::new();
//! media.insert("I1".to_string(), "url1".to_string());
//! media.insert("I2".to_string(), "url2".to_string());
//!
//! let view = visible_images(&map, &media, "V1", ["I1", "I2"]);
//! assert_eq!(view.shown, vec!["I1".to_string()]);
//! assert_eq!(view.hidden, vec!["I2".to_string()]);
//! ```

/// Storefront read and editor save request handlers.
pub mod api;
/// TOML configuration.
pub mod config;
/// Editor session state.
pub mod core;
/// Grouping engine and storefront resolver.
pub mod engine;
/// Assignment, variant image map, and media table types.
pub mod map;
/// Undoable editor mutations.
pub mod op;
/// Metafield persistence abstraction and SQLite implementation.
pub mod persist;
/// Single-writer editor runtime and events.
pub mod runtime;
/// Identifiers, catalog records, and global-id templates.
pub mod types;
