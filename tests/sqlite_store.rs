use tempfile::TempDir;

use variant_gallery::{
    api::{MediaNode, ProductCatalog},
    map::VariantImageMap,
    persist::{
        MetafieldInput, MetafieldKey, MetafieldStore, load_image_map, save_image_map,
        sqlite::SqliteMetafieldStore,
    },
};

const PRODUCT: &str = "gid://shopify/Product/1";

fn seeded(store: &mut SqliteMetafieldStore) {
    store.upsert_product(PRODUCT, "demo.myshopify.com", "tee").expect("product");
    store
        .replace_media(
            PRODUCT,
            &[
                MediaNode::new("gid://shopify/MediaImage/1", "https://cdn.example/1.jpg"),
                MediaNode::new("gid://shopify/MediaImage/2", "https://cdn.example/2.jpg"),
                MediaNode::default(),
            ],
        )
        .expect("media");
}

#[test]
fn saved_map_survives_reopen_and_is_overwritten_wholesale() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("gallery.db");
    let key = MetafieldKey::default();

    let mut store = SqliteMetafieldStore::open(&db_path).expect("open sqlite");
    seeded(&mut store);

    let first = VariantImageMap::from_json(r#"{"V1":["I1","I2"],"V2":["I3"]}"#).expect("map");
    let payload = save_image_map(&mut store, PRODUCT, &key, &first).expect("save");
    assert!(payload.user_errors.is_empty());
    assert_eq!(payload.metafields.len(), 1);
    let first_id = payload.metafields[0].id.clone();

    let second = VariantImageMap::from_json(r#"{"V3":["I1"]}"#).expect("map");
    let payload = save_image_map(&mut store, PRODUCT, &key, &second).expect("save");
    assert_eq!(payload.metafields[0].id, first_id);

    drop(store);

    let reopened = SqliteMetafieldStore::open(&db_path).expect("reopen");
    assert_eq!(load_image_map(&reopened, PRODUCT, &key), second);
}

#[test]
fn unknown_owner_is_a_user_error_and_writes_nothing() {
    let mut store = SqliteMetafieldStore::open_in_memory().expect("open");
    let key = MetafieldKey::default();
    let map = VariantImageMap::from_json(r#"{"V1":["I1"]}"#).expect("map");

    let payload = save_image_map(&mut store, "gid://shopify/Product/404", &key, &map).expect("save");
    assert!(payload.metafields.is_empty());
    assert_eq!(payload.user_errors.len(), 1);
    assert_eq!(payload.user_errors[0].message, "Owner does not exist");
    assert_eq!(payload.user_errors[0].field, vec!["metafields", "0", "ownerId"]);
    assert!(
        store
            .read_metafield("gid://shopify/Product/404", &key)
            .expect("read")
            .is_none()
    );
}

#[test]
fn malformed_stored_value_loads_as_empty_map() {
    let mut store = SqliteMetafieldStore::open_in_memory().expect("open");
    seeded(&mut store);
    let key = MetafieldKey::default();

    let input = MetafieldInput {
        owner_id: PRODUCT.to_string(),
        namespace: key.namespace.clone(),
        key: key.key.clone(),
        value_type: "single_line_text_field".to_string(),
        value: "[1, 2".to_string(),
    };
    let payload = store.set_metafields(&[input]).expect("write");
    assert!(payload.user_errors.is_empty());

    assert!(load_image_map(&store, PRODUCT, &key).is_empty());
}

#[test]
fn catalog_lookup_returns_ordered_media_and_map_value() {
    let mut store = SqliteMetafieldStore::open_in_memory().expect("open");
    seeded(&mut store);
    let key = MetafieldKey::default();
    let map = VariantImageMap::from_json(r#"{"V1":["gid://shopify/MediaImage/2"]}"#).expect("map");
    save_image_map(&mut store, PRODUCT, &key, &map).expect("save");

    let product = store
        .product_by_handle("demo.myshopify.com", "tee", &key, 2)
        .expect("lookup")
        .expect("product");
    assert_eq!(product.product_id, PRODUCT);
    assert_eq!(product.media.len(), 2);
    assert_eq!(product.media[0].id.as_deref(), Some("gid://shopify/MediaImage/1"));
    assert_eq!(
        VariantImageMap::from_metafield_value(product.image_map_value.as_deref()),
        map
    );

    assert!(
        store
            .product_by_handle("other.myshopify.com", "tee", &key, 2)
            .expect("lookup")
            .is_none()
    );
}

#[test]
fn metafields_under_other_keys_are_isolated() {
    let mut store = SqliteMetafieldStore::open_in_memory().expect("open");
    seeded(&mut store);
    let default_key = MetafieldKey::default();
    let other_key = MetafieldKey {
        namespace: "custom".to_string(),
        key: "groups".to_string(),
    };
    let map = VariantImageMap::from_json(r#"{"V1":["I1"]}"#).expect("map");
    save_image_map(&mut store, PRODUCT, &other_key, &map).expect("save");

    assert!(load_image_map(&store, PRODUCT, &default_key).is_empty());
    assert_eq!(load_image_map(&store, PRODUCT, &other_key), map);
}
