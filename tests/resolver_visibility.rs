use std::collections::BTreeMap;

use variant_gallery::{
    engine::resolver::{GalleryFilter, GalleryPayload, GalleryResolver, resolve, visible_images},
    map::{MediaTable, VariantImageMap},
};

fn media(pairs: &[(&str, &str)]) -> MediaTable {
    pairs
        .iter()
        .map(|(id, url)| (id.to_string(), url.to_string()))
        .collect()
}

fn single_group() -> VariantImageMap {
    VariantImageMap::from_json(r#"{"V1":["I1"]}"#).expect("map")
}

#[test]
fn selected_group_shows_only_its_images() {
    let table = media(&[("I1", "url1"), ("I2", "url2")]);
    let view = visible_images(&single_group(), &table, "V1", ["I1", "I2"]);
    assert_eq!(view.shown, vec!["I1".to_string()]);
    assert_eq!(view.hidden, vec!["I2".to_string()]);
    assert!(view.urls.contains("url1"));
    assert_eq!(view.urls.len(), 1);
}

#[test]
fn unknown_variant_shows_everything() {
    let table = media(&[("I1", "url1"), ("I2", "url2")]);
    let view = visible_images(&single_group(), &table, "V9", ["I1", "I2"]);
    assert_eq!(view.shown.len(), 2);
    assert!(view.hidden.is_empty());
}

#[test]
fn empty_map_is_inert() {
    let table = media(&[("I1", "url1")]);
    let view = visible_images(&VariantImageMap::new(), &table, "V1", ["I1", "I2"]);
    assert_eq!(view.shown, vec!["I1".to_string(), "I2".to_string()]);
    assert_eq!(resolve(&VariantImageMap::new(), &table, "V1"), GalleryFilter::ShowAll);
}

#[test]
fn empty_group_shows_everything() {
    let map = VariantImageMap::from_json(r#"{"V1":[],"V2":["I2"]}"#).expect("map");
    let table = media(&[("I1", "url1"), ("I2", "url2")]);
    assert_eq!(resolve(&map, &table, "V1"), GalleryFilter::ShowAll);
}

#[test]
fn resolution_misses_are_hidden() {
    let map = VariantImageMap::from_json(r#"{"V1":["I1","I404"]}"#).expect("map");
    let table = media(&[("I1", "url1"), ("I2", "url2")]);
    let view = visible_images(&map, &table, "V1", ["I1", "I2", "I3"]);
    assert_eq!(view.shown, vec!["I1".to_string()]);
    assert_eq!(view.hidden, vec!["I2".to_string(), "I3".to_string()]);
}

#[test]
fn images_sharing_a_url_match_by_url() {
    let map = VariantImageMap::from_json(r#"{"V1":["I1"]}"#).expect("map");
    let table = media(&[("I1", "same"), ("I2", "same"), ("I3", "other")]);
    let view = visible_images(&map, &table, "V1", ["I1", "I2", "I3"]);
    assert_eq!(view.shown, vec!["I1".to_string(), "I2".to_string()]);
}

#[test]
fn any_media_lookup_can_be_injected() {
    let table: BTreeMap<String, String> = [("I1".to_string(), "url1".to_string())].into_iter().collect();
    let view = visible_images(&single_group(), &table, "V1", ["I1", "I2"]);
    assert!(view.is_shown("I1"));
    assert!(!view.is_shown("I2"));
}

#[test]
fn page_resolver_canonicalizes_numeric_ids() {
    let payload: GalleryPayload = serde_json::from_str(
        r#"{
            "imageMap": {"gid://shopify/ProductVariant/11": ["gid://shopify/MediaImage/1"]},
            "mediaMap": {
                "gid://shopify/MediaImage/1": "https://cdn.example/1.jpg",
                "gid://shopify/MediaImage/2": "https://cdn.example/2.jpg"
            }
        }"#,
    )
    .expect("payload");
    let resolver = GalleryResolver::new(payload, ["1", "2"]);

    let view = resolver.on_variant_change("11");
    assert_eq!(view.shown, vec!["gid://shopify/MediaImage/1".to_string()]);
    assert_eq!(view.hidden, vec!["gid://shopify/MediaImage/2".to_string()]);

    let again = resolver.on_variant_change("gid://shopify/ProductVariant/11");
    assert_eq!(again, view);

    let other = resolver.on_variant_change("12");
    assert_eq!(other.shown.len(), 2);
}

#[test]
fn inert_resolver_shows_all_for_any_variant() {
    let resolver = GalleryResolver::inert(["1", "2", "3"]);
    assert_eq!(resolver.on_variant_change("5").shown.len(), 3);
    assert_eq!(resolver.page_images()[0], "gid://shopify/MediaImage/1");
}

#[test]
fn missing_payload_fields_default_to_empty() {
    let payload: GalleryPayload = serde_json::from_str("{}").expect("payload");
    assert!(payload.image_map.is_empty());
    assert!(payload.media_map.is_empty());
}

#[test]
fn null_or_ill_typed_map_leaves_gallery_inert() {
    for raw in [
        r#"{"imageMap":null,"mediaMap":{"I1":"url1"}}"#,
        r#"{"imageMap":{"V1":3},"mediaMap":{"I1":"url1"}}"#,
        r#"{"imageMap":[],"mediaMap":null}"#,
    ] {
        let payload: GalleryPayload = serde_json::from_str(raw).expect(raw);
        assert!(payload.image_map.is_empty(), "{raw}");
        let resolver = GalleryResolver::new(payload, ["I1", "I2"]);
        assert_eq!(resolver.on_variant_change("V1").shown.len(), 2, "{raw}");
    }

    let payload: GalleryPayload = serde_json::from_str(r#"{"imageMap":null,"mediaMap":{"I1":"url1"}}"#).expect("payload");
    assert_eq!(payload.media_map.len(), 1);
}
