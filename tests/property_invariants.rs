use std::collections::BTreeSet;

use proptest::prelude::*;

use variant_gallery::{
    core::session::{EditorSession, SessionError},
    engine::grouping::{derive, reverse_derive},
    map::Assignment,
    types::{Image, ImageId, Variant},
};

const VARIANTS: u8 = 5;

fn image_ids(n: usize) -> Vec<ImageId> {
    (0..n).map(|i| format!("gid://shopify/MediaImage/{i}")).collect()
}

fn variant_id(v: u8) -> String {
    format!("gid://shopify/ProductVariant/{v}")
}

fn scenario() -> impl Strategy<Value = (Vec<ImageId>, Assignment)> {
    (0usize..40).prop_flat_map(|n| {
        prop::collection::vec(prop::option::weighted(0.3, 0u8..VARIANTS), n).prop_map(move |slots| {
            let images = image_ids(n);
            let assignments = images
                .iter()
                .zip(slots)
                .filter_map(|(img, slot)| slot.map(|v| (img.clone(), variant_id(v))))
                .collect();
            (images, assignments)
        })
    })
}

#[derive(Debug, Clone)]
enum Action {
    Assign { target: u8, variant: Option<u8> },
    Clear,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        8 => (0u8..24, prop::option::of(0u8..VARIANTS))
            .prop_map(|(target, variant)| Action::Assign { target, variant }),
        1 => Just(Action::Clear),
    ]
}

proptest! {
    #[test]
    fn derive_partitions_images((images, assignments) in scenario()) {
        let map = derive(&images, &assignments);
        let mut seen = BTreeSet::new();
        for (_, group) in map.iter() {
            for image in group {
                prop_assert!(seen.insert(image.clone()), "{image} grouped twice");
            }
        }
    }

    #[test]
    fn derive_drops_exactly_the_leading_gap((images, assignments) in scenario()) {
        let map = derive(&images, &assignments);
        let first = images.iter().position(|img| assignments.contains_key(img));
        let expected = first.map_or(0, |idx| images.len() - idx);
        prop_assert_eq!(map.image_count(), expected);
        if let Some(idx) = first {
            for image in &images[..idx] {
                prop_assert!(map.iter().all(|(_, group)| !group.contains(image)));
            }
        }
    }

    #[test]
    fn derive_is_idempotent((images, assignments) in scenario()) {
        prop_assert_eq!(derive(&images, &assignments), derive(&images, &assignments));
    }

    #[test]
    fn reverse_derive_round_trips((images, assignments) in scenario()) {
        let map = derive(&images, &assignments);
        let restored = reverse_derive(&images, &map);
        prop_assert_eq!(derive(&images, &restored), map);
    }

    #[test]
    fn session_undo_redo_restores_assignments(actions in prop::collection::vec(action_strategy(), 1..80)) {
        let images: Vec<Image> = image_ids(24)
            .into_iter()
            .map(|id| Image::new(id.clone(), format!("https://cdn.example/{id}.jpg")))
            .collect();
        let variants: Vec<Variant> = (0..VARIANTS).map(|v| Variant::new(variant_id(v), format!("V{v}"))).collect();
        let mut session = EditorSession::new("gid://shopify/Product/1", images.clone(), variants);

        for action in actions {
            match action {
                Action::Assign { target, variant } => {
                    let image = &images[usize::from(target) % images.len()].id;
                    let variant = variant.map(variant_id);
                    session.assign(image, variant.as_deref()).expect("assign");
                }
                Action::Clear => {
                    session.clear();
                }
            }
        }

        let target = session.assignments().clone();
        let target_map = session.image_map();
        loop {
            match session.undo() {
                Ok(_) => {}
                Err(SessionError::NothingToUndo) => break,
                Err(other) => prop_assert!(false, "unexpected undo error: {other:?}"),
            }
        }
        prop_assert!(session.assignments().is_empty());

        loop {
            match session.redo() {
                Ok(_) => {}
                Err(SessionError::NothingToRedo) => break,
                Err(other) => prop_assert!(false, "unexpected redo error: {other:?}"),
            }
        }
        prop_assert_eq!(session.assignments(), &target);
        prop_assert_eq!(session.image_map(), target_map);
    }
}
