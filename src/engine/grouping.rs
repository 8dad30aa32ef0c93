//! Carry-forward grouping of ordered images under variants.
//!
//! An explicit assignment marks the image where a variant's group starts;
//! every following image inherits that variant until the next assignment.
//! Images before the first assignment belong to no group.

use crate::{
    map::{Assignment, ReverseImageMap, VariantImageMap},
    types::{ImageId, VariantId},
};

/// Derives the dense variant image map from image order and sparse assignments.
///
/// The result is a pure function of its inputs and always a fresh map.
pub fn derive<'a, I>(images: I, assignments: &Assignment) -> VariantImageMap
where
    I: IntoIterator<Item = &'a ImageId>,
{
    let (map, _active) = images.into_iter().fold(
        (VariantImageMap::new(), None::<&VariantId>),
        |(mut map, active), image| {
            let active = explicit_variant(assignments, image).or(active);
            if let Some(variant) = active {
                map.push(variant.clone(), image.clone());
            }
            (map, active)
        },
    );
    map
}

/// Reconstructs the editable assignment from a persisted map.
///
/// Only the first image of each contiguous run of one variant, walked in
/// image order, becomes an explicit assignment. For maps produced by
/// [`derive`] over the same images this is an exact inverse. Other maps are
/// reconstructed best-effort: an image listed under several variants keeps
/// the last one, and images missing from `images` are ignored.
pub fn reverse_derive<'a, I>(images: I, map: &VariantImageMap) -> Assignment
where
    I: IntoIterator<Item = &'a ImageId>,
{
    let owner = invert(map);
    let (assignments, _active) = images.into_iter().fold(
        (Assignment::new(), None::<&VariantId>),
        |(mut assignments, active), image| {
            let Some(variant) = owner.get(image) else {
                return (assignments, active);
            };
            if active != Some(variant) {
                assignments.insert(image.clone(), variant.clone());
            }
            (assignments, Some(variant))
        },
    );
    assignments
}

/// Builds the image -> variant inverse. Later groups win on duplicates.
pub fn invert(map: &VariantImageMap) -> ReverseImageMap {
    map.iter()
        .flat_map(|(variant, images)| images.iter().map(move |image| (image.clone(), variant.clone())))
        .collect()
}

fn explicit_variant<'a>(assignments: &'a Assignment, image: &str) -> Option<&'a VariantId> {
    assignments.get(image).filter(|variant| !variant.is_empty())
}
