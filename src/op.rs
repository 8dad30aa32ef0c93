//! Editor mutation model with precomputed inverses.

use crate::{
    map::Assignment,
    types::{ImageId, VariantId},
};

/// One undoable change to the explicit assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Set (`Some`) or remove (`None`) the explicit variant of one image.
    Assign {
        /// Image whose assignment changes.
        image: ImageId,
        /// New explicit variant.
        variant: Option<VariantId>,
        /// Explicit variant before the change.
        prev: Option<VariantId>,
    },
    /// Replace the whole assignment.
    Replace {
        /// Assignment after the change.
        next: Assignment,
        /// Assignment before the change.
        prev: Assignment,
    },
}

impl EditOp {
    /// Returns the op that undoes `self`.
    pub fn inverse(&self) -> Self {
        match self {
            Self::Assign {
                image,
                variant,
                prev,
            } => Self::Assign {
                image: image.clone(),
                variant: prev.clone(),
                prev: variant.clone(),
            },
            Self::Replace { next, prev } => Self::Replace {
                next: prev.clone(),
                prev: next.clone(),
            },
        }
    }

    /// Applies this op in place to `assignments`.
    pub fn apply_to(&self, assignments: &mut Assignment) {
        match self {
            Self::Assign { image, variant, .. } => match variant {
                Some(variant) => {
                    assignments.insert(image.clone(), variant.clone());
                }
                None => {
                    assignments.remove(image);
                }
            },
            Self::Replace { next, .. } => {
                assignments.clone_from(next);
            }
        }
    }
}
