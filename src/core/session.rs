use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::{
    engine::grouping::{derive, invert, reverse_derive},
    map::{Assignment, ReverseImageMap, VariantImageMap},
    op::EditOp,
    types::{Image, ImageId, ProductId, Variant, VariantId},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown image: {0}")]
    UnknownImage(ImageId),
    #[error("unknown variant: {0}")]
    UnknownVariant(VariantId),
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("no save in flight")]
    NoSaveInFlight,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// Body handed to the save endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub product_id: ProductId,
    pub image_map: VariantImageMap,
}

/// In-memory editor state for one product.
///
/// Only the sparse assignment is stored; the grouped map is derived on read.
#[derive(Debug, Default)]
pub struct EditorSession {
    product_id: ProductId,
    images: Vec<Image>,
    variants: Vec<Variant>,
    image_ids: HashSet<ImageId>,
    variant_ids: HashSet<VariantId>,
    assignments: Assignment,
    undo: Vec<EditOp>,
    redo: Vec<EditOp>,
    saving: Option<u64>,
    generation: u64,
    saved_generation: u64,
}

impl EditorSession {
    /// Fresh session with no assignments. Images without an id are dropped.
    pub fn new(product_id: impl Into<ProductId>, images: Vec<Image>, variants: Vec<Variant>) -> Self {
        let images: Vec<Image> = images.into_iter().filter(|img| !img.id.is_empty()).collect();
        let image_ids = images.iter().map(|img| img.id.clone()).collect();
        let variant_ids = variants.iter().map(|v| v.id.clone()).collect();
        Self {
            product_id: product_id.into(),
            images,
            variants,
            image_ids,
            variant_ids,
            ..Self::default()
        }
    }

    /// Session restored from a previously persisted map.
    pub fn load(
        product_id: impl Into<ProductId>,
        images: Vec<Image>,
        variants: Vec<Variant>,
        persisted: &VariantImageMap,
    ) -> Self {
        let mut session = Self::new(product_id, images, variants);
        session.assignments = reverse_derive(session.images.iter().map(|img| &img.id), persisted);
        session
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn assignments(&self) -> &Assignment {
        &self.assignments
    }

    /// Sets (`Some`) or clears (`None`) the explicit variant of `image`.
    ///
    /// Re-applying the current value records nothing and leaves the session clean.
    pub fn assign(&mut self, image: &str, variant: Option<&str>) -> Result<EditOp, SessionError> {
        if !self.image_ids.contains(image) {
            return Err(SessionError::UnknownImage(image.to_string()));
        }
        if let Some(variant) = variant {
            if !self.variant_ids.contains(variant) {
                return Err(SessionError::UnknownVariant(variant.to_string()));
            }
        }

        let variant = variant.map(str::to_string);
        let prev = self.assignments.get(image).cloned();
        let unchanged = variant == prev;
        let op = EditOp::Assign {
            image: image.to_string(),
            variant,
            prev,
        };
        if !unchanged {
            self.record(op.clone());
        }
        Ok(op)
    }

    /// Removes every explicit assignment.
    pub fn clear(&mut self) -> EditOp {
        let op = EditOp::Replace {
            next: Assignment::new(),
            prev: self.assignments.clone(),
        };
        self.record(op.clone());
        op
    }

    pub fn undo(&mut self) -> Result<EditOp, SessionError> {
        let op = self.undo.pop().ok_or(SessionError::NothingToUndo)?;
        op.apply_to(&mut self.assignments);
        self.generation += 1;
        self.redo.push(op.inverse());
        Ok(op)
    }

    pub fn redo(&mut self) -> Result<EditOp, SessionError> {
        let op = self.redo.pop().ok_or(SessionError::NothingToRedo)?;
        op.apply_to(&mut self.assignments);
        self.generation += 1;
        self.undo.push(op.inverse());
        Ok(op)
    }

    /// Grouped map for display and saving.
    pub fn image_map(&self) -> VariantImageMap {
        derive(self.images.iter().map(|img| &img.id), &self.assignments)
    }

    pub fn reverse_map(&self) -> ReverseImageMap {
        invert(&self.image_map())
    }

    /// Effective variant of `image`, explicit or inherited.
    pub fn variant_for(&self, image: &str) -> Option<VariantId> {
        self.reverse_map().remove(image)
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// True when edits happened since the last successful save or load.
    pub fn is_dirty(&self) -> bool {
        self.generation != self.saved_generation
    }

    /// Marks a save as in flight and returns what to persist.
    pub fn begin_save(&mut self) -> Result<SavePayload, SessionError> {
        if self.saving.is_some() {
            return Err(SessionError::SaveInFlight);
        }
        self.saving = Some(self.generation);
        Ok(SavePayload {
            product_id: self.product_id.clone(),
            image_map: self.image_map(),
        })
    }

    /// Clears the busy flag. Assignments are never touched.
    pub fn finish_save(&mut self, succeeded: bool) -> Result<(), SessionError> {
        let started_at = self.saving.take().ok_or(SessionError::NoSaveInFlight)?;
        if succeeded {
            self.saved_generation = started_at;
        }
        Ok(())
    }

    fn record(&mut self, op: EditOp) {
        op.apply_to(&mut self.assignments);
        self.generation += 1;
        self.undo.push(op.inverse());
        self.redo.clear();
    }
}
