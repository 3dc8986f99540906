//! Keyboard focus order of the follower index form

use super::view::{FormActions, FormView};
use ccr_core::FieldId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(FieldId),
    AdvancedToggle,
    Save,
    Cancel,
}

impl FocusTarget {
    /// Focusable elements in tab order. Read-only fields are skipped.
    pub fn order(view: &FormView) -> Vec<FocusTarget> {
        let mut order: Vec<FocusTarget> = [&view.name, &view.remote_cluster.field, &view.leader_index]
            .into_iter()
            .filter(|field| field.editable)
            .map(|field| FocusTarget::Field(field.id))
            .collect();

        if view.advanced_toggle.is_some() {
            order.push(FocusTarget::AdvancedToggle);
        }
        order.extend(
            view.advanced_fields
                .iter()
                .filter(|field| field.editable)
                .map(|field| FocusTarget::Field(field.id)),
        );

        if let FormActions::Buttons { .. } = view.actions {
            order.push(FocusTarget::Save);
            order.push(FocusTarget::Cancel);
        }
        order
    }

    /// Next target after `self`, wrapping around. Falls back to the first target
    /// when `self` is no longer focusable.
    pub fn next(self, order: &[FocusTarget]) -> Option<FocusTarget> {
        Self::step(self, order, 1)
    }

    pub fn previous(self, order: &[FocusTarget]) -> Option<FocusTarget> {
        Self::step(self, order, order.len().saturating_sub(1))
    }

    fn step(current: FocusTarget, order: &[FocusTarget], offset: usize) -> Option<FocusTarget> {
        if order.is_empty() {
            return None;
        }
        match order.iter().position(|target| *target == current) {
            Some(index) => order.get((index + offset) % order.len()).copied(),
            None => order.first().copied(),
        }
    }
}
