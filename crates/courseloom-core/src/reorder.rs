//! Sibling reordering: splice an element to its target position, then
//! re-stamp contiguous order indices.
//!
//! No sorting by value happens here. Drag-and-drop callers already know
//! the target position, so the engine trusts the requested ordering and
//! only rewrites `order_index` to `0..n-1`. Stepwise up/down controls and
//! arbitrary drag-to-position both reduce to the same splice.

use crate::error::StructuralViolation;
use crate::model::{Lesson, QuizQuestion, Section};

/// Sibling node whose position is tracked by an order index.
pub trait Ordered {
    fn order_index(&self) -> u32;
    fn set_order_index(&mut self, index: u32);
}

impl Ordered for Section {
    fn order_index(&self) -> u32 {
        self.order_index
    }
    fn set_order_index(&mut self, index: u32) {
        self.order_index = index;
    }
}

impl Ordered for Lesson {
    fn order_index(&self) -> u32 {
        self.order_index
    }
    fn set_order_index(&mut self, index: u32) {
        self.order_index = index;
    }
}

impl Ordered for QuizQuestion {
    fn order_index(&self) -> u32 {
        self.order_index
    }
    fn set_order_index(&mut self, index: u32) {
        self.order_index = index;
    }
}

/// Rewrite every sibling's `order_index` to its position in the list.
pub fn restamp<T: Ordered>(siblings: &mut [T]) {
    for (index, node) in siblings.iter_mut().enumerate() {
        node.set_order_index(index as u32);
    }
}

/// Check that sibling indices are exactly `0..n-1` in list order.
pub fn is_contiguous<T: Ordered>(siblings: &[T]) -> bool {
    siblings
        .iter()
        .enumerate()
        .all(|(index, node)| node.order_index() == index as u32)
}

/// Move the element at `from` so it ends up at position `to`, then
/// re-stamp all indices.
///
/// Returns `false` for a no-op drop (`from == to`): indices are left
/// untouched so the caller knows not to raise a reorder flag.
pub fn move_item<T: Ordered>(
    siblings: &mut Vec<T>,
    from: usize,
    to: usize,
) -> Result<bool, StructuralViolation> {
    let len = siblings.len();
    if from >= len || to >= len {
        return Err(StructuralViolation::PathOutOfBounds(format!(
            "move {from} -> {to} in a list of {len}"
        )));
    }
    if from == to {
        return Ok(false);
    }
    let node = siblings.remove(from);
    siblings.insert(to, node);
    restamp(siblings);
    Ok(true)
}

/// Swap-adjacent variant: move the element one position toward the front.
pub fn move_up<T: Ordered>(siblings: &mut Vec<T>, index: usize) -> Result<bool, StructuralViolation> {
    if index == 0 {
        return Ok(false);
    }
    move_item(siblings, index, index - 1)
}

/// Swap-adjacent variant: move the element one position toward the back.
pub fn move_down<T: Ordered>(
    siblings: &mut Vec<T>,
    index: usize,
) -> Result<bool, StructuralViolation> {
    if index + 1 >= siblings.len() {
        return Ok(false);
    }
    move_item(siblings, index, index + 1)
}
