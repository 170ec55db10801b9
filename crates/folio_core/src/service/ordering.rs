//! In-memory reordering of the display sequence.
//!
//! # Responsibility
//! - Compute drag-to-reposition moves before anything is persisted.
//!
//! # Invariants
//! - A move relocates exactly one element; everything between the old and
//!   new position shifts by one slot.
//! - Moves are computed on the full list, so dragging inside a visible
//!   subset (featured only, grid only) keeps the relative order of items
//!   outside that subset.

use crate::model::portfolio::{ItemId, PortfolioItem};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("position {index} is out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("item {0} is not in the current list")]
    UnknownItem(ItemId),
}

/// Moves the element at `from` so it ends up at index `to`.
pub fn move_index<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), OrderingError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(OrderingError::IndexOutOfRange { index, len });
        }
    }
    let moved = items.remove(from);
    items.insert(to, moved);
    Ok(())
}

/// Returns `items` with `moved` relocated to the current index of `target`.
///
/// `None` means dropping an item on itself, which is not a move.
pub fn move_by_id(
    items: &[PortfolioItem],
    moved: ItemId,
    target: ItemId,
) -> Result<Option<Vec<PortfolioItem>>, OrderingError> {
    let from = position_of(items, moved)?;
    let to = position_of(items, target)?;
    if moved == target {
        return Ok(None);
    }

    let mut reordered = items.to_vec();
    move_index(&mut reordered, from, to)?;
    Ok(Some(reordered))
}

/// Sets each item's `order` to its position.
pub fn renumber(items: &mut [PortfolioItem]) {
    for (position, item) in items.iter_mut().enumerate() {
        item.order = position as i64;
    }
}

fn position_of(items: &[PortfolioItem], id: ItemId) -> Result<usize, OrderingError> {
    items
        .iter()
        .position(|item| item.id == id)
        .ok_or(OrderingError::UnknownItem(id))
}
