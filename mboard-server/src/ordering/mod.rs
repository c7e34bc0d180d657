//! Sibling ordering engine
//!
//! Pure logic, no I/O. Two jobs:
//! - **Display sort**: the order siblings are shown in. Persisted `order`
//!   ascending, then stably re-sorted by each level's group key.
//! - **Move planning**: the new persisted `order` values for a one-step
//!   move up or down, renumbering the whole group so duplicate or gapped
//!   orders are repaired as a side effect.
//!
//! Every level (Genre, Mission, Task) goes through the same functions via the
//! [`Reorderable`] trait. Genres use `()` as their group key, so all genres of
//! a user form a single group and display order is plain manual order.

mod levels;

pub use levels::{mission_group_key, progress};

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Capability set needed to sort and reorder a sibling
pub trait Reorderable {
    /// Business-rule sort key; siblings with equal keys form a group
    type Key: Ord;

    fn id(&self) -> &str;

    /// Persisted manual order
    fn order(&self) -> i64;

    fn group_key(&self) -> Self::Key;
}

/// Group key for Missions and Tasks
///
/// Orders incomplete before complete, then by due date ascending with a
/// missing due date sorting after every real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupKey {
    pub complete: bool,
    pub due_date: Option<NaiveDate>,
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.complete
            .cmp(&other.complete)
            .then_with(|| match (self.due_date, other.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Direction of a one-step move in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(MoveError::InvalidDirection(other.to_string())),
        }
    }
}

/// Why a move was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Direction must be 'up' or 'down', got '{0}'")]
    InvalidDirection(String),

    #[error("Item not found among its siblings: {0}")]
    TargetNotFound(String),

    #[error("Cannot move any further")]
    CannotMoveFurther,

    #[error("Cannot reorder across a different due date or completion state; due date takes precedence")]
    CrossesGroup,
}

/// New persisted order for one sibling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: String,
    pub old_order: i64,
    pub new_order: i64,
}

/// Result of planning a move: one entry per member of the affected group,
/// in their new display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub updates: Vec<OrderUpdate>,
}

impl MovePlan {
    /// Updates whose order value actually changes
    pub fn changed(&self) -> impl Iterator<Item = &OrderUpdate> {
        self.updates.iter().filter(|u| u.old_order != u.new_order)
    }
}

/// Sort siblings into display order in place
///
/// Persisted order ascending (id breaks exact ties so the result never
/// depends on fetch order), then a stable sort on the group key.
pub fn sort_for_display<T: Reorderable>(items: &mut [T]) {
    items.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
    items.sort_by_key(|item| item.group_key());
}

/// Owned convenience wrapper around [`sort_for_display`]
pub fn display_sorted<T: Reorderable>(mut items: Vec<T>) -> Vec<T> {
    sort_for_display(&mut items);
    items
}

/// Range of the maximal contiguous run around `index` whose key equals `key(&items[index])`
///
/// # Panics
///
/// Panics if `index` is out of bounds.
pub fn group_bounds<T, K, F>(items: &[T], index: usize, key: F) -> Range<usize>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let target = key(&items[index]);

    let mut start = index;
    while start > 0 && key(&items[start - 1]) == target {
        start -= 1;
    }

    let mut end = index + 1;
    while end < items.len() && key(&items[end]) == target {
        end += 1;
    }

    start..end
}

/// Plan a one-step move of `target_id` within display-sorted `sorted`
///
/// `sorted` must already be in display order (see [`sort_for_display`]).
/// On success the plan covers every member of the target's group, renumbered
/// from the group's smallest existing order upward.
pub fn plan_move<T: Reorderable>(
    sorted: &[T],
    target_id: &str,
    direction: Direction,
) -> Result<MovePlan, MoveError> {
    let index = sorted
        .iter()
        .position(|item| item.id() == target_id)
        .ok_or_else(|| MoveError::TargetNotFound(target_id.to_string()))?;

    let swap_index = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|i| *i < sorted.len()),
    }
    .ok_or(MoveError::CannotMoveFurther)?;

    if sorted[index].group_key() != sorted[swap_index].group_key() {
        return Err(MoveError::CrossesGroup);
    }

    let group = group_bounds(sorted, index, |item| item.group_key());

    let slice = &sorted[group.clone()];
    let mut arranged: Vec<&T> = slice.iter().collect();
    arranged.swap(index - group.start, swap_index - group.start);

    // Renumber rather than swapping the two values: a swap of equal orders is a no-op
    let base = slice.iter().map(|item| item.order()).min().unwrap_or(0);

    let updates = arranged
        .into_iter()
        .enumerate()
        .map(|(position, item)| OrderUpdate {
            id: item.id().to_string(),
            old_order: item.order(),
            new_order: base + position as i64,
        })
        .collect();

    Ok(MovePlan { updates })
}
