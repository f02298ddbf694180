//! Role-based read scope and soft delete.
//!
//! Listing is never restricted by role or by visibility flags: hidden records
//! only disappear when the caller filters on the flag. Removal flips the flag
//! and keeps the row.

use crate::models::{Game, Role, Score};
use crate::query::Filter;

/// Scope of a detail read.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailScope {
    /// Restricted to the requested id
    Pinned(Filter),
    /// No id predicate
    Unrestricted,
}

/// Manual filter for a read, ANDed with the caller's query parameters.
///
/// Without a requested id this is the collection scope and restricts nothing.
/// With one, non-admins are pinned to it. Administrators get no id predicate,
/// so their detail read returns the collection.
pub fn scope_filter(role: Option<Role>, requested_id: Option<&str>) -> Filter {
    match requested_id {
        None => Filter::none(),
        Some(id) => match detail_scope(role, id) {
            DetailScope::Pinned(filter) => filter,
            DetailScope::Unrestricted => Filter::none(),
        },
    }
}

/// Detail scope for catalog entries.
pub fn detail_scope(role: Option<Role>, id: &str) -> DetailScope {
    // TODO: confirm with product whether admins should be pinned like everyone else.
    if role == Some(Role::Admin) {
        DetailScope::Unrestricted
    } else {
        DetailScope::Pinned(Filter::id_equals(id))
    }
}

/// Detail scope for resources that always resolve a single id.
pub fn pinned(id: &str) -> Filter {
    Filter::id_equals(id)
}

/// A record hidden by a flag instead of being deleted.
pub trait SoftDelete {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
}

impl SoftDelete for Game {
    fn is_visible(&self) -> bool {
        self.is_publish
    }

    fn set_visible(&mut self, visible: bool) {
        self.is_publish = visible;
    }
}

impl SoftDelete for Score {
    fn is_visible(&self) -> bool {
        self.is_active
    }

    fn set_visible(&mut self, visible: bool) {
        self.is_active = visible;
    }
}

/// Hide the record and report whether it was visible before. Removing an
/// already hidden record is not an error.
pub fn soft_delete<R: SoftDelete>(record: &mut R) -> bool {
    let was_visible = record.is_visible();
    record.set_visible(false);
    was_visible
}
