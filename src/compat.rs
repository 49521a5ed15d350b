//! Compatibility check between two shared tables (SPEC_FULL.md §4.7): `self`
//! is compatible with `other` if every sid `other` can resolve to text, `self`
//! resolves to the same sid for that same text.

use crate::table::UnifiedTable;

impl UnifiedTable {
    /// Whether every symbol `other` knows can be looked up through `self` and
    /// lands on the same sid. Not symmetric in general: a table with strictly
    /// more symbols than `other` is still compatible with it.
    #[must_use]
    pub fn is_compatible(&self, other: &UnifiedTable) -> bool {
        other
            .iter_known_symbols()
            .all(|(sid, text)| matches!(self.find_sid_by_text(text), Ok(Some(found)) if found == sid))
    }
}
