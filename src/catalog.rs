use std::sync::Arc;

use crate::table::UnifiedTable;

/// External resolver from `(name, version)` to a shared table.
///
/// Implementations may tolerate returning a table with a different version
/// than requested; the reader binding handles the mismatch per SPEC_FULL.md
/// §4.5.
pub trait Catalog {
    fn get_table(&self, name: &str, version: u32) -> Option<Arc<UnifiedTable>>;
}

/// A catalog with no entries. Useful as a default when imports are not
/// expected to resolve, or in tests that exercise the missing-import path.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCatalog;

impl Catalog for EmptyCatalog {
    fn get_table(&self, _name: &str, _version: u32) -> Option<Arc<UnifiedTable>> {
        None
    }
}
