use std::sync::{Arc, OnceLock};

use crate::entry::{Sid, TableId};
use crate::table::UnifiedTable;

/// The sigil that introduces a sid-literal (`$324` refers to sid 324).
pub const SID_LITERAL_SIGIL: char = '$';

/// The reserved name of the system symbol table, used to recognize (and
/// ignore) self-referential import clauses.
pub const SYSTEM_SYMBOL_TABLE_NAME: &str = "$ion";

/// The annotation (by sid, within the system table) that marks a struct as
/// a symbol table value on the wire.
pub const SYMBOL_TABLE_ANNOTATION_SID: Sid = 3;
pub const SYMBOL_TABLE_ANNOTATION_TEXT: &str = "$ion_symbol_table";

/// The Format's reserved symbols, in declared order. Sid `n` (1-based) is
/// `SYSTEM_SYMBOLS[n - 1]`.
pub const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

impl UnifiedTable {
    /// The fixed, process-wide system table. Constructed once; every
    /// subsequent call returns a clone of the same `Arc`.
    #[must_use]
    pub fn system() -> Arc<UnifiedTable> {
        static SYSTEM: OnceLock<Arc<UnifiedTable>> = OnceLock::new();
        SYSTEM
            .get_or_init(|| {
                let id = TableId::next();
                let mut table = UnifiedTable::empty_system(id);
                for (i, text) in SYSTEM_SYMBOLS.iter().enumerate() {
                    let sid = (i + 1) as Sid;
                    table.install_raw(sid, Some(std::sync::Arc::from(*text)), id);
                    table.set_max_id(sid);
                }
                table.lock();
                Arc::new(table)
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_is_a_singleton() {
        let a = UnifiedTable::system();
        let b = UnifiedTable::system();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn system_table_has_nine_reserved_symbols() {
        let sys = UnifiedTable::system();
        assert_eq!(sys.max_id(), 9);
        assert_eq!(sys.find_known_text(3).unwrap().as_deref(), Some("$ion_symbol_table"));
        assert_eq!(sys.find_known_text(4).unwrap().as_deref(), Some("name"));
        assert_eq!(sys.find_known_text(8).unwrap().as_deref(), Some("max_id"));
    }

    #[test]
    fn system_table_is_locked_and_has_no_system_ref() {
        let sys = UnifiedTable::system();
        assert!(sys.is_locked());
        assert!(sys.is_system());
    }
}
