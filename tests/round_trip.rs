mod support;

use std::sync::Arc;

use symtab_core::{parse_local, parse_shared, Catalog, UnifiedTable};

use support::ValueCursor;

struct OneTableCatalog {
    table: Arc<UnifiedTable>,
}

impl Catalog for OneTableCatalog {
    fn get_table(&self, name: &str, _version: u32) -> Option<Arc<UnifiedTable>> {
        if self.table.name() == Some(name) {
            Some(self.table.clone())
        } else {
            None
        }
    }
}

#[test]
fn shared_table_survives_a_view_and_reparse_round_trip() {
    let mut local = UnifiedTable::new_local(UnifiedTable::system());
    local.add_symbol("alpha").unwrap();
    local.add_symbol("beta").unwrap();
    local.add_symbol("gamma").unwrap();
    let mut shared = local.promote_to_shared("greek", 3).unwrap();

    let view = shared.structural_view().clone();
    let mut cursor = ValueCursor::into_struct(&view);

    let reparsed = parse_shared(&mut cursor).unwrap();

    assert_eq!(reparsed.name(), Some("greek"));
    assert_eq!(reparsed.version(), 3);
    assert_eq!(reparsed.max_id(), shared.max_id());
    for sid in 1..=shared.max_id() {
        assert_eq!(reparsed.find_known_text(sid).unwrap(), shared.find_known_text(sid).unwrap());
    }
}

#[test]
fn promote_to_shared_drops_imported_entries_keeps_only_declared_ones() {
    let base = {
        let mut l = UnifiedTable::new_local(UnifiedTable::system());
        l.add_symbol("only").unwrap();
        l.promote_to_shared("base", 1).unwrap()
    };
    let mut local = UnifiedTable::new_local(UnifiedTable::system());
    local.import(std::sync::Arc::new(base), None).unwrap();
    local.add_symbol("mine").unwrap();

    let promoted = local.promote_to_shared("derived", 1).unwrap();
    assert_eq!(promoted.max_id(), 1);
    assert_eq!(promoted.find_sid_by_text("mine").unwrap(), Some(1));
    assert_eq!(promoted.find_sid_by_text("only").unwrap(), None);
}

#[test]
fn empty_shared_table_round_trips_to_an_empty_symbols_struct() {
    let mut empty = UnifiedTable::new_local(UnifiedTable::system())
        .promote_to_shared("empty", 1)
        .unwrap();
    let view = empty.structural_view().clone();
    let root = view.as_struct().unwrap();
    let symbols = root.get("symbols").unwrap().as_struct().unwrap();
    assert!(symbols.is_empty());

    let mut cursor = ValueCursor::into_struct(&view);
    let reparsed = parse_shared(&mut cursor).unwrap();
    assert_eq!(reparsed.max_id(), 0);
}

#[test]
fn local_table_with_imports_survives_a_view_and_reparse_round_trip() {
    let shared = Arc::new({
        let mut base = UnifiedTable::new_local(UnifiedTable::system());
        base.add_symbol("alpha").unwrap();
        base.add_symbol("beta").unwrap();
        base.promote_to_shared("greek", 1).unwrap()
    });
    let catalog = OneTableCatalog { table: shared.clone() };

    let mut local = UnifiedTable::new_local(UnifiedTable::system());
    local.import(shared, Some(5)).unwrap();
    local.add_symbol("mine").unwrap();
    local.add_symbol("yours").unwrap();

    let view = local.structural_view().clone();
    let mut cursor = ValueCursor::into_struct(&view);
    let reparsed = parse_local(&mut cursor, UnifiedTable::system(), &catalog).unwrap();

    assert_eq!(reparsed.max_id(), local.max_id());
    assert_eq!(reparsed.imports().len(), local.imports().len());
    assert_eq!(
        reparsed.imports()[0].declared_max_id,
        local.imports()[0].declared_max_id
    );
    assert_eq!(
        reparsed.imports()[0].table.name(),
        local.imports()[0].table.name()
    );
    assert_eq!(
        reparsed.find_sid_by_text("mine").unwrap(),
        local.find_sid_by_text("mine").unwrap()
    );
    assert_eq!(
        reparsed.find_sid_by_text("yours").unwrap(),
        local.find_sid_by_text("yours").unwrap()
    );
    assert_eq!(
        reparsed.find_sid_by_text("alpha").unwrap(),
        local.find_sid_by_text("alpha").unwrap()
    );
}
