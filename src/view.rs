//! Writer binding: builds the cached structural [`Value`] tree for a table
//! (SPEC_FULL.md §4.6). Incremental updates after the first build live in
//! `table.rs` (`mirror_define`/`mirror_remove`), since they're driven
//! directly by the mutators that already hold `&mut self`.

use crate::system::{SYMBOL_TABLE_ANNOTATION_TEXT, SID_LITERAL_SIGIL};
use crate::table::{TableRole, UnifiedTable};
use crate::value::{StructValue, Value};

impl UnifiedTable {
    /// Returns the cached structural view, building it on first call.
    pub fn structural_view(&mut self) -> &Value {
        if self.view.is_none() {
            self.view = Some(self.build_view());
        }
        self.view.as_ref().expect("just built")
    }

    /// Discards the cached view, forcing the next `structural_view` call to
    /// rebuild it from scratch. Not needed in normal operation (mutators
    /// mirror incrementally) but useful after bulk changes made outside the
    /// usual mutators, or in tests.
    pub fn invalidate_structural_view(&mut self) {
        self.view = None;
    }

    fn build_view(&self) -> Value {
        let mut root = StructValue::new();
        root.add_type_annotation(SYMBOL_TABLE_ANNOTATION_TEXT);

        match self.role() {
            TableRole::Shared => {
                root.add("name", Value::new_string(self.name.clone().unwrap_or_default()));
                root.add("version", Value::new_int(i64::from(self.version)));
            }
            TableRole::Local => {
                if !self.imports.is_empty() {
                    let list = self
                        .imports
                        .iter()
                        .map(|import| {
                            let mut clause = StructValue::new();
                            clause.add("name", Value::new_string(import.table.name().unwrap_or_default().to_string()));
                            clause.add("version", Value::new_int(i64::from(import.table.version())));
                            clause.add("max_id", Value::new_int(i64::from(import.declared_max_id)));
                            Value::Struct(clause)
                        })
                        .collect();
                    root.add("imports", Value::List(list));
                }
            }
            TableRole::System => {}
        }

        let mut symbols = StructValue::new();
        for (sid, slot) in self.entries.iter().enumerate() {
            if sid == 0 {
                continue;
            }
            if let Some(entry) = slot {
                if entry.source() == self.id {
                    let text = entry.text().unwrap_or("").to_string();
                    symbols.add(format!("{SID_LITERAL_SIGIL}{sid}"), Value::new_string(text));
                }
            }
        }
        root.add("symbols", Value::Struct(symbols));

        Value::Struct(root)
    }
}
