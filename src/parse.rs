//! Reader binding: materializes a [`UnifiedTable`] by consuming a
//! [`StructReader`] positioned at the opening of a table struct
//! (SPEC_FULL.md §4.5).

use std::sync::Arc;

use num_enum::TryFromPrimitive;

use crate::catalog::Catalog;
use crate::entry::Sid;
use crate::error::Error;
use crate::reader::{StructReader, TypeTag};
use crate::system::SYSTEM_SYMBOL_TABLE_NAME;
use crate::table::UnifiedTable;

/// The Format's reserved field ids inside a symbol table struct (and, reused,
/// inside each import-clause struct).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub(crate) enum FieldId {
    Name = 4,
    Version = 5,
    Imports = 6,
    Symbols = 7,
    MaxId = 8,
}

#[derive(Debug, Default)]
struct RawImport {
    name: Option<String>,
    version: Option<i64>,
    max_id: Option<i64>,
}

#[derive(Debug)]
enum RawSymbols {
    List(Vec<Option<String>>),
    Struct(Vec<(u32, Option<String>)>),
    None,
}

#[derive(Debug, Default)]
struct RawTable {
    name: Option<String>,
    version: Option<i64>,
    imports: Option<Vec<RawImport>>,
    symbols: Option<RawSymbols>,
}

fn non_empty_string<R: StructReader>(reader: &R) -> Option<String> {
    if reader.is_null_value() {
        return None;
    }
    let s = reader.string_value();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn scan_import_clause<R: StructReader>(reader: &mut R) -> RawImport {
    reader.step_in();
    let mut raw = RawImport::default();
    while reader.has_next() {
        let ty = reader.next();
        let field = FieldId::try_from(reader.field_id().max(-1) as u32).ok();
        match (field, ty) {
            (Some(FieldId::Name), TypeTag::String) => raw.name = non_empty_string(reader),
            (Some(FieldId::Version), TypeTag::Int) if !reader.is_null_value() => {
                raw.version = Some(reader.int_value());
            }
            (Some(FieldId::MaxId), TypeTag::Int) if !reader.is_null_value() => {
                raw.max_id = Some(reader.int_value());
            }
            _ => {}
        }
    }
    reader.step_out();
    raw
}

fn scan_imports<R: StructReader>(reader: &mut R) -> Vec<RawImport> {
    reader.step_in();
    let mut out = Vec::new();
    while reader.has_next() {
        let ty = reader.next();
        if ty == TypeTag::Struct && !reader.is_null_value() {
            out.push(scan_import_clause(reader));
        }
    }
    reader.step_out();
    out
}

fn scan_symbols<R: StructReader>(reader: &mut R, ty: TypeTag) -> RawSymbols {
    match ty {
        TypeTag::List => {
            reader.step_in();
            let mut out = Vec::new();
            while reader.has_next() {
                let ety = reader.next();
                if ety == TypeTag::String {
                    out.push(non_empty_string(reader));
                } else {
                    out.push(None);
                }
            }
            reader.step_out();
            RawSymbols::List(out)
        }
        TypeTag::Struct => {
            reader.step_in();
            let mut out = Vec::new();
            while reader.has_next() {
                let ety = reader.next();
                let fid = reader.field_id();
                if fid >= 0 {
                    let text = if ety == TypeTag::String { non_empty_string(reader) } else { None };
                    out.push((fid as u32, text));
                }
            }
            reader.step_out();
            RawSymbols::Struct(out)
        }
        _ => RawSymbols::None,
    }
}

fn scan_fields<R: StructReader>(reader: &mut R) -> RawTable {
    let mut raw = RawTable::default();
    while reader.has_next() {
        let ty = reader.next();
        let field = FieldId::try_from(reader.field_id().max(-1) as u32).ok();
        match (field, ty) {
            (Some(FieldId::Name), TypeTag::String) => {
                raw.name = non_empty_string(reader);
            }
            (Some(FieldId::Version), TypeTag::Int) if !reader.is_null_value() => {
                raw.version = Some(reader.int_value());
            }
            (Some(FieldId::Imports), TypeTag::List) => {
                raw.imports = Some(scan_imports(reader));
            }
            (Some(FieldId::Symbols), ty) => {
                raw.symbols = Some(scan_symbols(reader, ty));
            }
            _ => {} // open content: unknown field id, ignored
        }
    }
    raw
}

fn materialize_symbol_candidates(symbols: RawSymbols, prior_max: Sid) -> Vec<(Sid, Option<String>)> {
    match symbols {
        RawSymbols::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, text)| (prior_max + i as Sid + 1, text))
            .collect(),
        RawSymbols::Struct(fields) => fields.into_iter().map(|(fid, text)| (fid, text)).collect(),
        RawSymbols::None => Vec::new(),
    }
}

/// Resolves one `imports` clause against the catalog, per SPEC_FULL.md §4.5.
fn resolve_import(raw: RawImport, catalog: &dyn Catalog) -> Result<Option<(Arc<UnifiedTable>, Option<i64>)>, Error> {
    let name = match raw.name.as_deref() {
        Some(n) if !n.is_empty() && n != SYSTEM_SYMBOL_TABLE_NAME => n,
        _ => return Ok(None),
    };
    let version = raw.version.filter(|v| *v >= 1).unwrap_or(1) as u32;

    match catalog.get_table(name, version) {
        Some(found) if found.version() == version => Ok(Some((found, raw.max_id))),
        Some(found) => {
            let max_id = raw
                .max_id
                .ok_or(Error::MalformedImport("import version mismatch requires an explicit max_id"))?;
            Ok(Some((found, Some(max_id))))
        }
        None => {
            let max_id = raw
                .max_id
                .ok_or(Error::MalformedImport("unresolved import requires an explicit max_id"))?;
            let placeholder = UnifiedTable::placeholder_shared(name.to_string(), version, max_id.max(0) as Sid);
            Ok(Some((Arc::new(placeholder), Some(max_id))))
        }
    }
}

/// Parses a local symbol table struct: the reader must be positioned inside
/// the struct (after `step_in`). `system` is imported at offset 0.
pub fn parse_local<R: StructReader>(
    reader: &mut R,
    system: Arc<UnifiedTable>,
    catalog: &dyn Catalog,
) -> Result<UnifiedTable, Error> {
    let raw = scan_fields(reader);
    let mut table = UnifiedTable::new_local(system);

    if let Some(raw_imports) = raw.imports {
        for raw_import in raw_imports {
            if let Some((shared, declared_max_id)) = resolve_import(raw_import, catalog)? {
                table.import(shared, declared_max_id)?;
            }
        }
    }

    if let Some(raw_symbols) = raw.symbols {
        let first_local_sid = table.max_id() + 1;
        for (sid, text) in materialize_symbol_candidates(raw_symbols, table.max_id()) {
            if sid < first_local_sid {
                continue; // collides with reserved import/system space
            }
            table.define_local_symbol(sid, text)?;
        }
    }

    Ok(table)
}

/// Parses a shared symbol table struct: the reader must be positioned inside
/// the struct (after `step_in`).
pub fn parse_shared<R: StructReader>(reader: &mut R) -> Result<UnifiedTable, Error> {
    let raw = scan_fields(reader);
    let name = raw
        .name
        .filter(|n| !n.is_empty())
        .ok_or(Error::MalformedTable("shared table requires a non-empty name"))?;
    let version = raw.version.filter(|v| *v >= 1).unwrap_or(1) as u32;

    let id = crate::entry::TableId::next();
    let mut table = UnifiedTable::empty_shared(id, name, version);
    if let Some(raw_symbols) = raw.symbols {
        for (sid, text) in materialize_symbol_candidates(raw_symbols, 0) {
            table.install_raw(sid, text.filter(|t| !t.is_empty()).map(|t| Arc::from(t.as_str())), id);
            table.set_max_id(sid);
        }
    }
    table.lock();
    Ok(table)
}
