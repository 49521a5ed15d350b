use std::collections::HashMap;
use std::sync::Arc;

use crate::entry::{Sid, SymbolEntry, TableId};
use crate::error::Error;
use crate::system::SID_LITERAL_SIGIL;
use crate::value::Value;

/// Which of the three lifecycle roles a [`UnifiedTable`] currently plays.
///
/// Computed from `(locked, name, system_ref)` rather than stored separately,
/// so it can never drift out of sync with the fields that actually define it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// The fixed, process-wide version-1 table.
    System,
    /// A named, versioned, immutable table suitable for import.
    Shared,
    /// A mutable table combining a system table, imports, and local symbols.
    Local,
}

/// One entry of a local table's `imports` list: the shared table that was
/// imported, and the declared max id that was actually applied (which may
/// exceed the table's own `max_id`, per SPEC_FULL.md §3 "Import offsetting").
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub table: Arc<UnifiedTable>,
    pub declared_max_id: Sid,
}

/// The one concrete symbol table type, playing the system, shared, or local
/// role depending on lifecycle state. See SPEC_FULL.md §3 for the full data
/// model and its invariants.
#[derive(Debug)]
pub struct UnifiedTable {
    pub(crate) id: TableId,
    pub(crate) name: Option<String>,
    pub(crate) version: u32,
    pub(crate) system_ref: Option<Arc<UnifiedTable>>,
    pub(crate) imports: Vec<ImportRecord>,
    pub(crate) entries: Vec<Option<SymbolEntry>>,
    pub(crate) text_index: HashMap<Arc<str>, Sid>,
    pub(crate) max_id: Sid,
    pub(crate) has_local_symbols: bool,
    pub(crate) locked: bool,
    pub(crate) view: Option<Value>,
}

impl UnifiedTable {
    pub(crate) fn empty_system(id: TableId) -> Self {
        Self {
            id,
            name: None,
            version: 0,
            system_ref: None,
            imports: Vec::new(),
            entries: vec![None],
            text_index: HashMap::new(),
            max_id: 0,
            has_local_symbols: false,
            locked: false,
            view: None,
        }
    }

    pub(crate) fn empty_shared(id: TableId, name: String, version: u32) -> Self {
        Self {
            id,
            name: Some(name),
            version: version.max(1),
            system_ref: None,
            imports: Vec::new(),
            entries: vec![None],
            text_index: HashMap::new(),
            max_id: 0,
            has_local_symbols: false,
            locked: false,
            view: None,
        }
    }

    /// Synthesizes a shared table for an import clause the catalog could not
    /// resolve: same `(name, version)`, `max_id` set but every symbol unresolved.
    pub(crate) fn placeholder_shared(name: String, version: u32, max_id: Sid) -> Self {
        let mut table = Self::empty_shared(TableId::next(), name, version);
        table.entries.resize_with(max_id as usize + 1, || None);
        for sid in 1..=max_id {
            table.entries[sid as usize] = Some(SymbolEntry::new(sid, None, table.id));
        }
        table.max_id = max_id;
        table.locked = true;
        table
    }

    /// Constructs a new local table, importing `system` at offset 0 without
    /// copying its entries (lookups delegate to it instead; see `find_sid_by_text`).
    #[must_use]
    pub fn new_local(system: Arc<UnifiedTable>) -> Self {
        let max_id = system.max_id();
        Self {
            id: TableId::next(),
            name: None,
            version: 0,
            system_ref: Some(system),
            imports: Vec::new(),
            entries: vec![None; max_id as usize + 1],
            text_index: HashMap::new(),
            max_id,
            has_local_symbols: false,
            locked: false,
            view: None,
        }
    }

    // -- role / identity -----------------------------------------------

    #[must_use]
    pub fn role(&self) -> TableRole {
        if self.name.is_none() && self.system_ref.is_none() {
            TableRole::System
        } else if self.locked {
            TableRole::Shared
        } else {
            TableRole::Local
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self.role(), TableRole::System)
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self.role(), TableRole::Shared)
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self.role(), TableRole::Local)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn id(&self) -> TableId {
        self.id
    }

    // -- accessors -------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn max_id(&self) -> Sid {
        self.max_id
    }

    #[must_use]
    pub fn has_local_symbols(&self) -> bool {
        self.has_local_symbols
    }

    #[must_use]
    pub fn system_ref(&self) -> Option<&Arc<UnifiedTable>> {
        self.system_ref.as_ref()
    }

    #[must_use]
    pub fn imports(&self) -> &[ImportRecord] {
        &self.imports
    }

    pub(crate) fn set_max_id(&mut self, sid: Sid) {
        if sid > self.max_id {
            self.max_id = sid;
        }
    }

    fn ensure_len(&mut self, sid: Sid) {
        let needed = sid as usize + 1;
        if self.entries.len() < needed {
            self.entries.resize_with(needed, || None);
        }
    }

    /// Installs a symbol entry at `sid`, applying the first-writer-wins rule
    /// for `text_index` (entries are always installed in ascending sid order,
    /// so `or_insert` alone is sufficient to keep the lowest-sid mapping).
    pub(crate) fn install_raw(&mut self, sid: Sid, text: Option<Arc<str>>, source: TableId) {
        self.ensure_len(sid);
        if let Some(t) = &text {
            self.text_index.entry(t.clone()).or_insert(sid);
        }
        self.entries[sid as usize] = Some(SymbolEntry::new(sid, text, source));
    }

    fn require_unlocked(&self) -> Result<(), Error> {
        if self.locked {
            Err(Error::IllegalState("table is locked"))
        } else {
            Ok(())
        }
    }

    // -- lookups -----------------------------------------------------------

    /// Resolves `text` to a sid, probing the system table first, then this
    /// table's own symbols, then the sid-literal scheme (`$<digits>`).
    /// `Ok(None)` means "resolvable, but unknown" (the `UNKNOWN` sentinel).
    pub fn find_sid_by_text(&self, text: &str) -> Result<Option<Sid>, Error> {
        if text.is_empty() {
            return Err(Error::IllegalArgument("text must not be empty"));
        }
        if let Some(sys) = &self.system_ref {
            if let Some(&sid) = sys.text_index.get(text) {
                return Ok(Some(sid));
            }
        }
        if let Some(&sid) = self.text_index.get(text) {
            return Ok(Some(sid));
        }
        if let Some(rest) = text.strip_prefix(SID_LITERAL_SIGIL) {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return match rest.parse::<Sid>() {
                    Ok(sid) => Ok(Some(sid)),
                    Err(_) => Err(Error::InvalidSystemSymbol(text.to_string())),
                };
            }
            return Err(Error::InvalidSystemSymbol(text.to_string()));
        }
        Ok(None)
    }

    /// Resolves `sid` to known text, never synthesizing a sid-literal.
    pub fn find_known_text(&self, sid: Sid) -> Result<Option<String>, Error> {
        if sid < 1 {
            return Err(Error::IllegalArgument("sid must be >= 1"));
        }
        if let Some(sys) = &self.system_ref {
            if sid <= sys.max_id() {
                return Ok(sys.entries.get(sid as usize).and_then(|e| e.as_ref()).and_then(|e| e.text()).map(str::to_string));
            }
        }
        Ok(self
            .entries
            .get(sid as usize)
            .and_then(|e| e.as_ref())
            .and_then(|e| e.text())
            .map(str::to_string))
    }

    /// Resolves `sid` to text, synthesizing `"$<sid>"` if unknown.
    pub fn find_text(&self, sid: Sid) -> Result<String, Error> {
        Ok(self
            .find_known_text(sid)?
            .unwrap_or_else(|| format!("{SID_LITERAL_SIGIL}{sid}")))
    }

    /// Iterates over every `(sid, text)` pair `find_sid_by_text` can actually
    /// reach from this table, including its system range. This is
    /// `text_index`, not `entries`: a duplicate text imported at a higher sid
    /// than its first occurrence still has a present `SymbolEntry` (so
    /// `find_known_text`/`find_text` resolve it) but is not reachable via
    /// `find_sid_by_text`, and must not be yielded here or `is_compatible`
    /// stops being reflexive. Used by `is_compatible` and tests.
    pub(crate) fn iter_known_symbols(&self) -> impl Iterator<Item = (Sid, &str)> + '_ {
        let sys_iter = self
            .system_ref
            .iter()
            .flat_map(|sys| sys.text_index.iter().map(|(t, &sid)| (sid, t.as_ref())));
        let own_iter = self.text_index.iter().map(|(t, &sid)| (sid, t.as_ref()));
        sys_iter.chain(own_iter)
    }

    // -- mutation ------------------------------------------------------------

    /// Looks up `text`; if known (including via sid-literal synthesis),
    /// returns that sid without allocating. Otherwise allocates `max_id + 1`.
    pub fn add_symbol(&mut self, text: &str) -> Result<Sid, Error> {
        if text.is_empty() {
            return Err(Error::IllegalArgument("text must not be empty"));
        }
        if let Some(sid) = self.find_sid_by_text(text)? {
            return Ok(sid);
        }
        self.require_unlocked()?;
        let sid = self.max_id + 1;
        self.install_raw(sid, Some(Arc::from(text)), self.id);
        self.max_id = sid;
        self.has_local_symbols = true;
        self.mirror_define(sid);
        Ok(sid)
    }

    /// Binds `text` to `sid`. No-op if already bound that way; `IllegalArgument`
    /// if `text` is bound elsewhere; `SymbolRedefinition` if `sid` already
    /// holds different text.
    pub fn define_symbol(&mut self, text: &str, sid: Sid) -> Result<(), Error> {
        self.require_unlocked()?;
        if text.is_empty() {
            return Err(Error::IllegalArgument("text must not be empty"));
        }
        if sid < 1 {
            return Err(Error::IllegalArgument("sid must be >= 1"));
        }
        if let Some(&existing) = self.text_index.get(text) {
            return if existing == sid {
                Ok(())
            } else {
                Err(Error::IllegalArgument("text is already bound to a different sid"))
            };
        }
        self.ensure_len(sid);
        if let Some(Some(existing)) = self.entries.get(sid as usize) {
            return Err(Error::SymbolRedefinition {
                sid,
                existing: existing.text().unwrap_or_default().to_string(),
                attempted: text.to_string(),
            });
        }
        self.install_raw(sid, Some(Arc::from(text)), self.id);
        self.set_max_id(sid);
        self.has_local_symbols = true;
        self.mirror_define(sid);
        Ok(())
    }

    /// Installs a symbol collected while parsing a local table struct. Unlike
    /// `define_symbol`, the sid is not user-chosen: it was computed from list
    /// position or struct field id during parsing.
    pub(crate) fn define_local_symbol(&mut self, sid: Sid, text: Option<String>) -> Result<(), Error> {
        self.ensure_len(sid);
        let text: Option<Arc<str>> = text.filter(|t| !t.is_empty()).map(|t| Arc::from(t.as_str()));
        if let Some(Some(existing)) = self.entries.get(sid as usize) {
            if existing.text() != text.as_deref() {
                return Err(Error::SymbolRedefinition {
                    sid,
                    existing: existing.text().unwrap_or_default().to_string(),
                    attempted: text.as_deref().unwrap_or_default().to_string(),
                });
            }
        }
        self.install_raw(sid, text, self.id);
        self.set_max_id(sid);
        self.has_local_symbols = true;
        self.mirror_define(sid);
        Ok(())
    }

    /// Clears the binding for `text` (and, if supplied, verifies `sid`
    /// matches the current binding first). System-range sids cannot be
    /// removed. No binding for `text` is a no-op.
    pub fn remove_symbol(&mut self, text: &str, sid: Option<Sid>) -> Result<(), Error> {
        self.require_unlocked()?;
        let bound = self.text_index.get(text).copied();
        let target = match (sid, bound) {
            (Some(requested), Some(actual)) if requested == actual => actual,
            (Some(_), _) => return Err(Error::IllegalArgument("sid does not match current binding")),
            (None, Some(actual)) => actual,
            (None, None) => return Ok(()),
        };
        if let Some(sys) = &self.system_ref {
            if target <= sys.max_id() {
                return Err(Error::IllegalArgument("cannot remove a system symbol"));
            }
        }
        self.entries[target as usize] = None;
        self.text_index.remove(text);
        self.mirror_remove(target);
        Ok(())
    }

    /// Imports `shared` at the current `max_id` offset, reserving
    /// `declared_max_id` (or `shared.max_id()` if `None`/negative) worth of
    /// sid space regardless of how many symbols actually resolve.
    pub fn import(&mut self, shared: Arc<UnifiedTable>, declared_max_id: Option<i64>) -> Result<(), Error> {
        if self.locked {
            return Err(Error::IllegalState("table is locked"));
        }
        if self.has_local_symbols {
            return Err(Error::IllegalState("cannot import after local symbols exist"));
        }
        if self.system_ref.is_none() {
            return Err(Error::IllegalState("system reference must be set before importing"));
        }
        if !shared.locked || shared.name.is_none() || shared.is_system() {
            return Err(Error::IllegalArgument("import target must be a locked, named, non-system table"));
        }

        let declared = match declared_max_id {
            Some(v) if v >= 0 => v as Sid,
            _ => shared.max_id(),
        };
        let prior_max = self.max_id;
        self.ensure_len(prior_max + declared);

        let ingest_upper = declared.min(shared.max_id());
        for i in 1..=ingest_upper {
            if let Some(Some(entry)) = shared.entries.get(i as usize) {
                let new_sid = prior_max + i;
                self.install_raw(new_sid, entry.text_arc(), entry.source());
            }
        }
        self.max_id = prior_max + declared;
        self.mirror_imports_changed();
        self.imports.push(ImportRecord {
            table: shared,
            declared_max_id: declared,
        });
        Ok(())
    }

    /// Consumes this local table, producing a new shared table containing
    /// only the symbols this table itself declared, renumbered from 1.
    pub fn promote_to_shared(self, name: &str, version: u32) -> Result<UnifiedTable, Error> {
        if self.locked {
            return Err(Error::IllegalState("table is locked"));
        }
        if name.is_empty() {
            return Err(Error::IllegalArgument("name must not be empty"));
        }
        if version < 1 {
            return Err(Error::IllegalArgument("version must be >= 1"));
        }

        let own_id = self.id;
        let mut kept: Vec<Option<Arc<str>>> = Vec::new();
        for slot in self.entries.iter().skip(1) {
            if let Some(entry) = slot {
                if entry.source() == own_id {
                    kept.push(entry.text_arc());
                }
            }
        }

        let new_id = TableId::next();
        let mut shared = UnifiedTable::empty_shared(new_id, name.to_string(), version.max(1));
        for (i, text) in kept.into_iter().enumerate() {
            let sid = (i + 1) as Sid;
            shared.install_raw(sid, text, new_id);
            shared.max_id = sid;
        }
        shared.locked = true;
        Ok(shared)
    }

    // -- structural-view mirroring (full construction lives in `view.rs`) ---

    pub(crate) fn mirror_define(&mut self, sid: Sid) {
        let Some(view) = self.view.as_mut() else { return };
        let Some(root) = view.as_struct_mut() else { return };
        let Some(symbols) = root.get_mut("symbols").and_then(Value::as_struct_mut) else {
            return;
        };
        let key = format!("{SID_LITERAL_SIGIL}{sid}");
        let text = self
            .entries
            .get(sid as usize)
            .and_then(|e| e.as_ref())
            .and_then(|e| e.text())
            .unwrap_or("")
            .to_string();
        symbols.put(key, Value::new_string(text));
    }

    pub(crate) fn mirror_remove(&mut self, sid: Sid) {
        let Some(view) = self.view.as_mut() else { return };
        let Some(root) = view.as_struct_mut() else { return };
        let Some(symbols) = root.get_mut("symbols").and_then(Value::as_struct_mut) else {
            return;
        };
        symbols.remove_all(&format!("{SID_LITERAL_SIGIL}{sid}"));
    }

    pub(crate) fn mirror_imports_changed(&mut self) {
        // Imports may only be added before any local symbol exists and before
        // the view is ever requested in practice, but if a caller builds the
        // view early we still must not serve a stale imports list.
        self.view = None;
    }
}
