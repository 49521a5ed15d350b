use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A symbol id: a positive integer identifying a symbol within a table's id space.
///
/// Index 0 of a table's entry vector is never used; valid sids start at 1.
pub type Sid = u32;

/// Opaque, non-owning identity for a [`crate::table::UnifiedTable`].
///
/// `SymbolEntry::source` carries one of these rather than a live reference so
/// that entries can never keep their originating table alive and so that
/// `UnifiedTable -> SymbolEntry -> source` can never form an ownership cycle.
/// Two tables never share an id; comparing ids is the entire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(u64);

impl TableId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Width, in bytes, of `value` encoded as the Format's variable-length
/// unsigned integer (7 data bits per byte, continuation in the high bit).
fn varuint_len(value: u64) -> u8 {
    let mut len = 1u8;
    let mut rest = value >> 7;
    while rest > 0 {
        len += 1;
        rest >>= 7;
    }
    len
}

/// Width, in bytes, of a type-descriptor-plus-length-prefix header for a
/// payload of `payload_len` bytes: one byte when the length fits in the
/// low nibble (< 14), else one byte plus a trailing VarUInt length.
fn header_len(payload_len: u32) -> u8 {
    if payload_len < 14 {
        1
    } else {
        1 + varuint_len(u64::from(payload_len))
    }
}

/// An immutable `(sid, text, owning-table)` triple.
///
/// Absent `text` signals a symbol imported from a shared table that the
/// catalog could not resolve. `source` identifies the table that originally
/// declared this entry (which, after an import copies it forward, may differ
/// from the table the entry currently lives inside).
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    sid: Sid,
    text: Option<Arc<str>>,
    source: TableId,
    utf8_len_hint: u32,
    sid_varuint_len_hint: u8,
    header_len_hint: u8,
}

impl SymbolEntry {
    pub(crate) fn new(sid: Sid, text: Option<Arc<str>>, source: TableId) -> Self {
        let utf8_len_hint = text.as_deref().map_or(0, |s| s.len() as u32);
        let sid_varuint_len_hint = varuint_len(u64::from(sid));
        let header_len_hint = header_len(utf8_len_hint);
        Self {
            sid,
            text,
            source,
            utf8_len_hint,
            sid_varuint_len_hint,
            header_len_hint,
        }
    }

    #[must_use]
    pub fn sid(&self) -> Sid {
        self.sid
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn text_arc(&self) -> Option<Arc<str>> {
        self.text.clone()
    }

    pub(crate) fn source(&self) -> TableId {
        self.source
    }

    /// UTF-8 byte length of the text, or 0 if unresolved.
    #[must_use]
    pub fn utf8_len_hint(&self) -> u32 {
        self.utf8_len_hint
    }

    /// Byte width of `sid` as a Format VarUInt.
    #[must_use]
    pub fn sid_varuint_len_hint(&self) -> u8 {
        self.sid_varuint_len_hint
    }

    /// Byte width of the combined type-descriptor/length-prefix header
    /// needed to encode the text.
    #[must_use]
    pub fn header_len_hint(&self) -> u8 {
        self.header_len_hint
    }
}

impl PartialEq for SymbolEntry {
    fn eq(&self, other: &Self) -> bool {
        self.sid == other.sid && self.text == other.text
    }
}

impl Eq for SymbolEntry {}
