use std::{error, fmt};

use crate::entry::Sid;

/// Failure modes raised while building, mutating, or querying a [`crate::table::UnifiedTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller passed empty text, a non-positive sid, or an inconsistent
    /// `(text, sid)` pair to a lookup or mutator.
    IllegalArgument(&'static str),
    /// A mutation was attempted on a locked table, an import was attempted
    /// after local symbols already exist, or before a system reference was set.
    IllegalState(&'static str),
    /// A sid slot already holds a different text than the one being bound.
    SymbolRedefinition {
        sid: Sid,
        existing: String,
        attempted: String,
    },
    /// A lookup text matched the sigil-prefix pattern but was not a
    /// well-formed sid-literal (`\$\d+`).
    InvalidSystemSymbol(String),
    /// A parsed shared table lacked a non-empty `name`.
    MalformedTable(&'static str),
    /// A parsed import clause lacked `max_id` and was not exactly matched
    /// by the catalog.
    MalformedImport(&'static str),
    /// A caller looked up text for a sid whose text is absent.
    UnknownSymbol(Sid),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalArgument(msg) => write!(f, "illegal argument: {msg}"),
            Self::IllegalState(msg) => write!(f, "illegal state: {msg}"),
            Self::SymbolRedefinition {
                sid,
                existing,
                attempted,
            } => write!(
                f,
                "symbol redefinition at sid {sid}: existing text {existing:?}, attempted {attempted:?}"
            ),
            Self::InvalidSystemSymbol(text) => {
                write!(f, "invalid system symbol: {text:?} is not a well-formed sid-literal")
            }
            Self::MalformedTable(msg) => write!(f, "malformed table: {msg}"),
            Self::MalformedImport(msg) => write!(f, "malformed import: {msg}"),
            Self::UnknownSymbol(sid) => write!(f, "unknown symbol text for sid {sid}"),
        }
    }
}

impl error::Error for Error {}
