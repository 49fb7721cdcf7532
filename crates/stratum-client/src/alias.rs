//! Named-argument alias resolution.
//!
//! Callers may spell a named argument several ways ("record" or "records",
//! "timestamp" or "ts"). Each logical parameter role registers its accepted
//! spellings here, most specific first. Lookup precedence is first match in
//! declaration order; exactly one lookup is performed per role per call.

use crate::args::{Argument, NamedArgs};

/// A logical parameter role a remote operation may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Field name(s).
    Key,
    /// Value(s) to write.
    Value,
    /// Record identifier(s).
    Record,
    /// A selection criteria expression.
    Criteria,
    /// A historical read instant.
    Timestamp,
    /// Start of an audit range.
    Start,
    /// End of an audit range.
    End,
    /// A time phrase forwarded to the server verbatim.
    Phrase,
}

impl Role {
    /// The role's canonical name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Role::Key => "key",
            Role::Value => "value",
            Role::Record => "record",
            Role::Criteria => "criteria",
            Role::Timestamp => "timestamp",
            Role::Start => "start",
            Role::End => "end",
            Role::Phrase => "phrase",
        }
    }
}

/// Accepted spellings per role; declaration order is lookup precedence.
const ALIASES: &[(Role, &[&str])] = &[
    (Role::Key, &["key", "keys"]),
    (Role::Value, &["value", "values"]),
    (Role::Record, &["record", "records"]),
    (Role::Criteria, &["criteria", "ccl", "where", "query"]),
    (Role::Timestamp, &["timestamp", "time", "ts"]),
    (Role::Start, &["start", "since"]),
    (Role::End, &["end", "until"]),
    (Role::Phrase, &["phrase"]),
];

/// Returns the spellings registered for `role`, in precedence order.
pub fn spellings(role: Role) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, spellings)| *spellings)
        .unwrap_or(&[])
}

/// Resolves `role` against a named-argument bundle.
///
/// Returns the value under the first registered spelling the bundle
/// defines, or `None` when no spelling matches. Unknown spellings in the
/// bundle are never an error here.
pub fn resolve<'a>(bundle: &'a NamedArgs, role: Role) -> Option<&'a Argument> {
    spellings(role).iter().find_map(|s| bundle.get(s))
}
