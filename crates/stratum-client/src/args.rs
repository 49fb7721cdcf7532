//! Call arguments.
//!
//! A logical method call carries an ordered sequence of positional
//! arguments, optionally followed by a bundle of named arguments. Each
//! argument is either a single value or a collection; the distinction
//! drives which operation variant the call resolves to.

use stratum_types::{Timestamp, Value};

/// One argument to a logical method.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A single value.
    One(Value),
    /// A collection of values.
    Many(Vec<Value>),
    /// A named-argument bundle. Only valid as the trailing positional
    /// argument; the resolver extracts it before binding.
    Bundle(NamedArgs),
}

impl From<Value> for Argument {
    fn from(v: Value) -> Self {
        Argument::One(v)
    }
}

impl From<bool> for Argument {
    fn from(v: bool) -> Self {
        Argument::One(v.into())
    }
}

impl From<i64> for Argument {
    fn from(v: i64) -> Self {
        Argument::One(v.into())
    }
}

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::One(v.into())
    }
}

impl From<f64> for Argument {
    fn from(v: f64) -> Self {
        Argument::One(v.into())
    }
}

impl From<&str> for Argument {
    fn from(v: &str) -> Self {
        Argument::One(v.into())
    }
}

impl From<String> for Argument {
    fn from(v: String) -> Self {
        Argument::One(v.into())
    }
}

impl From<Timestamp> for Argument {
    fn from(v: Timestamp) -> Self {
        Argument::One(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Argument {
    fn from(items: Vec<T>) -> Self {
        Argument::Many(items.into_iter().map(Into::into).collect())
    }
}

impl From<NamedArgs> for Argument {
    fn from(bundle: NamedArgs) -> Self {
        Argument::Bundle(bundle)
    }
}

/// A bundle of named arguments, keyed by spelling.
///
/// Spellings are resolved to parameter roles through the alias table.
/// Insertion order is preserved; inserting a spelling twice replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedArgs {
    entries: Vec<(String, Argument)>,
}

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a named argument, replacing any existing value under the
    /// same spelling.
    pub fn insert(&mut self, spelling: impl Into<String>, arg: impl Into<Argument>) {
        let spelling = spelling.into();
        let arg = arg.into();
        if let Some(entry) = self.entries.iter_mut().find(|(s, _)| *s == spelling) {
            entry.1 = arg;
        } else {
            self.entries.push((spelling, arg));
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn set(mut self, spelling: impl Into<String>, arg: impl Into<Argument>) -> Self {
        self.insert(spelling, arg);
        self
    }

    /// Looks up a spelling.
    pub fn get(&self, spelling: &str) -> Option<&Argument> {
        self.entries
            .iter()
            .find(|(s, _)| s == spelling)
            .map(|(_, arg)| arg)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds another bundle into this one; the other bundle's values win
    /// on shared spellings.
    pub(crate) fn merge(&mut self, other: NamedArgs) {
        for (spelling, arg) in other.entries {
            self.insert(spelling, arg);
        }
    }
}

/// The complete argument list for one logical method call.
///
/// ```ignore
/// use stratum_client::CallArgs;
///
/// // get("name", 42)
/// let args = CallArgs::new().with("name").with(42);
///
/// // get(keys: ["name", "age"], records: [42, 43])
/// let args = CallArgs::new()
///     .named("keys", vec!["name", "age"])
///     .named("records", vec![42, 43]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Argument>,
    named: NamedArgs,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with(mut self, arg: impl Into<Argument>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Adds a named argument under any registered alias spelling.
    #[must_use]
    pub fn named(mut self, spelling: impl Into<String>, arg: impl Into<Argument>) -> Self {
        self.named.insert(spelling, arg);
        self
    }

    pub(crate) fn into_parts(self) -> (Vec<Argument>, NamedArgs) {
        (self.positional, self.named)
    }
}

impl From<()> for CallArgs {
    fn from((): ()) -> Self {
        CallArgs::new()
    }
}

impl From<NamedArgs> for CallArgs {
    fn from(named: NamedArgs) -> Self {
        CallArgs { positional: Vec::new(), named }
    }
}
