//! Node identifiers using string interning
//!
//! Graph and tree nodes are referenced by user supplied identifiers which may
//! be numbers or strings in the input. Both forms are normalized to their
//! text and interned into a copyable [`Id`], so endpoint lookups during layout
//! are cheap hash-map hits.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::value::Value;

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned node identifier
///
/// # Examples
///
/// ```
/// use structviz_core::{identifier::Id, value::Value};
///
/// let by_name = Id::new("7");
/// let by_number = Id::from_value(&Value::from(7)).unwrap();
/// assert_eq!(by_name, by_number);
/// assert_eq!(by_number, "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual form.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates an `Id` from a scalar identifier value.
    ///
    /// Numbers and strings are accepted; numbers use their canonical text so
    /// that `1` and `"1"` name the same node. Returns `None` for any other
    /// variant.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s)),
            Value::Number(_) => Some(Self::new(&value.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_interner(|interner| {
            let str_value = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            f.write_str(str_value)
        })
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .is_some_and(|self_str| self_str == other)
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
