use inlinable_string::InlinableString;
use std::fmt;

/// An uncapitalized identifier, such as a field name or a type variable.
/// Type and module names are interned as `Symbol`s instead; the solver only
/// ever deals with lowercase names directly (field labels and the names of
/// quantified type variables).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lowercase(InlinableString);

impl Lowercase {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'a> From<&'a str> for Lowercase {
    fn from(string: &'a str) -> Self {
        Self(string.into())
    }
}

impl From<String> for Lowercase {
    fn from(string: String) -> Self {
        Self(string.into())
    }
}

impl From<Lowercase> for InlinableString {
    fn from(lowercase: Lowercase) -> Self {
        lowercase.0
    }
}

// Field names show up constantly in solver dumps, so debug-print them
// quoted but without a `Lowercase(...)` wrapper around every one.
impl fmt::Debug for Lowercase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

impl fmt::Display for Lowercase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
