use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Swift access level of a declaration
///
/// Parsed from modifier lists or from macro arguments, where it may be
/// written either as `public` or as `.public`:
/// - `AccessLevel::Open` → "open"
/// - `AccessLevel::Public` → "public"
/// - `AccessLevel::Package` → "package"
/// - `AccessLevel::Internal` → "internal" (the default)
/// - `AccessLevel::FilePrivate` → "fileprivate"
/// - `AccessLevel::Private` → "private"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLevel {
    Private,
    FilePrivate,
    #[default]
    Internal,
    Package,
    Public,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not an access level")]
pub struct ParseAccessLevelError(pub String);

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Open => "open",
            AccessLevel::Public => "public",
            AccessLevel::Package => "package",
            AccessLevel::Internal => "internal",
            AccessLevel::FilePrivate => "fileprivate",
            AccessLevel::Private => "private",
        }
    }

    /// The access modifier among `modifiers`, ignoring setter-only forms
    /// such as `private(set)`
    pub fn from_modifiers<S: AsRef<str>>(modifiers: &[S]) -> Self {
        modifiers
            .iter()
            .find_map(|modifier| modifier.as_ref().parse().ok())
            .unwrap_or_default()
    }

    /// Prefix to write before a generated protocol or nested type.
    ///
    /// `internal` is implicit, and only classes may be `open`, so `open`
    /// subjects produce `public` declarations.
    pub fn declaration_prefix(&self) -> &'static str {
        match self {
            AccessLevel::Internal => "",
            AccessLevel::Open | AccessLevel::Public => "public ",
            AccessLevel::Package => "package ",
            AccessLevel::FilePrivate => "fileprivate ",
            AccessLevel::Private => "private ",
        }
    }

    /// Prefix for members of a generated type. Members of private types
    /// stay implicit so they remain usable inside the enclosing scope.
    pub fn member_prefix(&self) -> &'static str {
        match self {
            AccessLevel::Private | AccessLevel::FilePrivate => "",
            other => other.declaration_prefix(),
        }
    }
}

impl FromStr for AccessLevel {
    type Err = ParseAccessLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix('.').unwrap_or(name);
        Ok(match name {
            "open" => AccessLevel::Open,
            "public" => AccessLevel::Public,
            "package" => AccessLevel::Package,
            "internal" => AccessLevel::Internal,
            "fileprivate" => AccessLevel::FilePrivate,
            "private" => AccessLevel::Private,
            _ => return Err(ParseAccessLevelError(s.to_string())),
        })
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
