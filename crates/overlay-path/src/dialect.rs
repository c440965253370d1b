use std::fmt;

/// Selector grammar selected by an overlay's compatibility flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Lenient grammar accepted by earlier overlay tooling.
    #[default]
    Legacy,
    /// RFC 9535 JSONPath.
    Rfc9535,
}

impl Dialect {
    /// Flag value that selects [`Dialect::Rfc9535`].
    pub const RFC9535_FLAG: &'static str = "rfc9535";

    /// Dialect for a compatibility flag value. Anything other than
    /// `rfc9535` (including no flag at all) selects the legacy grammar.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(Self::RFC9535_FLAG) => Self::Rfc9535,
            _ => Self::Legacy,
        }
    }

    pub fn is_rfc9535(self) -> bool {
        self == Self::Rfc9535
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Rfc9535 => f.write_str("rfc9535"),
        }
    }
}
