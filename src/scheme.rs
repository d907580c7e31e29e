//! URI scheme type.

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_SIP_PORT, DEFAULT_SIP_TRANSPORT, DEFAULT_SIPS_PORT, DEFAULT_SIPS_TRANSPORT,
};
use crate::error::ValidationError;

/// The scheme of a SIP URI.
///
/// # Examples
///
/// ```
/// use sip_uri::Scheme;
///
/// let scheme = Scheme::parse("SIPS").unwrap();
/// assert_eq!(scheme, Scheme::Sips);
/// assert_eq!(scheme.default_port(), 5061);
/// assert_eq!(scheme.default_transport(), "tcp");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    /// Plain `sip:`
    Sip,
    /// Secure `sips:`
    Sips,
}

impl Scheme {
    /// Parses a scheme name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidScheme`] for anything other than
    /// `sip` or `sips`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.eq_ignore_ascii_case("sip") {
            Ok(Self::Sip)
        } else if input.eq_ignore_ascii_case("sips") {
            Ok(Self::Sips)
        } else {
            Err(ValidationError::InvalidScheme {
                scheme: input.to_string(),
            })
        }
    }

    /// Returns the lowercase scheme name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sip => "sip",
            Self::Sips => "sips",
        }
    }

    /// Returns the port assumed when a URI does not name one.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Sip => DEFAULT_SIP_PORT,
            Self::Sips => DEFAULT_SIPS_PORT,
        }
    }

    /// Returns the transport assumed when a URI does not name one.
    #[must_use]
    pub const fn default_transport(self) -> &'static str {
        match self {
            Self::Sip => DEFAULT_SIP_TRANSPORT,
            Self::Sips => DEFAULT_SIPS_TRANSPORT,
        }
    }

    /// Returns true for `sips`.
    #[must_use]
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Sips)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Scheme {
    type Error = ValidationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Scheme::parse("sip").unwrap(), Scheme::Sip);
        assert_eq!(Scheme::parse("SIP").unwrap(), Scheme::Sip);
        assert_eq!(Scheme::parse("SiPs").unwrap(), Scheme::Sips);
    }

    #[test]
    fn parse_rejects_other_schemes() {
        for input in ["", "sisp", "tel", "http"] {
            assert!(matches!(
                Scheme::parse(input),
                Err(ValidationError::InvalidScheme { .. })
            ));
        }
    }

    #[test]
    fn defaults_follow_scheme() {
        assert_eq!(Scheme::Sip.default_port(), 5060);
        assert_eq!(Scheme::Sips.default_port(), 5061);
        assert_eq!(Scheme::Sip.default_transport(), "udp");
        assert_eq!(Scheme::Sips.default_transport(), "tcp");
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Scheme::Sips.to_string(), "sips");
    }
}
