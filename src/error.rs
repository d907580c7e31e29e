//! Error types for SIP URI and header parsing.

use std::fmt;

/// Errors returned by the string entry points ([`Uri::parse`](crate::Uri::parse)
/// and [`Header::parse`](crate::Header::parse)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The raw text could not be consumed by the grammar.
    Syntax(SyntaxError),
    /// The text was well formed but the value breaks an invariant.
    Validation(ValidationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{e}"),
            Self::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(e) => Some(e),
            Self::Validation(e) => Some(e),
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Self::Syntax(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

/// The grammar failed to consume the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: SyntaxErrorKind,
}

/// Specific syntax error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// No `scheme:` prefix was found
    MissingScheme,
    /// A scheme other than `sip` or `sips`
    InvalidScheme {
        /// The scheme that was found
        found: String,
    },
    /// The host is empty
    MissingHost,
    /// A `[` host literal without its closing `]`
    UnterminatedHostLiteral {
        /// The partial literal
        value: String,
    },
    /// The port is not a decimal integer
    InvalidPort {
        /// The text found after the colon
        value: String,
    },
    /// A parameter that is not `key=value`
    MalformedParameter {
        /// The offending pair
        pair: String,
    },
    /// A parameter key that appears twice
    DuplicateParameter {
        /// The repeated key
        name: String,
    },
    /// A query header that is not `key=value`
    MalformedHeader {
        /// The offending pair
        pair: String,
    },
    /// Text left over after every stage ran
    TrailingInput {
        /// The unconsumed remainder
        remainder: String,
    },
    /// A lone `<` or `>`, or `>` before `<`
    UnbalancedDelimiters,
    /// A display name with stray or unbalanced quotes
    InvalidDisplayName {
        /// The raw display name
        value: String,
    },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse '{}': ", self.input)?;
        match &self.kind {
            SyntaxErrorKind::MissingScheme => write!(f, "no scheme specified"),
            SyntaxErrorKind::InvalidScheme { found } => {
                write!(f, "invalid scheme '{found}'; expected 'sip' or 'sips'")
            }
            SyntaxErrorKind::MissingHost => write!(f, "missing host"),
            SyntaxErrorKind::UnterminatedHostLiteral { value } => {
                write!(f, "host literal '{value}' is missing its closing ']'")
            }
            SyntaxErrorKind::InvalidPort { value } => {
                write!(f, "invalid port '{value}'; port must be a decimal integer")
            }
            SyntaxErrorKind::MalformedParameter { pair } => {
                write!(f, "parameter '{pair}' must be formatted as key=[value]")
            }
            SyntaxErrorKind::DuplicateParameter { name } => {
                write!(f, "duplicate parameter '{name}'")
            }
            SyntaxErrorKind::MalformedHeader { pair } => {
                write!(f, "header '{pair}' must be formatted as key=[value]")
            }
            SyntaxErrorKind::TrailingInput { remainder } => {
                write!(f, "unexpected trailing input '{remainder}'")
            }
            SyntaxErrorKind::UnbalancedDelimiters => write!(f, "unbalanced <> delimiters"),
            SyntaxErrorKind::InvalidDisplayName { value } => {
                write!(f, "invalid display name '{value}'")
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// A structurally valid value that violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Scheme is not `sip` or `sips`
    InvalidScheme {
        /// The rejected scheme
        scheme: String,
    },
    /// Host is empty
    MissingHost,
    /// Host holds a delimiter that would split it when read back
    InvalidHost {
        /// The rejected host
        host: String,
    },
    /// User holds a delimiter of the user part
    InvalidUser {
        /// The rejected user
        user: String,
    },
    /// Password holds a delimiter of the user part
    InvalidPassword {
        /// The rejected password
        password: String,
    },
    /// A URI or header parameter with an empty key or a delimiter in it
    InvalidParameter {
        /// The parameter key
        key: String,
        /// The parameter value
        value: String,
    },
    /// A query header with an empty key or a delimiter in it
    InvalidHeader {
        /// The header key
        key: String,
        /// The header value
        value: String,
    },
    /// Port outside 1..=65535
    PortOutOfRange {
        /// The rejected port
        port: u32,
    },
    /// Password given without a user
    PasswordWithoutUser,
    /// A display name or contact containing a double quote
    QuoteInDisplayName {
        /// The rejected name
        value: String,
    },
    /// A display name containing `<` or `>`
    InvalidDisplayName {
        /// The rejected name
        value: String,
    },
    /// A `sips` URI asking for an unreliable transport
    UnreliableTransport {
        /// The rejected transport
        transport: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScheme { scheme } => {
                write!(f, "scheme '{scheme}' is invalid; must be 'sip' or 'sips'")
            }
            Self::MissingHost => write!(f, "host is a required attribute"),
            Self::InvalidHost { host } => write!(f, "invalid host '{host}'"),
            Self::InvalidUser { user } => write!(f, "invalid user '{user}'"),
            Self::InvalidPassword { password } => write!(f, "invalid password '{password}'"),
            Self::InvalidParameter { key, value } => {
                write!(f, "invalid parameter '{key}={value}'")
            }
            Self::InvalidHeader { key, value } => write!(f, "invalid header '{key}={value}'"),
            Self::PortOutOfRange { port } => {
                write!(f, "port {port} is out of range; must be 1-65535")
            }
            Self::PasswordWithoutUser => write!(f, "cannot set password without user"),
            Self::QuoteInDisplayName { value } => {
                write!(f, "display name '{value}' must not contain '\"'")
            }
            Self::InvalidDisplayName { value } => {
                write!(f, "display name '{value}' must not contain '<' or '>'")
            }
            Self::UnreliableTransport { transport } => {
                write!(f, "sips URIs require a reliable transport, found '{transport}'")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_display_includes_input() {
        let err = SyntaxError {
            input: "sip:localhost&".to_string(),
            kind: SyntaxErrorKind::TrailingInput {
                remainder: "&".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "cannot parse 'sip:localhost&': unexpected trailing input '&'"
        );
    }

    #[test]
    fn error_source_is_inner() {
        use std::error::Error as _;

        let err = Error::from(ValidationError::MissingHost);
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("host is a required attribute"));
    }
}
