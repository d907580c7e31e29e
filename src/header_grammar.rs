//! Grammar for `name-addr` style header values.
//!
//! ```text
//! header = [ display-name ] "<" sip-uri ">" *( ";" key "=" value )
//!        / sip-uri *( ";" key "=" value )
//! ```

use crate::error::SyntaxErrorKind;
use crate::grammar::{self, UriParts};
use crate::parameters::Parameters;

pub(crate) const DISPLAY_NAME_RESERVED: &[char] = &['<', '>'];

pub(crate) const HEADER_PARAM_KEY_RESERVED: &[char] = &[';', '=', '<', '>'];

pub(crate) const HEADER_PARAM_VALUE_RESERVED: &[char] = &[';', '<', '>'];

/// Fields extracted from a raw header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderParts {
    pub display_name: Option<String>,
    pub parameters: Parameters,
    pub uri: UriParts,
}

pub(crate) fn parse_header(input: &str) -> Result<HeaderParts, SyntaxErrorKind> {
    let (display_part, uri_part, params_part) = match (input.find('<'), input.find('>')) {
        (None, None) => {
            let (uri_part, params_part) = input.split_once(';').unwrap_or((input, ""));
            (None, uri_part, params_part)
        }
        (Some(open), Some(close)) if open < close => (
            Some(&input[..open]),
            &input[open + 1..close],
            &input[close + 1..],
        ),
        _ => return Err(SyntaxErrorKind::UnbalancedDelimiters),
    };

    Ok(HeaderParts {
        display_name: parse_display_name(display_part)?,
        parameters: parse_params(params_part)?,
        uri: grammar::parse_uri(uri_part)?,
    })
}

/// Accepts `"quoted name"` or bare text; bare text is trimmed.
pub(crate) fn parse_display_name(raw: Option<&str>) -> Result<Option<String>, SyntaxErrorKind> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    if !raw.contains('"') {
        let name = raw.trim();
        return Ok((!name.is_empty()).then(|| name.to_string()));
    }

    let invalid = || SyntaxErrorKind::InvalidDisplayName {
        value: raw.to_string(),
    };
    let inner = raw
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(invalid)?;
    if inner.contains('"') {
        return Err(invalid());
    }
    Ok((!inner.is_empty()).then(|| inner.to_string()))
}

/// Header parameters; blank segments between `;` separators are skipped and
/// whitespace around keys and values is dropped.
pub(crate) fn parse_params(raw: &str) -> Result<Parameters, SyntaxErrorKind> {
    let mut params = Parameters::new();

    for pair in raw.split(';') {
        if pair.trim().is_empty() {
            continue;
        }
        let (key, value) = grammar::split_pair(pair)
            .map(|(key, value)| (key.trim(), value.trim()))
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| SyntaxErrorKind::MalformedParameter {
                pair: pair.to_string(),
            })?;
        if params.contains_key(key) {
            return Err(SyntaxErrorKind::DuplicateParameter {
                name: key.to_string(),
            });
        }
        params.insert(key, value);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_part_is_extracted() {
        let cases = [
            ("Alice <sip:localhost>;tag=abc", "localhost", None),
            ("\"Alice\" <sip:localhost>;tag=abc", "localhost", None),
            ("\"Alice\" <sip:[::dead:beef]?x=y>;tag=abc", "[::dead:beef]", None),
            (
                "\"Alice\" <sip:localhost;maddr=1.1.1.1>;tag=abc",
                "localhost",
                Some("1.1.1.1"),
            ),
            ("sip:localhost?x=y;tag=abc", "localhost", None),
        ];
        for (input, host, maddr) in cases {
            let parts = parse_header(input).unwrap();
            assert_eq!(parts.uri.host, host, "{input}");
            assert_eq!(parts.uri.parameters.get("maddr"), maddr, "{input}");
        }
    }

    #[test]
    fn bare_uri_keeps_query_headers() {
        let parts = parse_header("sip:localhost?x=y;tag=abc").unwrap();
        assert_eq!(parts.uri.headers.get("x"), Some("y"));
        assert_eq!(parts.parameters.get("tag"), Some("abc"));
    }

    #[test]
    fn parameters_are_separated_from_uri() {
        let cases: [(&str, &[(&str, &str)]); 6] = [
            ("Alice <sip:localhost>", &[]),
            ("Alice <sip:localhost>;tag=abc", &[("tag", "abc")]),
            (
                "Alice <sip:localhost>;tag=abc;foo=bar",
                &[("tag", "abc"), ("foo", "bar")],
            ),
            ("Alice <sip:localhost;red=herring>", &[]),
            ("Alice <sip:localhost;a=b;b=c>;tag=abc", &[("tag", "abc")]),
            (
                "Alice <sip:localhost;x=y;n=m>;tag=abc;foo=bar",
                &[("tag", "abc"), ("foo", "bar")],
            ),
        ];
        for (input, expected) in cases {
            let parts = parse_header(input).unwrap();
            assert_eq!(parts.parameters.iter().collect::<Vec<_>>(), expected.to_vec(), "{input}");
        }
    }

    #[test]
    fn display_names() {
        let cases = [
            ("Alice <sip:localhost>", Some("Alice")),
            ("\"Alice\" <sip:localhost>", Some("Alice")),
            ("John Doe <sip:localhost>", Some("John Doe")),
            ("\"John Doe\" <sip:localhost>", Some("John Doe")),
            ("<sip:localhost>", None),
            ("sip:localhost", None),
        ];
        for (input, expected) in cases {
            let parts = parse_header(input).unwrap();
            assert_eq!(parts.display_name.as_deref(), expected, "{input}");
        }
    }

    #[test]
    fn parameters_without_leading_separator() {
        let parts = parse_header("<sip:localhost>tag=abc").unwrap();
        assert_eq!(parts.parameters.get("tag"), Some("abc"));
    }

    #[test]
    fn parameter_whitespace_is_dropped() {
        let parts = parse_header("<sip:localhost> ; tag = abc ;x=y ").unwrap();
        assert_eq!(
            parts.parameters.iter().collect::<Vec<_>>(),
            vec![("tag", "abc"), ("x", "y")]
        );
        assert!(matches!(
            parse_header("<sip:localhost>; =abc"),
            Err(SyntaxErrorKind::MalformedParameter { .. })
        ));
    }

    #[test]
    fn unbalanced_delimiters() {
        for input in ["<sip:localhost", "sip:localhost>", "Bob >sip:localhost<"] {
            assert_eq!(
                parse_header(input),
                Err(SyntaxErrorKind::UnbalancedDelimiters),
                "{input}"
            );
        }
    }

    #[test]
    fn invalid_display_names() {
        for input in ["\"Bob <sip:localhost>", "\"Bob\" x <sip:localhost>", "\"a\"b\" <sip:h>"] {
            assert!(
                matches!(
                    parse_header(input),
                    Err(SyntaxErrorKind::InvalidDisplayName { .. })
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn malformed_parameters() {
        assert!(matches!(
            parse_header("<sip:localhost>;tag"),
            Err(SyntaxErrorKind::MalformedParameter { .. })
        ));
        assert!(matches!(
            parse_header("<sip:localhost>;tag=a;tag=b"),
            Err(SyntaxErrorKind::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn uri_errors_propagate() {
        assert_eq!(
            parse_header("Bob <localhost>"),
            Err(SyntaxErrorKind::MissingScheme)
        );
    }
}
