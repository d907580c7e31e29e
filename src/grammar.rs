//! Staged grammar for SIP URIs.
//!
//! # Grammar Reference
//!
//! ```text
//! decorated  = [ ( DQUOTE *qdtext DQUOTE / name ) *WSP ] "<" sip-uri ">"
//! sip-uri    = scheme ":" [ user [ ":" password ] "@" ] host [ ":" port ]
//!              *( ";" key "=" value ) [ "?" key "=" value *( "&" key "=" value ) ]
//! scheme     = "sip" / "sips"            ; case-insensitive
//! host       = "[" 1*( %x00-5C / %x5E-10FFFF ) "]" / 1*( any char except ":" ";" "?" "&" )
//! ```
//!
//! Each stage consumes a prefix of its input and hands back the remainder.
//! Optional stages that find nothing return the input untouched; required
//! stages fail. Range checks on the port are left to [`Uri`](crate::Uri)
//! validation.

use crate::error::SyntaxErrorKind;
use crate::parameters::Parameters;
use crate::query::UriHeaders;
use crate::scheme::Scheme;

/// Characters a bare host cannot hold and still be read back.
pub(crate) const HOST_RESERVED: &[char] = &[':', ';', '?', '&', '@', '<', '>'];

/// Characters a bracketed host literal cannot hold between its brackets.
pub(crate) const HOST_LITERAL_RESERVED: &[char] = &[']', '@', '<', '>'];

pub(crate) const USER_RESERVED: &[char] = &[':', ';', '?', '@', '<', '>'];

pub(crate) const PASSWORD_RESERVED: &[char] = &[';', '?', '@', '<', '>'];

pub(crate) const PARAM_KEY_RESERVED: &[char] = &[';', '?', '=', '<', '>'];

pub(crate) const PARAM_VALUE_RESERVED: &[char] = &[';', '?', '<', '>'];

pub(crate) const HEADER_KEY_RESERVED: &[char] = &['&', '=', '<', '>'];

pub(crate) const HEADER_VALUE_RESERVED: &[char] = &['&', '<', '>'];

/// Fields extracted from a raw URI, before defaults and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UriParts {
    pub contact: Option<String>,
    pub scheme: Scheme,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u32>,
    pub parameters: Parameters,
    pub headers: UriHeaders,
}

/// Runs every stage in order and rejects leftover input.
pub(crate) fn parse_uri(input: &str) -> Result<UriParts, SyntaxErrorKind> {
    let (contact, rest) = parse_contact(input);
    let (scheme, rest) = parse_scheme(rest)?;
    let (user, password, rest) = parse_user_part(rest);
    let (host, rest) = parse_host(rest)?;
    let (port, rest) = parse_port(rest)?;
    let (parameters, rest) = parse_parameters(rest)?;
    let (headers, rest) = parse_headers(rest)?;

    if !rest.is_empty() {
        return Err(SyntaxErrorKind::TrailingInput {
            remainder: rest.to_string(),
        });
    }

    Ok(UriParts {
        contact,
        scheme,
        user,
        password,
        host,
        port,
        parameters,
        headers,
    })
}

/// Strips a `"name" <...>`, `name <...>` or `<...>` wrapper.
pub(crate) fn parse_contact(input: &str) -> (Option<String>, &str) {
    let Some(body) = input.strip_suffix('>') else {
        return (None, input);
    };

    if let Some(quoted) = body.trim_start().strip_prefix('"') {
        let Some(close) = quoted.find('"') else {
            return (None, input);
        };
        let Some(inner) = quoted[close + 1..].trim_start().strip_prefix('<') else {
            return (None, input);
        };
        return (non_empty(&quoted[..close]), inner);
    }

    let Some(open) = body.find('<') else {
        return (None, input);
    };
    let name = &body[..open];
    // An unquoted name is separated from `<` by whitespace.
    let separated = name.is_empty() || name.ends_with(char::is_whitespace);
    if !separated || name.contains('"') {
        return (None, input);
    }
    (non_empty(name.trim()), &body[open + 1..])
}

pub(crate) fn parse_scheme(input: &str) -> Result<(Scheme, &str), SyntaxErrorKind> {
    let (name, rest) = input
        .split_once(':')
        .ok_or(SyntaxErrorKind::MissingScheme)?;
    if name.is_empty() {
        return Err(SyntaxErrorKind::MissingScheme);
    }
    let scheme = Scheme::parse(name).map_err(|_| SyntaxErrorKind::InvalidScheme {
        found: name.to_ascii_lowercase(),
    })?;
    Ok((scheme, rest))
}

/// Extracts `user[:password]@` if an `@` appears before any `;` or `?`.
pub(crate) fn parse_user_part(input: &str) -> (Option<String>, Option<String>, &str) {
    let boundary = input.find([';', '?']).unwrap_or(input.len());
    let Some(at) = input[..boundary].find('@') else {
        return (None, None, input);
    };

    let userinfo = &input[..at];
    let (user, password) = match userinfo.split_once(':') {
        Some((user, password)) => (user, Some(password)),
        None => (userinfo, None),
    };
    if user.is_empty() {
        return (None, None, input);
    }

    (
        Some(user.to_string()),
        password.map(str::to_string),
        &input[at + 1..],
    )
}

pub(crate) fn parse_host(input: &str) -> Result<(String, &str), SyntaxErrorKind> {
    // Brackets keep the colons of an IPv6 literal out of the port stage.
    if input.starts_with('[') {
        let close = input
            .find(']')
            .ok_or_else(|| SyntaxErrorKind::UnterminatedHostLiteral {
                value: input.to_string(),
            })?;
        if close == 1 {
            return Err(SyntaxErrorKind::MissingHost);
        }
        return Ok((input[..=close].to_string(), &input[close + 1..]));
    }

    let end = input.find([':', ';', '?', '&']).unwrap_or(input.len());
    if end == 0 {
        return Err(SyntaxErrorKind::MissingHost);
    }
    Ok((input[..end].to_string(), &input[end..]))
}

pub(crate) fn parse_port(input: &str) -> Result<(Option<u32>, &str), SyntaxErrorKind> {
    let Some(rest) = input.strip_prefix(':') else {
        return Ok((None, input));
    };

    let end = rest.find([';', '?']).unwrap_or(rest.len());
    let digits = &rest[..end];
    let invalid = || SyntaxErrorKind::InvalidPort {
        value: digits.to_string(),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let port = digits.parse::<u32>().map_err(|_| invalid())?;
    Ok((Some(port), &rest[end..]))
}

pub(crate) fn parse_parameters(input: &str) -> Result<(Parameters, &str), SyntaxErrorKind> {
    let mut params = Parameters::new();
    let mut input = input;

    while let Some(rest) = input.strip_prefix(';') {
        let end = rest.find([';', '?']).unwrap_or(rest.len());
        let pair = &rest[..end];
        let (key, value) = split_pair(pair).ok_or_else(|| SyntaxErrorKind::MalformedParameter {
            pair: pair.to_string(),
        })?;
        if params.contains_key(key) {
            return Err(SyntaxErrorKind::DuplicateParameter {
                name: key.to_string(),
            });
        }
        params.insert(key, value);
        input = &rest[end..];
    }

    Ok((params, input))
}

pub(crate) fn parse_headers(input: &str) -> Result<(UriHeaders, &str), SyntaxErrorKind> {
    let mut headers = UriHeaders::new();
    let Some(rest) = input.strip_prefix('?') else {
        return Ok((headers, input));
    };

    for pair in rest.split('&') {
        let (key, value) = split_pair(pair).ok_or_else(|| SyntaxErrorKind::MalformedHeader {
            pair: pair.to_string(),
        })?;
        headers.add(key, value);
    }

    Ok((headers, ""))
}

/// Splits `key=value`; the key must be non-empty, the value may be empty.
pub(crate) fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (key, value) = pair.split_once('=')?;
    (!key.is_empty()).then_some((key, value))
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_forms() {
        let cases = [
            ("sip:host", None, "sip:host"),
            ("<sip:host>", None, "sip:host"),
            ("John <sip:host>", Some("John"), "sip:host"),
            ("\"Mary\" <sip:host>", Some("Mary"), "sip:host"),
            ("\"Alice Cooper\" <sip:host>", Some("Alice Cooper"), "sip:host"),
            ("\"<>>:<<>\" <sip:host>", Some("<>>:<<>"), "sip:host"),
            ("John Doe <sip:host>", Some("John Doe"), "sip:host"),
        ];
        for (input, contact, rest) in cases {
            let (got_contact, got_rest) = parse_contact(input);
            assert_eq!(got_contact.as_deref(), contact, "contact of {input}");
            assert_eq!(got_rest, rest, "remainder of {input}");
        }
    }

    #[test]
    fn contact_without_wrapper_leaves_input() {
        for input in [
            "<sip:host",
            "sip:host>",
            "Mary\" <sip:host>",
            "Alice sip:host",
            " sip:host",
            "John<sip:host>",
            "sip:h;x=<a>",
        ] {
            assert_eq!(parse_contact(input), (None, input));
        }
    }

    #[test]
    fn scheme_stage() {
        assert_eq!(parse_scheme("sip:").unwrap(), (Scheme::Sip, ""));
        assert_eq!(parse_scheme("sips:").unwrap(), (Scheme::Sips, ""));
        assert_eq!(
            parse_scheme("sip:localhost:5060").unwrap(),
            (Scheme::Sip, "localhost:5060")
        );
        assert_eq!(parse_scheme("SIP:x").unwrap(), (Scheme::Sip, "x"));
    }

    #[test]
    fn scheme_stage_fails() {
        for input in ["", ":", "sip", "sips"] {
            assert_eq!(
                parse_scheme(input),
                Err(SyntaxErrorKind::MissingScheme),
                "{input}"
            );
        }
        for input in ["sisp:", "localhost:5060"] {
            assert!(matches!(
                parse_scheme(input),
                Err(SyntaxErrorKind::InvalidScheme { .. })
            ));
        }
    }

    #[test]
    fn user_part_stage() {
        let cases = [
            ("bob:pass@some.tld", Some("bob"), Some("pass"), "some.tld"),
            ("bob@some.tld", Some("bob"), None, "some.tld"),
            ("some.tld", None, None, "some.tld"),
            ("a@some.tld", Some("a"), None, "some.tld"),
            ("@some.tld", None, None, "@some.tld"),
            (":some.tld", None, None, ":some.tld"),
            ("host;x=a@b", None, None, "host;x=a@b"),
        ];
        for (input, user, password, rest) in cases {
            let (got_user, got_password, got_rest) = parse_user_part(input);
            assert_eq!(got_user.as_deref(), user, "user of {input}");
            assert_eq!(got_password.as_deref(), password, "password of {input}");
            assert_eq!(got_rest, rest, "remainder of {input}");
        }
    }

    #[test]
    fn host_stage() {
        let cases = [
            ("some.tld", "some.tld", ""),
            ("some.tld:5060;x=y", "some.tld", ":5060;x=y"),
            ("tld", "tld", ""),
            ("[::1]:5060", "[::1]", ":5060"),
            ("[::dead:beef]?x=y", "[::dead:beef]", "?x=y"),
            ("localhost&", "localhost", "&"),
        ];
        for (input, host, rest) in cases {
            let (got_host, got_rest) = parse_host(input).unwrap();
            assert_eq!(got_host, host);
            assert_eq!(got_rest, rest);
        }
    }

    #[test]
    fn host_stage_fails() {
        for input in ["", "?", ";", ":5060", "[]"] {
            assert_eq!(parse_host(input), Err(SyntaxErrorKind::MissingHost), "{input}");
        }
        assert!(matches!(
            parse_host("[::1"),
            Err(SyntaxErrorKind::UnterminatedHostLiteral { .. })
        ));
    }

    #[test]
    fn port_stage() {
        let cases = [
            (":5060", Some(5060), ""),
            (":1", Some(1), ""),
            (":5060;x=y", Some(5060), ";x=y"),
            (":5060?x=y", Some(5060), "?x=y"),
            (":65535", Some(65535), ""),
            (":70000", Some(70000), ""),
            (";x=y", None, ";x=y"),
        ];
        for (input, port, rest) in cases {
            assert_eq!(parse_port(input).unwrap(), (port, rest), "{input}");
        }
    }

    #[test]
    fn port_stage_fails() {
        for input in [":port", ":", ":50a0", ":99999999999"] {
            assert!(
                matches!(parse_port(input), Err(SyntaxErrorKind::InvalidPort { .. })),
                "{input}"
            );
        }
    }

    #[test]
    fn parameters_stage() {
        let (params, rest) = parse_parameters(";ten=10;five=5?x=y").unwrap();
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("ten", "10"), ("five", "5")]);
        assert_eq!(rest, "?x=y");

        let (params, rest) = parse_parameters(";maddr=[::1];lr=").unwrap();
        assert_eq!(params.get("maddr"), Some("[::1]"));
        assert_eq!(params.get("lr"), Some(""));
        assert_eq!(rest, "");
    }

    #[test]
    fn parameters_stage_fails() {
        assert!(matches!(
            parse_parameters(";"),
            Err(SyntaxErrorKind::MalformedParameter { .. })
        ));
        assert!(matches!(
            parse_parameters(";lr"),
            Err(SyntaxErrorKind::MalformedParameter { .. })
        ));
        assert!(matches!(
            parse_parameters(";=x"),
            Err(SyntaxErrorKind::MalformedParameter { .. })
        ));
        assert_eq!(
            parse_parameters(";a=1;a=2"),
            Err(SyntaxErrorKind::DuplicateParameter {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn headers_stage() {
        let (headers, rest) = parse_headers("?x=y&x=z&a=b").unwrap();
        assert_eq!(headers.get_all("x").collect::<Vec<_>>(), vec!["y", "z"]);
        assert_eq!(headers.get_all("a").collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(headers.len(), 3);
        assert_eq!(rest, "");

        let (headers, _) = parse_headers("?x=&y=").unwrap();
        assert_eq!(headers.get("x"), Some(""));
        assert_eq!(headers.get("y"), Some(""));
    }

    #[test]
    fn headers_stage_fails() {
        for input in ["?", "?x", "?x=y&", "?=y"] {
            assert!(
                matches!(parse_headers(input), Err(SyntaxErrorKind::MalformedHeader { .. })),
                "{input}"
            );
        }
    }

    #[test]
    fn full_uri() {
        let parts = parse_uri("sip:user:pass@[::dead:beef]:5080;maddr=x?h=1").unwrap();
        assert_eq!(parts.scheme, Scheme::Sip);
        assert_eq!(parts.user.as_deref(), Some("user"));
        assert_eq!(parts.password.as_deref(), Some("pass"));
        assert_eq!(parts.host, "[::dead:beef]");
        assert_eq!(parts.port, Some(5080));
        assert_eq!(parts.parameters.get("maddr"), Some("x"));
        assert_eq!(parts.headers.get("h"), Some("1"));
    }

    #[test]
    fn angle_bracket_in_parameter_is_not_a_contact() {
        let parts = parse_uri("sip:h;x=<a>").unwrap();
        assert_eq!(parts.contact, None);
        assert_eq!(parts.host, "h");
        assert_eq!(parts.parameters.get("x"), Some("<a>"));
    }

    #[test]
    fn full_uri_rejects_trailing_input() {
        assert_eq!(
            parse_uri("sip:localhost&"),
            Err(SyntaxErrorKind::TrailingInput {
                remainder: "&".to_string()
            })
        );
    }

    #[test]
    fn full_uri_requires_host() {
        for input in ["sip:", "sip:?", "sip:;"] {
            assert_eq!(parse_uri(input), Err(SyntaxErrorKind::MissingHost), "{input}");
        }
    }
}
