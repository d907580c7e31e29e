//! Kani Arbitrary implementations and proof harnesses for property verification.
//!
//! This module provides `kani::Arbitrary` trait implementations for
//! the crate's public types, enabling property-based verification
//! with the Kani model checker.
//!
//! # Usage
//!
//! Kani is not a Cargo dependency. Install and run with:
//!
//! ```bash
//! cargo install --locked kani-verifier
//! cargo kani setup
//! cargo kani --features kani
//! ```
//!
//! This module is only compiled when using Kani (`#[cfg(kani)]`).

use crate::{Header, Parameters, Scheme, Uri, ValidationError};

/// Valid characters for host names and users
const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-.";

/// Characters with meaning to the URI grammar
const GRAMMAR_CHARS: &[u8] = b"sip:;?&=@<>\"[] abc1";

fn arbitrary_token_char() -> char {
    let idx: usize = kani::any();
    let idx = idx % TOKEN_CHARS.len();
    TOKEN_CHARS[idx] as char
}

fn arbitrary_token(max_len: usize) -> String {
    let len: usize = kani::any();
    let len = 1 + (len % max_len);
    (0..len).map(|_| arbitrary_token_char()).collect()
}

impl kani::Arbitrary for Scheme {
    fn any() -> Self {
        if kani::any() { Scheme::Sips } else { Scheme::Sip }
    }
}

impl kani::Arbitrary for Uri {
    fn any() -> Self {
        let scheme: Scheme = kani::any();
        let mut builder = Uri::builder().scheme(scheme).host(arbitrary_token(4));

        if kani::any() {
            builder = builder.user(arbitrary_token(3));
        }
        if kani::any() {
            let port: u16 = kani::any();
            kani::assume(port > 0);
            builder = builder.port(port);
        }

        builder.build().expect("valid URI by construction")
    }
}

impl kani::Arbitrary for Header {
    fn any() -> Self {
        let uri: Uri = kani::any();
        let mut builder = Header::builder(uri);
        if kani::any() {
            builder = builder.display_name(arbitrary_token(3));
        }
        if kani::any() {
            builder = builder.tag(arbitrary_token(3));
        }
        builder.build().expect("valid header by construction")
    }
}

// ============================================================================
// Kani Proof Harnesses
// ============================================================================

/// Proof: Parse then render equals original
#[kani::proof]
#[kani::unwind(10)]
fn proof_uri_roundtrip() {
    let uri: Uri = kani::any();
    let reparsed = Uri::parse(uri.as_str()).expect("rendered URI should parse");
    assert_eq!(reparsed, uri);
}

/// Proof: Header parse then render equals original
#[kani::proof]
#[kani::unwind(10)]
fn proof_header_roundtrip() {
    let header: Header = kani::any();
    let reparsed = Header::parse(header.as_str()).expect("rendered header should parse");
    assert_eq!(reparsed, header);
}

/// Proof: Built URIs always carry a transport and a non-zero port
#[kani::proof]
#[kani::unwind(10)]
fn proof_defaults_materialized() {
    let uri: Uri = kani::any();
    assert!(uri.port() > 0);
    assert!(uri.parameters().contains_key("transport"));
}

/// Proof: A sips URI never ends up with udp
#[kani::proof]
#[kani::unwind(10)]
fn proof_sips_rejects_udp() {
    let uri: Uri = kani::any();
    kani::assume(uri.scheme() == Scheme::Sips);
    assert!(matches!(
        uri.with_transport("udp"),
        Err(ValidationError::UnreliableTransport { .. })
    ));
}

/// Proof: Port 0 is always rejected
#[kani::proof]
#[kani::unwind(10)]
fn proof_port_zero_rejected() {
    let uri: Uri = kani::any();
    assert_eq!(
        uri.with_port(Some(0)),
        Err(ValidationError::PortOutOfRange { port: 0 })
    );
}

/// Proof: with_parameters restores a missing transport
#[kani::proof]
#[kani::unwind(10)]
fn proof_with_parameters_restores_transport() {
    let uri: Uri = kani::any();
    let changed = uri
        .with_parameters(Parameters::new())
        .expect("empty parameters are valid");
    assert_eq!(changed.transport(), uri.scheme().default_transport());
}

/// Proof: Parsing never panics on short inputs from the grammar alphabet
#[kani::proof]
#[kani::unwind(8)]
fn proof_parse_never_panics() {
    let len: usize = kani::any();
    let len = len % 7;
    let input: String = (0..len)
        .map(|_| {
            let idx: usize = kani::any();
            GRAMMAR_CHARS[idx % GRAMMAR_CHARS.len()] as char
        })
        .collect();
    let _ = Uri::parse(&input);
    let _ = Header::parse(&input);
}
