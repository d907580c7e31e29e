//! Parser and validator for SIP URIs and `name-addr` header values.
//!
//! This crate implements parsing, validation, normalization and
//! serialization of `sip:` and `sips:` URIs, plus the header wrapper used by
//! `From`, `To` and `Contact` style headers.
//!
//! # Overview
//!
//! A SIP URI has the structure:
//!
//! ```text
//! ["contact" <]scheme:[user[:password]@]host[:port][;key=value]*[?key=value[&key=value]*][>]
//! ```
//!
//! A header wraps a URI with a display name and its own parameters:
//!
//! ```text
//! ["display name" ]<sip-uri>[;key=value]*
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use sip_uri::{Header, Scheme, Uri};
//!
//! // Parse a URI; the port and transport are filled in from the scheme
//! let uri = Uri::parse("sip:alice@example.com").unwrap();
//! assert_eq!(uri.scheme(), Scheme::Sip);
//! assert_eq!(uri.port(), 5060);
//! assert_eq!(uri.transport(), "udp");
//! assert_eq!(uri.to_string(), "sip:alice@example.com:5060;transport=udp");
//!
//! // Values are immutable; with_* returns a modified copy
//! let moved = uri.with_port(Some(5080)).unwrap();
//! assert_eq!(uri.port(), 5060);
//! assert_eq!(moved.port(), 5080);
//!
//! // Headers separate their own parameters from the URI's
//! let from = Header::parse("\"Alice\" <sip:alice@example.com>;tag=1928301774").unwrap();
//! assert_eq!(from.display_name(), Some("Alice"));
//! assert_eq!(from.tag(), Some("1928301774"));
//! ```
//!
//! # Builder Pattern
//!
//! Use the typestate builder for compile-time enforced construction:
//!
//! ```rust
//! use sip_uri::{Scheme, UriBuilder};
//!
//! let uri = UriBuilder::new()
//!     .scheme(Scheme::Sips)
//!     .host("example.com")
//!     .user("bob")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(uri.to_string(), "sips:bob@example.com:5061;transport=tcp");
//! ```
//!
//! # Defaults and Validation
//!
//! | Scheme | Default port | Default transport |
//! |--------|--------------|-------------------|
//! | `sip`  | 5060 | `udp` |
//! | `sips` | 5061 | `tcp` |
//!
//! Defaults are applied once, when a value is constructed. Every
//! construction path (parsing, builders, `with_*`) then checks that the host
//! is non-empty, the port is in `1..=65535`, a password has a user, and a
//! `sips` URI does not use `transport=udp`.
//!
//! # Equality
//!
//! [`Uri`] and [`Header`] compare, hash and order by their rendered string.
//! Parameter order is therefore significant.
//!
//! # Errors
//!
//! String entry points return [`Error`], which is either a [`SyntaxError`]
//! (the text does not follow the grammar) or a [`ValidationError`] (the
//! value breaks an invariant). Builders and `with_*` methods only return
//! [`ValidationError`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod builder;
mod constants;
mod error;
mod grammar;
mod header;
mod header_grammar;
#[cfg(kani)]
mod kani_impls;
mod parameters;
pub mod prelude;
mod query;
mod scheme;
mod uri;

pub use builder::{Empty, HasScheme, Ready, UriBuilder};
pub use constants::{
    DEFAULT_SIPS_PORT, DEFAULT_SIPS_TRANSPORT, DEFAULT_SIP_PORT, DEFAULT_SIP_TRANSPORT,
    GENERATED_TAG_LENGTH, TAG_PARAM, TRANSPORT_PARAM, UNRELIABLE_TRANSPORT,
};
pub use error::{Error, SyntaxError, SyntaxErrorKind, ValidationError};
pub use header::{Header, HeaderBuilder};
pub use parameters::Parameters;
pub use query::UriHeaders;
pub use scheme::Scheme;
pub use uri::Uri;
