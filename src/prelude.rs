//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use sip_uri::prelude::*;
//!
//! let uri = Uri::parse("sip:localhost").unwrap();
//! let header = Header::new(uri).with_default_tag();
//! assert!(header.tag().is_some());
//! ```
//!
//! Builder state markers (`Empty`, `HasScheme`, `Ready`) are left out; they
//! only appear in type signatures.

pub use crate::{
    // Core types
    Header, Parameters, Scheme, Uri, UriHeaders,
    // Builders
    HeaderBuilder, UriBuilder,
    // Errors
    Error, SyntaxError, SyntaxErrorKind, ValidationError,
    // Constants
    DEFAULT_SIPS_PORT, DEFAULT_SIPS_TRANSPORT, DEFAULT_SIP_PORT, DEFAULT_SIP_TRANSPORT,
    GENERATED_TAG_LENGTH, TAG_PARAM, TRANSPORT_PARAM, UNRELIABLE_TRANSPORT,
};
