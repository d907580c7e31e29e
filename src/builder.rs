//! Typestate builder for constructing [`Uri`] instances.
//!
//! This module provides a builder that uses phantom types to enforce
//! at compile-time that the scheme and host are supplied before building.

use std::marker::PhantomData;

use crate::constants::{TAG_PARAM, TRANSPORT_PARAM};
use crate::error::ValidationError;
use crate::grammar::UriParts;
use crate::parameters::Parameters;
use crate::query::UriHeaders;
use crate::scheme::Scheme;
use crate::uri::Uri;

/// Marker: No components set yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

/// Marker: Scheme has been set.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasScheme;

/// Marker: Scheme and host are set, ready to build.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ready;

/// A typestate builder for constructing [`Uri`] instances.
///
/// The scheme must be set first, then the host; everything else is
/// optional and can be set in any state. `build()` applies the same
/// defaults and validation as [`Uri::parse`].
///
/// User and password are always given separately, as are host and port.
///
/// # Examples
///
/// ```
/// use sip_uri::{Scheme, UriBuilder};
///
/// let uri = UriBuilder::new()
///     .scheme(Scheme::Sips)
///     .host("[::1]")
///     .port(5080)
///     .parameter("maddr", "[::dead:beef]")
///     .header("x", "y")
///     .build()
///     .unwrap();
///
/// assert_eq!(uri.to_string(), "sips:[::1]:5080;maddr=[::dead:beef];transport=tcp?x=y");
/// ```
///
/// # Compile-Time Safety
///
/// ```compile_fail
/// use sip_uri::UriBuilder;
///
/// // Error: cannot call host() before scheme()
/// let builder = UriBuilder::new().host("localhost");
/// ```
///
/// ```compile_fail
/// use sip_uri::{Scheme, UriBuilder};
///
/// // Error: cannot call build() without a host
/// let uri = UriBuilder::new().scheme(Scheme::Sip).build();
/// ```
#[derive(Debug, Clone)]
pub struct UriBuilder<State = Empty> {
    contact: Option<String>,
    scheme: Option<Scheme>,
    user: Option<String>,
    password: Option<String>,
    host: String,
    port: Option<u16>,
    parameters: Parameters,
    headers: UriHeaders,
    _state: PhantomData<State>,
}

impl UriBuilder<Empty> {
    /// Creates a new builder in the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contact: None,
            scheme: None,
            user: None,
            password: None,
            host: String::new(),
            port: None,
            parameters: Parameters::new(),
            headers: UriHeaders::new(),
            _state: PhantomData,
        }
    }

    /// Sets the scheme and advances to the [`HasScheme`] state.
    #[must_use]
    pub fn scheme(self, scheme: Scheme) -> UriBuilder<HasScheme> {
        UriBuilder {
            contact: self.contact,
            scheme: Some(scheme),
            user: self.user,
            password: self.password,
            host: self.host,
            port: self.port,
            parameters: self.parameters,
            headers: self.headers,
            _state: PhantomData,
        }
    }

    /// Parses and sets the scheme from a string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidScheme`] if the string is not `sip`
    /// or `sips`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sip_uri::UriBuilder;
    ///
    /// let _builder = UriBuilder::new().try_scheme("sip")?;
    /// assert!(UriBuilder::new().try_scheme("tel").is_err());
    /// # Ok::<(), sip_uri::ValidationError>(())
    /// ```
    pub fn try_scheme(self, s: &str) -> Result<UriBuilder<HasScheme>, ValidationError> {
        let scheme = Scheme::parse(s)?;
        Ok(self.scheme(scheme))
    }
}

impl Default for UriBuilder<Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl UriBuilder<HasScheme> {
    /// Sets the host and advances to the [`Ready`] state.
    ///
    /// IPv6 literals keep their brackets, e.g. `"[::1]"`.
    #[must_use]
    pub fn host(self, host: impl Into<String>) -> UriBuilder<Ready> {
        UriBuilder {
            contact: self.contact,
            scheme: self.scheme,
            user: self.user,
            password: self.password,
            host: host.into(),
            port: self.port,
            parameters: self.parameters,
            headers: self.headers,
            _state: PhantomData,
        }
    }
}

impl UriBuilder<Ready> {
    /// Builds the final [`Uri`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the host is empty, the port is 0, a
    /// password is set without a user, a contact contains `"`, or a `sips`
    /// URI requests `udp`.
    pub fn build(self) -> Result<Uri, ValidationError> {
        // Only reachable through scheme(), so this is always Some.
        let scheme = self.scheme.unwrap_or(Scheme::Sip);

        Uri::from_parts(UriParts {
            contact: self.contact,
            scheme,
            user: self.user,
            password: self.password,
            host: self.host,
            port: self.port.map(u32::from),
            parameters: self.parameters,
            headers: self.headers,
        })
    }
}

/// Methods available in all states for optional components.
impl<State> UriBuilder<State> {
    /// Sets the inline contact name.
    #[must_use]
    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    /// Sets the user.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets the password; requires a user at build time.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets an explicit port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Replaces all parameters.
    ///
    /// If called multiple times, the last value wins.
    #[must_use]
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets a single parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Replaces all query headers.
    #[must_use]
    pub fn headers(mut self, headers: UriHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a query header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    /// Sets the `transport` parameter.
    #[must_use]
    pub fn transport(self, transport: impl Into<String>) -> Self {
        self.parameter(TRANSPORT_PARAM, transport)
    }

    /// Sets the `tag` parameter.
    #[must_use]
    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.parameter(TAG_PARAM, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_empty_builder() {
        let builder = UriBuilder::new();
        assert!(builder.scheme.is_none());
        assert!(builder.host.is_empty());
        assert!(builder.parameters.is_empty());
    }

    #[test]
    fn minimal_build_matches_parse() {
        let uri = UriBuilder::new()
            .scheme(Scheme::Sip)
            .host("localhost")
            .build()
            .unwrap();
        assert_eq!(uri, Uri::parse("sip:localhost").unwrap());
    }

    #[test]
    fn explicit_transport_is_kept() {
        let uri = UriBuilder::new()
            .scheme(Scheme::Sip)
            .host("localhost")
            .parameters([("transport", "tcp")].into_iter().collect())
            .build()
            .unwrap();
        assert_eq!(uri, Uri::parse("sip:localhost;transport=tcp").unwrap());
    }

    #[test]
    fn full_build_matches_parse() {
        let uri = UriBuilder::new()
            .scheme(Scheme::Sips)
            .host("[::1]")
            .port(5080)
            .parameters([("maddr", "[::dead:beef]")].into_iter().collect())
            .headers([("x", "y"), ("a", "")].into_iter().collect())
            .build()
            .unwrap();
        assert_eq!(
            uri,
            Uri::parse("sips:[::1]:5080;maddr=[::dead:beef]?x=y&a=").unwrap()
        );
    }

    #[test]
    fn optional_fields_can_be_set_in_any_state() {
        let uri = UriBuilder::new()
            .contact("Alice")
            .user("alice")
            .scheme(Scheme::Sip)
            .password("secret")
            .host("example.com")
            .transport("tcp")
            .tag("abc")
            .build()
            .unwrap();
        assert_eq!(
            uri.to_string(),
            "\"Alice\" <sip:alice:secret@example.com:5060;transport=tcp;tag=abc>"
        );
    }

    #[test]
    fn try_scheme_rejects_unknown() {
        assert!(matches!(
            UriBuilder::new().try_scheme("tel"),
            Err(ValidationError::InvalidScheme { .. })
        ));
    }

    #[test]
    fn build_validates() {
        let empty_host = UriBuilder::new().scheme(Scheme::Sip).host("").build();
        assert_eq!(empty_host, Err(ValidationError::MissingHost));

        let zero_port = UriBuilder::new().scheme(Scheme::Sip).host("h").port(0).build();
        assert_eq!(zero_port, Err(ValidationError::PortOutOfRange { port: 0 }));

        let no_user = UriBuilder::new()
            .scheme(Scheme::Sip)
            .host("h")
            .password("pw")
            .build();
        assert_eq!(no_user, Err(ValidationError::PasswordWithoutUser));

        let sips_udp = UriBuilder::new()
            .scheme(Scheme::Sips)
            .host("h")
            .transport("udp")
            .build();
        assert!(matches!(sips_udp, Err(ValidationError::UnreliableTransport { .. })));
    }

    #[test]
    fn clone_preserves_state() {
        let builder = UriBuilder::new().scheme(Scheme::Sip).host("h");
        let a = builder.clone().build().unwrap();
        let b = builder.build().unwrap();
        assert_eq!(a, b);
    }
}
