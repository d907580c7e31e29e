//! Main SIP URI type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use tracing::{debug, trace};

use crate::builder::UriBuilder;
use crate::constants::{TAG_PARAM, TRANSPORT_PARAM, UNRELIABLE_TRANSPORT};
use crate::error::{Error, SyntaxError, ValidationError};
use crate::grammar::{
    self, HEADER_KEY_RESERVED, HEADER_VALUE_RESERVED, HOST_LITERAL_RESERVED, HOST_RESERVED,
    PARAM_KEY_RESERVED, PARAM_VALUE_RESERVED, PASSWORD_RESERVED, USER_RESERVED, UriParts,
};
use crate::parameters::Parameters;
use crate::query::UriHeaders;
use crate::scheme::Scheme;

/// A parsed and validated SIP URI.
///
/// Values are immutable: every `with_*` method copies the URI, changes one
/// field and validates the result again, leaving the original untouched.
///
/// # Structure
///
/// ```text
/// ["contact" <]scheme:[user[:password]@]host[:port][;key=value]*[?key=value[&key=value]*][>]
/// ```
///
/// The port and `transport` parameter are filled in from the scheme when
/// absent, so they are always present once a URI exists.
///
/// # Equality
///
/// Two URIs are equal when their rendered forms are identical. Parameter
/// and header order is significant: `sip:h;a=1;b=2` and `sip:h;b=2;a=1`
/// compare unequal.
///
/// # Examples
///
/// ```
/// use sip_uri::{Scheme, Uri};
///
/// let uri = Uri::parse("sip:alice@example.com").unwrap();
/// assert_eq!(uri.scheme(), Scheme::Sip);
/// assert_eq!(uri.user(), Some("alice"));
/// assert_eq!(uri.port(), 5060);
/// assert_eq!(uri.to_string(), "sip:alice@example.com:5060;transport=udp");
///
/// let secure = uri.with_transport("tls").unwrap().with_scheme(Scheme::Sips).unwrap();
/// assert_eq!(secure.to_string(), "sips:alice@example.com:5060;transport=tls");
/// ```
#[derive(Debug, Clone)]
pub struct Uri {
    contact: Option<String>,
    scheme: Scheme,
    user: Option<String>,
    password: Option<String>,
    host: String,
    port: u16,
    parameters: Parameters,
    headers: UriHeaders,
    /// Canonical string representation
    rendered: String,
}

impl Uri {
    /// Parses a SIP URI, optionally wrapped as `"contact" <uri>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] if the text does not follow the URI grammar,
    /// or [`Error::Validation`] if the parsed value breaks an invariant
    /// (port out of range, `sips` with `transport=udp`, ...).
    pub fn parse(input: &str) -> Result<Self, Error> {
        Self::parse_inner(input)
            .inspect_err(|e| debug!(input, error = %e, "rejected SIP URI"))
    }

    /// Starts a [`UriBuilder`].
    #[must_use]
    pub fn builder() -> UriBuilder {
        UriBuilder::new()
    }

    /// Returns the inline contact name, if present.
    #[must_use]
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    /// Returns the scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the user, if present.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the password, if present.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns `user[:password]`, if a user is present.
    #[must_use]
    pub fn userinfo(&self) -> Option<String> {
        let user = self.user.as_deref()?;
        Some(match &self.password {
            Some(password) => format!("{user}:{password}"),
            None => user.to_string(),
        })
    }

    /// Returns the host, with brackets for IPv6 literals.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, explicit or defaulted from the scheme.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn hostport(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the URI parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the query headers.
    #[must_use]
    pub const fn headers(&self) -> &UriHeaders {
        &self.headers
    }

    /// Returns the `transport` parameter.
    #[must_use]
    pub fn transport(&self) -> &str {
        self.parameters
            .get(TRANSPORT_PARAM)
            .unwrap_or_else(|| self.scheme.default_transport())
    }

    /// Returns the `tag` parameter, if present.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.parameters.get(TAG_PARAM)
    }

    /// Returns the canonical URI string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Returns `scheme:[userinfo@]host:port`, without contact, parameters or
    /// headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use sip_uri::Uri;
    ///
    /// let uri = Uri::parse("\"Bob\" <sip:bob@host;lr=?x=y>").unwrap();
    /// assert_eq!(uri.short_str(), "sip:bob@host:5060");
    /// ```
    #[must_use]
    pub fn short_str(&self) -> String {
        match self.userinfo() {
            Some(userinfo) => format!("{}:{userinfo}@{}:{}", self.scheme, self.host, self.port),
            None => format!("{}:{}:{}", self.scheme, self.host, self.port),
        }
    }

    /// Returns a new URI with the given contact name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuoteInDisplayName`] if the name contains `"`.
    pub fn with_contact(&self, contact: Option<&str>) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.contact = contact.map(str::to_string))
    }

    /// Returns a new URI with the given scheme.
    ///
    /// The port and transport are kept as they are; a `sip` URI using the
    /// default `udp` transport must switch transport before it can become
    /// `sips`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnreliableTransport`] when switching to
    /// `sips` with `transport=udp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sip_uri::{Scheme, Uri};
    ///
    /// let uri = Uri::parse("sip:localhost;transport=tcp").unwrap();
    /// let secure = uri.with_scheme(Scheme::Sips).unwrap();
    /// assert_eq!(secure.to_string(), "sips:localhost:5060;transport=tcp");
    ///
    /// assert!(Uri::parse("sip:localhost").unwrap().with_scheme(Scheme::Sips).is_err());
    /// ```
    pub fn with_scheme(&self, scheme: Scheme) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.scheme = scheme)
    }

    /// Returns a new URI with the given user.
    ///
    /// `"user:password"` sets both fields, a bare user keeps the current
    /// password, and `None` removes user and password together.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PasswordWithoutUser`] if the user is empty
    /// while a password remains, or [`ValidationError::InvalidUser`] /
    /// [`ValidationError::InvalidPassword`] if either holds a delimiter
    /// such as `;` or `@`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sip_uri::Uri;
    ///
    /// let uri = Uri::parse("sip:localhost").unwrap();
    /// let with_creds = uri.with_user(Some("alice:secret")).unwrap();
    /// assert_eq!(with_creds.user(), Some("alice"));
    /// assert_eq!(with_creds.password(), Some("secret"));
    ///
    /// let anonymous = with_creds.with_user(None).unwrap();
    /// assert_eq!(anonymous.userinfo(), None);
    /// ```
    pub fn with_user(&self, user: Option<&str>) -> Result<Self, ValidationError> {
        self.modified(|parts| match user {
            None => {
                parts.user = None;
                parts.password = None;
            }
            Some(user) => match user.split_once(':') {
                Some((user, password)) => {
                    parts.user = Some(user.to_string());
                    parts.password = Some(password.to_string());
                }
                None => parts.user = Some(user.to_string()),
            },
        })
    }

    /// Returns a new URI with the given password.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PasswordWithoutUser`] if the URI has no user
    /// and [`ValidationError::InvalidPassword`] if the password holds `;`, `?`
    /// or `@`.
    pub fn with_password(&self, password: Option<&str>) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.password = password.map(str::to_string))
    }

    /// Returns a new URI with the given host.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingHost`] if the host is empty and
    /// [`ValidationError::InvalidHost`] if a bare host holds `:`, `;`, `?`,
    /// `&` or `@`.
    pub fn with_host(&self, host: &str) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.host = host.to_string())
    }

    /// Returns a new URI with the given port; `None` restores the scheme
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PortOutOfRange`] for port 0.
    pub fn with_port(&self, port: Option<u16>) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.port = port.map(u32::from))
    }

    /// Returns a new URI with the given parameters.
    ///
    /// The scheme's default transport is appended if the new parameters do
    /// not name one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnreliableTransport`] if the parameters
    /// request `udp` on a `sips` URI, and [`ValidationError::InvalidParameter`]
    /// for an empty key or a key or value holding `;` or `?`.
    pub fn with_parameters(&self, parameters: Parameters) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.parameters = parameters)
    }

    /// Returns a new URI with the given query headers.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHeader`] for an empty key or a key or
    /// value holding `&`.
    pub fn with_headers(&self, headers: UriHeaders) -> Result<Self, ValidationError> {
        self.modified(|parts| parts.headers = headers)
    }

    /// Returns a new URI with the `transport` parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnreliableTransport`] for `udp` on a `sips`
    /// URI and [`ValidationError::InvalidParameter`] for a transport holding
    /// `;` or `?`.
    pub fn with_transport(&self, transport: &str) -> Result<Self, ValidationError> {
        self.modified(|parts| {
            parts.parameters.insert(TRANSPORT_PARAM, transport);
        })
    }

    /// Returns a new URI with the `tag` parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] for a tag holding `;` or
    /// `?`.
    pub fn with_tag(&self, tag: &str) -> Result<Self, ValidationError> {
        self.modified(|parts| {
            parts.parameters.insert(TAG_PARAM, tag);
        })
    }

    /// Applies defaults and checks every invariant.
    pub(crate) fn from_parts(parts: UriParts) -> Result<Self, ValidationError> {
        let UriParts {
            contact,
            scheme,
            user,
            password,
            host,
            port,
            mut parameters,
            headers,
        } = parts;

        let contact = contact.filter(|c| !c.is_empty());
        let user = user.filter(|u| !u.is_empty());
        let port = port.unwrap_or_else(|| u32::from(scheme.default_port()));
        if !parameters.contains_key(TRANSPORT_PARAM) {
            parameters.insert(TRANSPORT_PARAM, scheme.default_transport());
        }

        if let Some(contact) = contact.as_ref().filter(|c| c.contains('"')) {
            return Err(ValidationError::QuoteInDisplayName {
                value: contact.clone(),
            });
        }
        if host.is_empty() {
            return Err(ValidationError::MissingHost);
        }
        if !is_valid_host(&host) {
            return Err(ValidationError::InvalidHost { host });
        }
        if let Some(user) = user.as_ref().filter(|u| u.contains(USER_RESERVED)) {
            return Err(ValidationError::InvalidUser { user: user.clone() });
        }
        if let Some(password) = password.as_ref().filter(|p| p.contains(PASSWORD_RESERVED)) {
            return Err(ValidationError::InvalidPassword {
                password: password.clone(),
            });
        }
        parameters.check_reserved(PARAM_KEY_RESERVED, PARAM_VALUE_RESERVED)?;
        if let Some((key, value)) = headers.iter().find(|(k, v)| {
            k.is_empty() || k.contains(HEADER_KEY_RESERVED) || v.contains(HEADER_VALUE_RESERVED)
        }) {
            return Err(ValidationError::InvalidHeader {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(ValidationError::PortOutOfRange { port })?;
        if password.is_some() && user.is_none() {
            return Err(ValidationError::PasswordWithoutUser);
        }
        let transport = parameters.get(TRANSPORT_PARAM).unwrap_or_default();
        if scheme.is_secure() && transport.eq_ignore_ascii_case(UNRELIABLE_TRANSPORT) {
            return Err(ValidationError::UnreliableTransport {
                transport: transport.to_string(),
            });
        }

        let rendered = Self::render(
            contact.as_deref(),
            scheme,
            user.as_deref(),
            password.as_deref(),
            &host,
            port,
            &parameters,
            &headers,
        );

        Ok(Self {
            contact,
            scheme,
            user,
            password,
            host,
            port,
            parameters,
            headers,
            rendered,
        })
    }

    /// Copy without the inline contact, for wrapping inside a header.
    pub(crate) fn without_contact(self) -> Self {
        if self.contact.is_none() {
            return self;
        }
        let rendered = Self::render(
            None,
            self.scheme,
            self.user.as_deref(),
            self.password.as_deref(),
            &self.host,
            self.port,
            &self.parameters,
            &self.headers,
        );
        Self {
            contact: None,
            rendered,
            ..self
        }
    }

    fn to_parts(&self) -> UriParts {
        UriParts {
            contact: self.contact.clone(),
            scheme: self.scheme,
            user: self.user.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: Some(u32::from(self.port)),
            parameters: self.parameters.clone(),
            headers: self.headers.clone(),
        }
    }

    fn modified(&self, change: impl FnOnce(&mut UriParts)) -> Result<Self, ValidationError> {
        let mut parts = self.to_parts();
        change(&mut parts);
        Self::from_parts(parts)
            .inspect_err(|e| trace!(uri = %self, error = %e, "rejected URI modification"))
    }

    fn parse_inner(input: &str) -> Result<Self, Error> {
        let parts = grammar::parse_uri(input).map_err(|kind| SyntaxError {
            input: input.to_string(),
            kind,
        })?;
        Ok(Self::from_parts(parts)?)
    }

    #[allow(clippy::too_many_arguments)]
    fn render(
        contact: Option<&str>,
        scheme: Scheme,
        user: Option<&str>,
        password: Option<&str>,
        host: &str,
        port: u16,
        parameters: &Parameters,
        headers: &UriHeaders,
    ) -> String {
        let mut result = format!("{scheme}:");

        if let Some(user) = user {
            result.push_str(user);
            if let Some(password) = password {
                result.push(':');
                result.push_str(password);
            }
            result.push('@');
        }

        result.push_str(&format!("{host}:{port}"));

        if !parameters.is_empty() {
            result.push(';');
            result.push_str(&parameters.to_string());
        }

        if !headers.is_empty() {
            result.push('?');
            result.push_str(&headers.to_string());
        }

        match contact {
            Some(contact) => format!("\"{contact}\" <{result}>"),
            None => result,
        }
    }
}

fn is_valid_host(host: &str) -> bool {
    match host.strip_prefix('[') {
        Some(literal) => literal
            .strip_suffix(']')
            .is_some_and(|inner| !inner.is_empty() && !inner.contains(HOST_LITERAL_RESERVED)),
        None => !host.contains(HOST_RESERVED),
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl TryFrom<&str> for Uri {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.rendered)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
