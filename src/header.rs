//! SIP `name-addr` header values such as `From` and `To`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::constants::TAG_PARAM;
use crate::error::{Error, SyntaxError, ValidationError};
use crate::header_grammar::{
    self, DISPLAY_NAME_RESERVED, HEADER_PARAM_KEY_RESERVED, HEADER_PARAM_VALUE_RESERVED,
    HeaderParts,
};
use crate::parameters::Parameters;
use crate::uri::Uri;

/// A header value: optional display name, a bracketed [`Uri`] and header
/// parameters.
///
/// Header parameters are distinct from the URI's own parameters:
/// in `"Bob" <sip:localhost;x=y>;tag=abc` the URI carries `x=y` and the
/// header carries `tag=abc`.
///
/// # Examples
///
/// ```
/// use sip_uri::{Header, Uri};
///
/// let header = Header::parse("\"Bob\" <sip:localhost;x=y>;tag=abc").unwrap();
/// assert_eq!(header.display_name(), Some("Bob"));
/// assert_eq!(header.uri(), &Uri::parse("sip:localhost;x=y").unwrap());
/// assert_eq!(header.tag(), Some("abc"));
/// assert_eq!(
///     header.to_string(),
///     "\"Bob\" <sip:localhost:5060;x=y;transport=udp>;tag=abc"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Header {
    display_name: Option<String>,
    parameters: Parameters,
    uri: Uri,
    rendered: String,
}

impl Header {
    /// Parses a header value such as `Alice <sip:alice@host>;tag=1`.
    ///
    /// A bare URI is accepted too; everything after its first `;` is then
    /// read as header parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for unbalanced `<>`, a malformed display
    /// name or parameter, or a malformed URI, and [`Error::Validation`] if
    /// the URI breaks an invariant.
    pub fn parse(input: &str) -> Result<Self, Error> {
        Self::parse_inner(input)
            .inspect_err(|e| debug!(input, error = %e, "rejected SIP header"))
    }

    /// Wraps a URI with no display name and no parameters.
    #[must_use]
    pub fn new(uri: Uri) -> Self {
        let uri = uri.without_contact();
        let parameters = Parameters::new();
        let rendered = Self::render(None, &uri, &parameters);
        Self {
            display_name: None,
            parameters,
            uri,
            rendered,
        }
    }

    /// Starts a [`HeaderBuilder`] around a URI.
    #[must_use]
    pub fn builder(uri: Uri) -> HeaderBuilder {
        HeaderBuilder::new(uri)
    }

    /// Returns the display name, if present.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the header parameters.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the wrapped URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the `tag` header parameter, if present.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.parameters.get(TAG_PARAM)
    }

    /// Returns the canonical header string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Returns a new header with the given display name; `None` removes it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuoteInDisplayName`] if the name contains `"`
    /// and [`ValidationError::InvalidDisplayName`] if it contains `<` or `>`.
    pub fn with_display_name(&self, display_name: Option<&str>) -> Result<Self, ValidationError> {
        Self::from_parts(
            display_name.map(str::to_string),
            self.parameters.clone(),
            self.uri.clone(),
        )
        .inspect_err(|e| trace!(header = %self, error = %e, "rejected header modification"))
    }

    /// Returns a new header wrapping a different URI.
    #[must_use]
    pub fn with_uri(&self, uri: Uri) -> Self {
        self.rebuilt(self.parameters.clone(), uri)
    }

    /// Returns a new header with the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] for an empty key, a key
    /// holding `;` or `=`, a value holding `;`, or whitespace around either.
    pub fn with_parameters(&self, parameters: Parameters) -> Result<Self, ValidationError> {
        check_parameters(&parameters)
            .inspect_err(|e| trace!(header = %self, error = %e, "rejected header modification"))?;
        Ok(self.rebuilt(parameters, self.uri.clone()))
    }

    /// Returns a new header with the given tag.
    ///
    /// Passing the current tag returns an equal copy; `None` generates a
    /// fresh random tag.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] if the tag holds `;` or
    /// surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use sip_uri::Header;
    ///
    /// let header = Header::parse("<sip:localhost>").unwrap();
    /// let tagged = header.with_tag(Some("abcde")).unwrap();
    /// assert_eq!(tagged.to_string(), "<sip:localhost:5060;transport=udp>;tag=abcde");
    ///
    /// let random = header.with_tag(None).unwrap();
    /// assert_eq!(random.tag().map(str::len), Some(32));
    /// ```
    pub fn with_tag(&self, tag: Option<&str>) -> Result<Self, ValidationError> {
        match tag {
            Some(tag) if Some(tag) == self.tag() => Ok(self.clone()),
            Some(tag) => {
                let mut parameters = self.parameters.clone();
                parameters.insert(TAG_PARAM, tag);
                self.with_parameters(parameters)
            }
            None => Ok(self.tagged(generate_tag())),
        }
    }

    /// Returns a copy that is guaranteed to carry a tag.
    ///
    /// An existing tag is kept, so calling this twice is a no-op.
    #[must_use]
    pub fn with_default_tag(&self) -> Self {
        if self.tag().is_some() {
            return self.clone();
        }
        self.tagged(generate_tag())
    }

    pub(crate) fn from_parts(
        display_name: Option<String>,
        parameters: Parameters,
        uri: Uri,
    ) -> Result<Self, ValidationError> {
        let display_name = display_name.filter(|name| !name.is_empty());
        if let Some(name) = display_name.as_ref().filter(|name| name.contains('"')) {
            return Err(ValidationError::QuoteInDisplayName {
                value: name.clone(),
            });
        }
        if let Some(name) = display_name
            .as_ref()
            .filter(|name| name.contains(DISPLAY_NAME_RESERVED))
        {
            return Err(ValidationError::InvalidDisplayName {
                value: name.clone(),
            });
        }
        check_parameters(&parameters)?;

        let uri = uri.without_contact();
        let rendered = Self::render(display_name.as_deref(), &uri, &parameters);
        Ok(Self {
            display_name,
            parameters,
            uri,
            rendered,
        })
    }

    // Generated tags are plain hex and always valid.
    fn tagged(&self, tag: String) -> Self {
        let mut parameters = self.parameters.clone();
        parameters.insert(TAG_PARAM, tag);
        self.rebuilt(parameters, self.uri.clone())
    }

    // The display name was validated when `self` was built.
    fn rebuilt(&self, parameters: Parameters, uri: Uri) -> Self {
        let uri = uri.without_contact();
        let rendered = Self::render(self.display_name.as_deref(), &uri, &parameters);
        Self {
            display_name: self.display_name.clone(),
            parameters,
            uri,
            rendered,
        }
    }

    fn parse_inner(input: &str) -> Result<Self, Error> {
        let HeaderParts {
            display_name,
            parameters,
            uri,
        } = header_grammar::parse_header(input).map_err(|kind| SyntaxError {
            input: input.to_string(),
            kind,
        })?;
        let uri = Uri::from_parts(uri)?;
        Ok(Self::from_parts(display_name, parameters, uri)?)
    }

    fn render(display_name: Option<&str>, uri: &Uri, parameters: &Parameters) -> String {
        let mut result = match display_name {
            Some(name) => format!("\"{name}\" <{uri}>"),
            None => format!("<{uri}>"),
        };
        for (key, value) in parameters.iter() {
            result.push_str(&format!(";{key}={value}"));
        }
        result
    }
}

fn check_parameters(parameters: &Parameters) -> Result<(), ValidationError> {
    parameters.check_reserved(HEADER_PARAM_KEY_RESERVED, HEADER_PARAM_VALUE_RESERVED)?;
    match parameters
        .iter()
        .find(|(k, v)| k.trim() != *k || v.trim() != *v)
    {
        Some((key, value)) => Err(ValidationError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}

fn generate_tag() -> String {
    let tag = Uuid::new_v4().simple().to_string();
    trace!(tag = %tag, "generated header tag");
    tag
}

/// Builder for [`Header`] values.
///
/// # Examples
///
/// ```
/// use sip_uri::{HeaderBuilder, Uri};
///
/// let uri = Uri::parse("sip:localhost").unwrap();
/// let header = HeaderBuilder::new(uri)
///     .display_name("John")
///     .parameter("x", "y")
///     .build()
///     .unwrap();
/// assert_eq!(header.to_string(), "\"John\" <sip:localhost:5060;transport=udp>;x=y");
/// ```
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    uri: Uri,
    display_name: Option<String>,
    parameters: Parameters,
}

impl HeaderBuilder {
    /// Creates a builder around the given URI.
    #[must_use]
    pub fn new(uri: Uri) -> Self {
        Self {
            uri,
            display_name: None,
            parameters: Parameters::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Replaces all header parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets a single header parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Sets the `tag` parameter.
    #[must_use]
    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.parameter(TAG_PARAM, tag)
    }

    /// Builds the header.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuoteInDisplayName`] if the display name
    /// contains `"`, [`ValidationError::InvalidDisplayName`] if it contains
    /// `<` or `>`, and [`ValidationError::InvalidParameter`] for a parameter
    /// that would not read back unchanged.
    pub fn build(self) -> Result<Header, ValidationError> {
        Header::from_parts(self.display_name, self.parameters, self.uri)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl FromStr for Header {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Header {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Header {}

impl Hash for Header {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for Header {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Header {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Header {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.rendered)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Header {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
