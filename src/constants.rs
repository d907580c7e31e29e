//! Constants for SIP URI defaults and validation.

/// Default port for the `sip` scheme.
pub const DEFAULT_SIP_PORT: u16 = 5060;

/// Default port for the `sips` scheme.
pub const DEFAULT_SIPS_PORT: u16 = 5061;

/// Default transport for the `sip` scheme.
pub const DEFAULT_SIP_TRANSPORT: &str = "udp";

/// Default transport for the `sips` scheme.
pub const DEFAULT_SIPS_TRANSPORT: &str = "tcp";

/// Transport that `sips` URIs may not use.
pub const UNRELIABLE_TRANSPORT: &str = "udp";

/// Name of the transport parameter.
pub const TRANSPORT_PARAM: &str = "transport";

/// Name of the dialog tag parameter.
pub const TAG_PARAM: &str = "tag";

/// Length of a generated tag in hexadecimal characters.
pub const GENERATED_TAG_LENGTH: usize = 32;
