//! Mail client auto-configuration library
//!
//! Resolves an email address to a mail provider's connection settings
//! and renders the protocol-specific XML document a mail client
//! expects: Mozilla-style autoconfig ([`MozillaWriter`]), Outlook
//! Autodiscover ([`OutlookWriter`]), or the MobileSync/ActiveSync
//! Autodiscover variant ([`ActiveSyncWriter`]).
//!
//! Providers are described by a [`ConfigSource`] (the bundled
//! [`JsonSettings`] reads a JSON file per request), looked up by
//! domain in a [`ProviderRegistry`], and rendered by a
//! [`RequestHandler`].

mod activesync;
mod error;
mod handler;
mod mozilla;
mod outlook;
mod provider;
mod request;
mod resolver;
mod server;
mod settings;
mod xml;

pub use activesync::ActiveSyncWriter;
pub use error::{Error, Result};
pub use handler::{ConfigSource, RequestHandler, Response, ResponseWriter};
pub use mozilla::MozillaWriter;
pub use outlook::OutlookWriter;
pub use provider::{ProviderConfig, ProviderRegistry};
pub use request::{
    AutodiscoverRequest, ClientFamily, MOBILESYNC_RESPONSE_SCHEMA, Request,
    parse_autodiscover_body, parse_mozilla_query,
};
pub use resolver::{AliasesFileResolver, UsernameResolver, UsernameSource};
pub use server::{AUTH_PASSWORD_CLEARTEXT, Endpoint, Server, ServerType};
pub use settings::JsonSettings;
