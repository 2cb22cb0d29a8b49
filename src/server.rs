//! Mail server and endpoint model
//!
//! A [`Server`] is a mail service of a given protocol type exposing
//! one or more [`Endpoint`]s. Endpoints carry the socket transport,
//! port, and authentication scheme a client would use; their order is
//! significant to the protocol writers, which pick the first
//! acceptable one.

use crate::error::{Error, Result};
use crate::request::Request;
use crate::resolver::UsernameSource;
use std::fmt;

/// Default authentication scheme for new endpoints.
pub const AUTH_PASSWORD_CLEARTEXT: &str = "password-cleartext";

/// The protocol family a [`Server`] speaks.
///
/// The type fixes the default plain/SSL port pair used when an
/// endpoint is added without an explicit port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerType {
    Imap,
    Pop3,
    Smtp,
    ActiveSync,
}

impl ServerType {
    /// Parse a configuration-file server type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedServerType`] for anything other
    /// than `imap`, `pop3`, `smtp`, or `activesync`.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "imap" => Ok(Self::Imap),
            "pop3" => Ok(Self::Pop3),
            "smtp" => Ok(Self::Smtp),
            "activesync" => Ok(Self::ActiveSync),
            other => Err(Error::UnrecognizedServerType(other.to_string())),
        }
    }

    /// The configuration-file name of this server type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Imap => "imap",
            Self::Pop3 => "pop3",
            Self::Smtp => "smtp",
            Self::ActiveSync => "activesync",
        }
    }

    /// Default `(plain, ssl)` port pair for the type.
    #[must_use]
    pub const fn default_ports(self) -> (u16, u16) {
        match self {
            Self::Imap => (143, 993),
            Self::Pop3 => (110, 995),
            Self::Smtp => (25, 465),
            Self::ActiveSync => (80, 443),
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reachable combination of socket transport, port, and
/// authentication scheme for a server.
///
/// `socket_type` is free-form and protocol-dependent: `plain`,
/// `STARTTLS`, or `SSL` for imap/pop3/smtp, `http` or `https` for
/// activesync. Authentication strings are validated by the protocol
/// writers, not here; unknown schemes are dropped from output rather
/// than rejected at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub socket_type: String,
    pub port: u16,
    pub authentication: String,
}

/// A mail server offered by a provider.
#[derive(Debug, Clone)]
pub struct Server {
    pub server_type: ServerType,
    pub hostname: String,
    pub username: Option<UsernameSource>,
    pub same_password: bool,
    pub endpoints: Vec<Endpoint>,
}

impl Server {
    /// Create a server with no endpoints and no username.
    #[must_use]
    pub fn new(server_type: ServerType, hostname: impl Into<String>) -> Self {
        Self {
            server_type,
            hostname: hostname.into(),
            username: None,
            same_password: true,
            endpoints: Vec::new(),
        }
    }

    /// Set the login name for this server, either a literal string or
    /// a username resolver.
    pub fn with_username(&mut self, username: impl Into<UsernameSource>) -> &mut Self {
        self.username = Some(username.into());
        self
    }

    /// Mark the outgoing server as requiring its own password instead
    /// of reusing the incoming server's.
    pub fn with_different_password(&mut self) -> &mut Self {
        self.same_password = false;
        self
    }

    /// Append an endpoint with the default port for `socket_type` and
    /// password-cleartext authentication.
    pub fn with_endpoint(&mut self, socket_type: &str) -> &mut Self {
        self.add_endpoint(socket_type, None, AUTH_PASSWORD_CLEARTEXT)
    }

    /// Append an endpoint.
    ///
    /// When `port` is `None`, the server's SSL default applies for
    /// `socket_type == "SSL"` and the plain default otherwise.
    pub fn add_endpoint(
        &mut self,
        socket_type: &str,
        port: Option<u16>,
        authentication: &str,
    ) -> &mut Self {
        let (default_port, default_ssl_port) = self.server_type.default_ports();
        let port = port.unwrap_or(if socket_type == "SSL" {
            default_ssl_port
        } else {
            default_port
        });

        self.endpoints.push(Endpoint {
            socket_type: socket_type.to_string(),
            port,
            authentication: authentication.to_string(),
        });

        self
    }

    /// Derive the login name for this server from the request.
    ///
    /// A literal username is returned as-is; a resolver is invoked
    /// with the request. `None` means no username could be derived,
    /// which the writers tolerate by emitting an empty element.
    ///
    /// # Errors
    ///
    /// Returns an error if a resolver's backing source is unreadable.
    pub fn login_name(&self, request: &Request) -> Result<Option<String>> {
        match &self.username {
            None => Ok(None),
            Some(UsernameSource::Literal(name)) => Ok(Some(name.clone())),
            Some(UsernameSource::Resolver(resolver)) => resolver.find_username(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_types() {
        assert_eq!(ServerType::parse("imap").unwrap(), ServerType::Imap);
        assert_eq!(ServerType::parse("pop3").unwrap(), ServerType::Pop3);
        assert_eq!(ServerType::parse("smtp").unwrap(), ServerType::Smtp);
        assert_eq!(
            ServerType::parse("activesync").unwrap(),
            ServerType::ActiveSync
        );
    }

    #[test]
    fn parse_unknown_type_fails() {
        let err = ServerType::parse("nntp").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedServerType(t) if t == "nntp"));
    }

    #[test]
    fn default_ports_per_type() {
        assert_eq!(ServerType::Imap.default_ports(), (143, 993));
        assert_eq!(ServerType::Pop3.default_ports(), (110, 995));
        assert_eq!(ServerType::Smtp.default_ports(), (25, 465));
        assert_eq!(ServerType::ActiveSync.default_ports(), (80, 443));
    }

    #[test]
    fn endpoint_port_defaults_follow_socket_type() {
        let mut server = Server::new(ServerType::Imap, "imap.example.com");
        server.with_endpoint("SSL").with_endpoint("STARTTLS");

        assert_eq!(server.endpoints[0].port, 993);
        assert_eq!(server.endpoints[1].port, 143);
    }

    #[test]
    fn explicit_port_overrides_default() {
        let mut server = Server::new(ServerType::Smtp, "smtp.example.com");
        server.add_endpoint("STARTTLS", Some(587), AUTH_PASSWORD_CLEARTEXT);

        assert_eq!(server.endpoints[0].port, 587);
    }

    #[test]
    fn default_authentication_is_cleartext() {
        let mut server = Server::new(ServerType::Pop3, "pop.example.com");
        server.with_endpoint("SSL");

        assert_eq!(server.endpoints[0].authentication, "password-cleartext");
    }

    #[test]
    fn same_password_defaults_on() {
        let mut server = Server::new(ServerType::Smtp, "smtp.example.com");
        assert!(server.same_password);

        server.with_different_password();
        assert!(!server.same_password);
    }

    #[test]
    fn literal_username_returned_verbatim() {
        let mut server = Server::new(ServerType::Imap, "imap.example.com");
        server.with_username("jdoe");

        let request = Request::new("jdoe@example.com");
        assert_eq!(server.login_name(&request).unwrap().as_deref(), Some("jdoe"));
    }

    #[test]
    fn missing_username_yields_none() {
        let server = Server::new(ServerType::Imap, "imap.example.com");
        let request = Request::new("jdoe@example.com");
        assert_eq!(server.login_name(&request).unwrap(), None);
    }
}
