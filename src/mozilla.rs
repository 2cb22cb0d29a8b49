//! Mozilla autoconfig writer
//!
//! Emits the `clientConfig` document consumed by Thunderbird,
//! Evolution, KMail, and Kontact. Every endpoint of every imap, pop3,
//! and smtp server gets its own server block; activesync servers are
//! not part of this schema. Endpoints whose authentication scheme has
//! no autoconfig equivalent are dropped one by one, never the whole
//! server.

use crate::error::Result;
use crate::handler::ResponseWriter;
use crate::provider::ProviderConfig;
use crate::request::Request;
use crate::server::{Endpoint, Server, ServerType};
use crate::xml::XmlBuilder;
use tracing::debug;

/// How an endpoint's authentication scheme renders in autoconfig.
enum AuthMapping {
    /// Maps to an autoconfig authentication value.
    Scheme(&'static str),
    /// `none`: valid, but the block carries no credentials.
    NoAuth,
    /// Unknown scheme; the endpoint is omitted from output.
    Unsupported,
}

fn map_authentication(authentication: &str) -> AuthMapping {
    match authentication {
        "password-cleartext" => AuthMapping::Scheme("password-cleartext"),
        "CRAM-MD5" => AuthMapping::Scheme("password-encrypted"),
        "none" => AuthMapping::NoAuth,
        _ => AuthMapping::Unsupported,
    }
}

/// Writer for the Mozilla autoconfig schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct MozillaWriter;

impl ResponseWriter for MozillaWriter {
    fn content_type(&self) -> &'static str {
        "text/xml"
    }

    fn write(&self, provider: &ProviderConfig, request: &Request) -> Result<String> {
        let mut xml = XmlBuilder::new();
        xml.declaration(None)?;
        xml.open_with_attributes("clientConfig", &[("version", "1.1")])?;

        write_email_provider(&mut xml, provider, request)?;

        xml.close()?;
        Ok(xml.finish())
    }
}

fn write_email_provider(
    xml: &mut XmlBuilder,
    provider: &ProviderConfig,
    request: &Request,
) -> Result<()> {
    xml.open_with_attributes("emailProvider", &[("id", provider.id.as_str())])?;

    for domain in &provider.domains {
        xml.text_element("domain", domain)?;
    }

    xml.text_element("displayName", &provider.name)?;
    xml.text_element("displayShortName", &provider.name_short)?;

    for server in &provider.servers {
        for endpoint in &server.endpoints {
            write_server(xml, server, endpoint, request)?;
        }
    }

    xml.close()?;
    Ok(())
}

fn write_server(
    xml: &mut XmlBuilder,
    server: &Server,
    endpoint: &Endpoint,
    request: &Request,
) -> Result<()> {
    match server.server_type {
        ServerType::Imap | ServerType::Pop3 => write_incoming_server(xml, server, endpoint, request),
        ServerType::Smtp => write_outgoing_server(xml, server, endpoint, request),
        ServerType::ActiveSync => Ok(()),
    }
}

fn write_incoming_server(
    xml: &mut XmlBuilder,
    server: &Server,
    endpoint: &Endpoint,
    request: &Request,
) -> Result<()> {
    // Incoming servers need credentials; both "none" and unknown
    // schemes drop the block.
    let AuthMapping::Scheme(authentication) = map_authentication(&endpoint.authentication) else {
        debug!(
            "skipping {} endpoint with authentication '{}'",
            server.server_type, endpoint.authentication
        );
        return Ok(());
    };

    xml.open_with_attributes("incomingServer", &[("type", server.server_type.as_str())])?;
    xml.text_element("hostname", &server.hostname)?;
    xml.text_element("port", &endpoint.port.to_string())?;
    xml.text_element("socketType", &endpoint.socket_type)?;
    xml.text_element(
        "username",
        server.login_name(request)?.as_deref().unwrap_or_default(),
    )?;
    xml.text_element("authentication", authentication)?;
    xml.close()?;
    Ok(())
}

fn write_outgoing_server(
    xml: &mut XmlBuilder,
    server: &Server,
    endpoint: &Endpoint,
    request: &Request,
) -> Result<()> {
    let mapping = map_authentication(&endpoint.authentication);
    if matches!(mapping, AuthMapping::Unsupported) {
        debug!(
            "skipping smtp endpoint with authentication '{}'",
            endpoint.authentication
        );
        return Ok(());
    }

    xml.open_with_attributes("outgoingServer", &[("type", "smtp")])?;
    xml.text_element("hostname", &server.hostname)?;
    xml.text_element("port", &endpoint.port.to_string())?;
    xml.text_element("socketType", &endpoint.socket_type)?;

    if let AuthMapping::Scheme(authentication) = mapping {
        xml.text_element(
            "username",
            server.login_name(request)?.as_deref().unwrap_or_default(),
        )?;
        xml.text_element("authentication", authentication)?;
    }

    xml.text_element("addThisServer", "true")?;
    xml.text_element("useGlobalPreferredServer", "true")?;
    xml.close()?;
    Ok(())
}
