//! Outlook Autodiscover writer
//!
//! Emits the namespaced `Autodiscover/Response/Account` document.
//! Endpoints are scanned in order per server; a rejected endpoint
//! does not stop the scan, an accepted one does, so every server
//! contributes at most one `Protocol` element.

use crate::error::Result;
use crate::handler::ResponseWriter;
use crate::provider::ProviderConfig;
use crate::request::Request;
use crate::server::{Endpoint, Server, ServerType};
use crate::xml::XmlBuilder;
use tracing::debug;

const AUTODISCOVER_NS: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006";
const RESPONSE_NS: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/outlook/responseschema/2006a";

/// Writer for the Outlook Autodiscover schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlookWriter;

impl ResponseWriter for OutlookWriter {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn write(&self, provider: &ProviderConfig, request: &Request) -> Result<String> {
        let mut xml = XmlBuilder::new();
        xml.declaration(Some("utf-8"))?;
        xml.open_with_attributes("Autodiscover", &[("xmlns", AUTODISCOVER_NS)])?;
        xml.open_with_attributes("Response", &[("xmlns", RESPONSE_NS)])?;

        xml.open("Account")?;
        xml.text_element("AccountType", "email")?;
        xml.text_element("Action", "settings")?;

        for server in &provider.servers {
            for endpoint in &server.endpoints {
                if write_protocol(&mut xml, server, endpoint, request)? {
                    break;
                }
            }
        }

        xml.close()?;
        xml.close()?;
        xml.close()?;
        Ok(xml.finish())
    }
}

/// Accept `password-cleartext` and `SPA` for any server type, and
/// `none` for smtp only.
fn accepts(server: &Server, endpoint: &Endpoint) -> bool {
    match endpoint.authentication.as_str() {
        "password-cleartext" | "SPA" => true,
        "none" => server.server_type == ServerType::Smtp,
        _ => false,
    }
}

/// Write one `Protocol` element if the endpoint is acceptable.
/// Returns whether it was, ending the endpoint scan for this server.
fn write_protocol(
    xml: &mut XmlBuilder,
    server: &Server,
    endpoint: &Endpoint,
    request: &Request,
) -> Result<bool> {
    if !accepts(server, endpoint) {
        debug!(
            "rejecting {} endpoint with authentication '{}'",
            server.server_type, endpoint.authentication
        );
        return Ok(false);
    }

    xml.open("Protocol")?;
    xml.text_element("Type", &server.server_type.as_str().to_uppercase())?;
    xml.text_element("Server", &server.hostname)?;
    xml.text_element("Port", &endpoint.port.to_string())?;
    xml.text_element(
        "LoginName",
        server.login_name(request)?.as_deref().unwrap_or_default(),
    )?;
    xml.text_element("DomainRequired", "off")?;
    xml.text_element(
        "SPA",
        if endpoint.authentication == "SPA" {
            "on"
        } else {
            "off"
        },
    )?;

    match endpoint.socket_type.as_str() {
        "plain" => {
            xml.text_element("SSL", "off")?;
        }
        "SSL" => {
            xml.text_element("SSL", "on")?;
            xml.text_element("Encryption", "SSL")?;
        }
        "STARTTLS" => {
            xml.text_element("SSL", "on")?;
            xml.text_element("Encryption", "TLS")?;
        }
        _ => {}
    }

    xml.text_element(
        "AuthRequired",
        if endpoint.authentication == "none" {
            "off"
        } else {
            "on"
        },
    )?;

    if server.server_type == ServerType::Smtp {
        xml.text_element("UsePOPAuth", if server.same_password { "on" } else { "off" })?;
        xml.text_element("SMTPLast", "off")?;
    }

    xml.close()?;
    Ok(true)
}
