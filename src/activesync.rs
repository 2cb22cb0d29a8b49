//! ActiveSync (MobileSync) Autodiscover writer
//!
//! Emits the MobileSync variant of the Autodiscover document used by
//! Windows Mail and mobile Exchange-style clients. Only activesync
//! servers participate; each contributes its first endpoint as a
//! synthesized `Microsoft-Server-ActiveSync` URL.

use crate::error::Result;
use crate::handler::ResponseWriter;
use crate::provider::ProviderConfig;
use crate::request::Request;
use crate::server::{Endpoint, Server, ServerType};
use crate::xml::XmlBuilder;

const AUTODISCOVER_NS: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/responseschema/2006";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// User display name placeholder; MobileSync requires the element but
/// the account's real name is not known here.
const DISPLAY_NAME_PLACEHOLDER: &str = "Mail User";

const ACTIVESYNC_PATH: &str = "/Microsoft-Server-ActiveSync";

/// Writer for the MobileSync Autodiscover schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveSyncWriter;

impl ResponseWriter for ActiveSyncWriter {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn write(&self, provider: &ProviderConfig, request: &Request) -> Result<String> {
        let mut xml = XmlBuilder::new();
        xml.declaration(Some("utf-8"))?;
        xml.open_with_attributes(
            "Autodiscover",
            &[
                ("xmlns", AUTODISCOVER_NS),
                ("xmlns:xsd", XSD_NS),
                ("xmlns:xsi", XSI_NS),
            ],
        )?;
        xml.open("Response")?;
        xml.text_element("Culture", "en:us")?;

        xml.open("User")?;
        xml.text_element("DisplayName", DISPLAY_NAME_PLACEHOLDER)?;
        xml.text_element("EMailAddress", &request.email)?;
        xml.close()?;

        xml.open("Action")?;
        xml.open("Settings")?;

        for server in &provider.servers {
            for endpoint in &server.endpoints {
                if write_server(&mut xml, server, endpoint)? {
                    break;
                }
            }
        }

        xml.close()?;
        xml.close()?;
        xml.close()?;
        xml.close()?;
        Ok(xml.finish())
    }
}

/// Build the MobileSync URL, eliding the scheme's conventional port.
fn mobilesync_url(server: &Server, endpoint: &Endpoint) -> String {
    let (scheme, conventional_port) = if endpoint.socket_type == "http" {
        ("http", 80)
    } else {
        ("https", 443)
    };

    let mut url = format!("{scheme}://{}", server.hostname);
    if endpoint.port != conventional_port {
        url.push_str(&format!(":{}", endpoint.port));
    }
    url.push_str(ACTIVESYNC_PATH);
    url
}

/// Write one `Server` element for an activesync server's endpoint.
/// Returns whether one was written, ending the scan for this server.
fn write_server(xml: &mut XmlBuilder, server: &Server, endpoint: &Endpoint) -> Result<bool> {
    if server.server_type != ServerType::ActiveSync {
        return Ok(false);
    }

    let url = mobilesync_url(server, endpoint);

    xml.open("Server")?;
    xml.text_element("Type", "MobileSync")?;
    xml.text_element("Url", &url)?;
    xml.text_element("Name", &url)?;
    xml.close()?;
    Ok(true)
}
