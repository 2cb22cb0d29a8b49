//! Inbound request model and client-family routing
//!
//! A [`Request`] starts as a bare email address and is expanded into
//! localpart and domain before provider resolution. The module also
//! carries the two inbound parsing contracts: the Mozilla query-string
//! variant and the Autodiscover XML body shared by Outlook and
//! ActiveSync clients, plus the host-prefix routing that picks the
//! client family.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// `AcceptableResponseSchema` value sent by MobileSync (ActiveSync)
/// clients.
pub const MOBILESYNC_RESPONSE_SCHEMA: &str =
    "http://schemas.microsoft.com/exchange/autodiscover/mobilesync/responseschema/2006";

/// A configuration request for one email address.
///
/// `localpart` and `domain` are filled by [`Request::expand`] but may
/// be pre-populated to override the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub email: String,
    pub localpart: Option<String>,
    pub domain: Option<String>,
}

impl Request {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            localpart: None,
            domain: None,
        }
    }

    /// Split the email into localpart and domain.
    ///
    /// The domain is lowercased; the localpart is kept verbatim.
    /// Already-populated fields are left untouched, so expansion is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedEmail`] unless the email contains
    /// exactly one `@`.
    pub fn expand(&mut self) -> Result<()> {
        if self.email.matches('@').count() != 1 {
            return Err(Error::MalformedEmail(self.email.clone()));
        }

        let (localpart, domain) = self
            .email
            .split_once('@')
            .ok_or_else(|| Error::MalformedEmail(self.email.clone()))?;

        if self.localpart.is_none() {
            self.localpart = Some(localpart.to_string());
        }

        if self.domain.is_none() {
            self.domain = Some(domain.to_lowercase());
        }

        Ok(())
    }
}

/// Parsed Autodiscover POST body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutodiscoverRequest {
    pub email: String,
    pub response_schema: Option<String>,
}

impl From<AutodiscoverRequest> for Request {
    fn from(body: AutodiscoverRequest) -> Self {
        Self::new(body.email)
    }
}

/// Parse an Autodiscover request body.
///
/// Extracts `Request/EMailAddress` and, when present,
/// `Request/AcceptableResponseSchema`.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] for an empty body, an
/// unparseable document, or a body without an email address.
pub fn parse_autodiscover_body(body: &str) -> Result<AutodiscoverRequest> {
    if body.trim().is_empty() {
        return Err(Error::InvalidRequest("empty request body".to_string()));
    }

    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut email = None;
    let mut response_schema = None;
    let mut current_element = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current_element = String::from_utf8_lossy(e.name().as_ref()).to_string();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::InvalidRequest(format!("bad request body: {e}")))?
                    .to_string();

                match current_element.as_str() {
                    "EMailAddress" => email = Some(text),
                    "AcceptableResponseSchema" => response_schema = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current_element.clear(),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::InvalidRequest(format!("bad request body: {e}")));
            }
        }
        buf.clear();
    }

    let email =
        email.ok_or_else(|| Error::InvalidRequest("missing EMailAddress".to_string()))?;

    Ok(AutodiscoverRequest {
        email,
        response_schema,
    })
}

/// Parse the Mozilla autoconfig query string.
///
/// The email address arrives in the `emailaddress` parameter.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] when the parameter is absent or
/// not decodable.
pub fn parse_mozilla_query(query: &str) -> Result<Request> {
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == "emailaddress" {
            let email = urlencoding::decode(value)
                .map_err(|e| Error::InvalidRequest(format!("bad query string: {e}")))?;
            return Ok(Request::new(email.into_owned()));
        }
    }

    Err(Error::InvalidRequest(
        "missing emailaddress parameter".to_string(),
    ))
}

/// The client family an inbound request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFamily {
    /// Mozilla-style autoconfig (Thunderbird, Evolution, KMail).
    Autoconfig,
    /// Generic Outlook Autodiscover.
    Outlook,
    /// MobileSync Autodiscover (Windows Mail, mobile clients).
    ActiveSync,
}

impl ClientFamily {
    /// Pick the client family from the request host and, for
    /// autodiscover hosts, the request body's acceptable response
    /// schema.
    ///
    /// Returns `None` for hosts outside the `autoconfig.` /
    /// `autodiscover.` naming convention, and for autodiscover hosts
    /// without a request body.
    #[must_use]
    pub fn detect(host: &str, body: Option<&str>) -> Option<Self> {
        if host.starts_with("autoconfig.") {
            return Some(Self::Autoconfig);
        }

        if host.starts_with("autodiscover.") {
            let body = body?;
            return match parse_autodiscover_body(body) {
                Ok(parsed)
                    if parsed.response_schema.as_deref() == Some(MOBILESYNC_RESPONSE_SCHEMA) =>
                {
                    Some(Self::ActiveSync)
                }
                _ => Some(Self::Outlook),
            };
        }

        None
    }
}
