//! Request orchestration
//!
//! Drives one configuration request through its four steps: parse
//! (done by the caller, per client family), expand the email, resolve
//! the provider, and hand off to a protocol writer. Provider
//! resolution is memoized per exact email string in a cache owned by
//! the request-scoped [`RequestHandler`], so the memory lives and
//! dies with the request.

use crate::error::{Error, Result};
use crate::provider::{ProviderConfig, ProviderRegistry};
use crate::request::Request;
use tracing::{debug, info};

/// Produces the provider registry for the current request.
///
/// The registry is rebuilt per request so operator settings can vary
/// with the requested email, domain, or localpart.
pub trait ConfigSource {
    /// Build the registry for this request.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings cannot be read or contain
    /// an unrecognized server type.
    fn load(&self, request: &Request) -> Result<ProviderRegistry>;
}

/// One protocol family's response generator.
pub trait ResponseWriter {
    /// MIME type of the emitted document.
    fn content_type(&self) -> &'static str;

    /// Produce the complete XML document for a resolved provider.
    ///
    /// # Errors
    ///
    /// Returns an error when username resolution or XML emission
    /// fails. No partial document is ever returned.
    fn write(&self, provider: &ProviderConfig, request: &Request) -> Result<String>;
}

/// A finished response: content type plus document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub content_type: &'static str,
    pub body: String,
}

/// Request-scoped orchestrator with a single-entry provider cache.
pub struct RequestHandler<'a, S: ConfigSource + ?Sized> {
    source: &'a S,
    cache: Option<(String, ProviderConfig)>,
}

impl<'a, S: ConfigSource + ?Sized> RequestHandler<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Resolve the provider for the request's domain, memoized by the
    /// exact email string.
    ///
    /// # Errors
    ///
    /// Fails when the request has not been expanded, the settings
    /// cannot be loaded, or no provider covers the domain.
    pub fn resolve_provider(&mut self, request: &Request) -> Result<&ProviderConfig> {
        let cached = matches!(&self.cache, Some((email, _)) if *email == request.email);

        if !cached {
            let domain = request.domain.as_deref().ok_or_else(|| {
                Error::InvalidRequest("request has no domain; expand it first".to_string())
            })?;

            let registry = self.source.load(request)?;
            let provider = registry.resolve(domain)?.clone();
            debug!("resolved provider '{}' for domain {}", provider.id, domain);
            self.cache = Some((request.email.clone(), provider));
        }

        let Some((_, provider)) = &self.cache else {
            return Err(Error::InvalidRequest(
                "provider resolution cache is empty".to_string(),
            ));
        };
        Ok(provider)
    }

    /// Run a parsed request to completion through `writer`.
    ///
    /// # Errors
    ///
    /// Propagates expansion, resolution, and writing failures; no
    /// partial output is produced on error.
    pub fn handle(&mut self, writer: &dyn ResponseWriter, mut request: Request) -> Result<Response> {
        request.expand()?;
        let provider = self.resolve_provider(&request)?;
        let body = writer.write(provider, &request)?;
        info!(
            "generated {} response for {}",
            writer.content_type(),
            request.email
        );

        Ok(Response {
            content_type: writer.content_type(),
            body,
        })
    }
}
