//! Provider data model and registry
//!
//! A [`ProviderConfig`] is one organization's mail setup: the domains
//! it covers, its display names, and an ordered list of servers. The
//! [`ProviderRegistry`] holds every configured provider and resolves
//! a domain to the first provider covering it.
//!
//! Both are built once per request by a configuration source and are
//! treated as immutable afterwards. Configuration authors must keep
//! domain sets disjoint; with overlapping sets the first registered
//! provider wins.

use crate::error::{Error, Result};
use crate::resolver::UsernameSource;
use crate::server::{Server, ServerType};

/// One provider's mail configuration.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    pub name_short: String,
    pub domains: Vec<String>,
    pub username: Option<UsernameSource>,
    pub servers: Vec<Server>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the display name and short name shown to autoconfig
    /// clients.
    pub fn with_display_name(
        &mut self,
        name: impl Into<String>,
        name_short: impl Into<String>,
    ) -> &mut Self {
        self.name = name.into();
        self.name_short = name_short.into();
        self
    }

    /// Set the lowercase domains this configuration applies to.
    pub fn with_domains<I, S>(&mut self, domains: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default username applied to servers added afterwards.
    pub fn with_username(&mut self, username: impl Into<UsernameSource>) -> &mut Self {
        self.username = Some(username.into());
        self
    }

    /// Append a server of the given type, inheriting the provider's
    /// default username, and return it for fluent endpoint setup.
    pub fn add_server(&mut self, server_type: ServerType, hostname: &str) -> &mut Server {
        let mut server = Server::new(server_type, hostname);
        server.username = self.username.clone();

        let index = self.servers.len();
        self.servers.push(server);
        &mut self.servers[index]
    }
}

/// All configured providers for the current request.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderConfig>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new provider under `id` and return it for fluent
    /// configuration.
    pub fn register(&mut self, id: impl Into<String>) -> &mut ProviderConfig {
        let index = self.providers.len();
        self.providers.push(ProviderConfig::new(id));
        &mut self.providers[index]
    }

    /// Resolve a (lowercased) domain to the first provider covering
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no provider lists the domain.
    pub fn resolve(&self, domain: &str) -> Result<&ProviderConfig> {
        self.providers
            .iter()
            .find(|provider| provider.domains.iter().any(|d| d == domain))
            .ok_or_else(|| Error::NotFound(domain.to_string()))
    }

    /// All registered providers, in registration order.
    #[must_use]
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }
}
