//! JSON settings file loading
//!
//! The operator describes providers, servers, and endpoints in a JSON
//! settings file. The file is re-read for every request and turned
//! into a [`ProviderRegistry`], with ISPDB-style placeholders in
//! literal usernames (`%EMAILLOCALPART%`, `%EMAILADDRESS%`,
//! `%EMAILDOMAIN%`) substituted from the request before the registry
//! is built.

use crate::error::Result;
use crate::handler::ConfigSource;
use crate::provider::ProviderRegistry;
use crate::request::Request;
use crate::resolver::{AliasesFileResolver, UsernameResolver, UsernameSource};
use crate::server::{AUTH_PASSWORD_CLEARTEXT, ServerType};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SettingsFile {
    providers: Vec<ProviderSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProviderSettings {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    name_short: String,
    domains: Vec<String>,
    #[serde(default)]
    username: Option<UsernameSetting>,
    #[serde(default)]
    servers: Vec<ServerSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ServerSettings {
    #[serde(rename = "type")]
    server_type: String,
    hostname: String,
    #[serde(default)]
    username: Option<UsernameSetting>,
    #[serde(default = "default_same_password")]
    same_password: bool,
    endpoints: Vec<EndpointSettings>,
}

const fn default_same_password() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EndpointSettings {
    socket_type: String,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    authentication: Option<String>,
}

/// A username is either a literal (with optional placeholders) or a
/// reference to an aliases file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UsernameSetting {
    Literal(String),
    AliasesFile {
        #[serde(rename = "aliasesFile")]
        aliases_file: PathBuf,
    },
}

impl UsernameSetting {
    fn resolve(&self, request: &Request) -> UsernameSource {
        match self {
            Self::Literal(template) => {
                UsernameSource::Literal(substitute_placeholders(template, request))
            }
            Self::AliasesFile { aliases_file } => {
                let resolver: Arc<dyn UsernameResolver> =
                    Arc::new(AliasesFileResolver::new(aliases_file.clone()));
                UsernameSource::Resolver(resolver)
            }
        }
    }
}

fn substitute_placeholders(template: &str, request: &Request) -> String {
    template
        .replace("%EMAILADDRESS%", &request.email)
        .replace(
            "%EMAILLOCALPART%",
            request.localpart.as_deref().unwrap_or_default(),
        )
        .replace(
            "%EMAILDOMAIN%",
            request.domain.as_deref().unwrap_or_default(),
        )
}

/// [`ConfigSource`] backed by a JSON settings file.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    path: PathBuf,
}

impl JsonSettings {
    /// Environment variable naming the settings file.
    pub const PATH_VAR: &'static str = "AUTOCONFIG_SETTINGS";

    const DEFAULT_PATH: &'static str = "./autoconfig.settings.json";

    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the settings file via `AUTOCONFIG_SETTINGS`, reading a
    /// `.env` file if present, falling back to
    /// `./autoconfig.settings.json`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::new(env::var(Self::PATH_VAR).unwrap_or_else(|_| Self::DEFAULT_PATH.to_string()))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for JsonSettings {
    fn load(&self, request: &Request) -> Result<ProviderRegistry> {
        debug!("loading settings from {}", self.path.display());
        let data = std::fs::read_to_string(&self.path)?;
        let file: SettingsFile = serde_json::from_str(&data)?;
        build_registry(&file, request)
    }
}

fn build_registry(file: &SettingsFile, request: &Request) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    for provider_settings in &file.providers {
        let provider = registry.register(provider_settings.id.clone());
        provider
            .with_display_name(&provider_settings.name, &provider_settings.name_short)
            .with_domains(provider_settings.domains.iter().cloned());

        if let Some(username) = &provider_settings.username {
            provider.with_username(username.resolve(request));
        }

        for server_settings in &provider_settings.servers {
            let server_type = ServerType::parse(&server_settings.server_type)?;
            let server = provider.add_server(server_type, &server_settings.hostname);

            if let Some(username) = &server_settings.username {
                server.with_username(username.resolve(request));
            }

            if !server_settings.same_password {
                server.with_different_password();
            }

            for endpoint in &server_settings.endpoints {
                server.add_endpoint(
                    &endpoint.socket_type,
                    endpoint.port,
                    endpoint
                        .authentication
                        .as_deref()
                        .unwrap_or(AUTH_PASSWORD_CLEARTEXT),
                );
            }
        }
    }

    Ok(registry)
}
