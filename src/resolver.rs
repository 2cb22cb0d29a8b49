//! Username resolution
//!
//! A server's login name is either a literal string or a pluggable
//! [`UsernameResolver`] strategy invoked per request. The built-in
//! resolver scans a Unix-style aliases file.

use crate::error::{Error, Result};
use crate::request::Request;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Where a server's login name comes from.
///
/// Exactly one of the two variants applies; absence of a username is
/// expressed by `Option<UsernameSource>` on the server.
#[derive(Debug, Clone)]
pub enum UsernameSource {
    /// A fixed login name.
    Literal(String),
    /// A strategy that derives the login name from the request.
    Resolver(Arc<dyn UsernameResolver>),
}

impl From<&str> for UsernameSource {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for UsernameSource {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Arc<dyn UsernameResolver>> for UsernameSource {
    fn from(value: Arc<dyn UsernameResolver>) -> Self {
        Self::Resolver(value)
    }
}

/// Strategy for deriving a login name from a request.
pub trait UsernameResolver: fmt::Debug + Send + Sync {
    /// Find the login name for the request, or `None` when the source
    /// has no usable entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing source cannot be read.
    fn find_username(&self, request: &Request) -> Result<Option<String>>;
}

/// Resolver backed by a Unix aliases file.
///
/// Scans the file for a `localpart: username` line. Alias values that
/// contain `@` or `,` point at remote addresses or multiple targets
/// and yield `None` rather than a login name.
///
/// The last resolved email/username pair is cached behind a mutex so
/// repeated lookups for the same request do not re-read the file. The
/// cache is an optimization only; evicting it never changes results.
#[derive(Debug)]
pub struct AliasesFileResolver {
    path: PathBuf,
    cache: Mutex<Option<(String, Option<String>)>>,
}

impl AliasesFileResolver {
    /// Default aliases file location on most Unix systems.
    pub const DEFAULT_PATH: &'static str = "/etc/mail/aliases";

    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }
}

impl Default for AliasesFileResolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

impl UsernameResolver for AliasesFileResolver {
    fn find_username(&self, request: &Request) -> Result<Option<String>> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some((email, username)) = cache.as_ref()
            && *email == request.email
        {
            debug!("alias cache hit for {}", request.email);
            return Ok(username.clone());
        }

        let localpart = request.localpart.as_deref().unwrap_or_default();
        let mut username = scan_aliases(&self.path, localpart)?;

        if username
            .as_deref()
            .is_some_and(|value| value.contains('@') || value.contains(','))
        {
            warn!(
                "alias for {} is not a plain local username, ignoring",
                localpart
            );
            username = None;
        }

        *cache = Some((request.email.clone(), username.clone()));
        Ok(username)
    }
}

fn scan_aliases(path: &Path, localpart: &str) -> Result<Option<String>> {
    let file = File::open(path).map_err(|source| Error::Resolver {
        path: path.display().to_string(),
        source,
    })?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| Error::Resolver {
            path: path.display().to_string(),
            source,
        })?;
        if let Some(value) = match_alias_line(&line, localpart) {
            return Ok(Some(value));
        }
    }

    Ok(None)
}

/// Match a `localpart: value` aliases line, whitespace-tolerant.
///
/// The value must be a single non-whitespace token.
fn match_alias_line(line: &str, localpart: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix(localpart)?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let value = rest.trim();

    if value.is_empty() || value.contains(char::is_whitespace) {
        return None;
    }

    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn aliases_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn request_for(email: &str) -> Request {
        let mut request = Request::new(email);
        request.expand().unwrap();
        request
    }

    #[test]
    fn resolves_plain_alias() {
        let file = aliases_file("postmaster: root\nalice: ajones\n");
        let resolver = AliasesFileResolver::new(file.path());

        let username = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap();
        assert_eq!(username.as_deref(), Some("ajones"));
    }

    #[test]
    fn tolerates_whitespace_around_colon() {
        let file = aliases_file("  alice  :   ajones  \n");
        let resolver = AliasesFileResolver::new(file.path());

        let username = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap();
        assert_eq!(username.as_deref(), Some("ajones"));
    }

    #[test]
    fn localpart_must_match_whole_key() {
        let file = aliases_file("alicette: other\n");
        let resolver = AliasesFileResolver::new(file.path());

        let username = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap();
        assert_eq!(username, None);
    }

    #[test]
    fn remote_alias_yields_none() {
        let file = aliases_file("alice: alice@elsewhere.net\n");
        let resolver = AliasesFileResolver::new(file.path());

        let username = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap();
        assert_eq!(username, None);
    }

    #[test]
    fn multi_target_alias_yields_none() {
        let file = aliases_file("alice: bob,carol\n");
        let resolver = AliasesFileResolver::new(file.path());

        let username = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap();
        assert_eq!(username, None);
    }

    #[test]
    fn missing_entry_yields_none() {
        let file = aliases_file("bob: bsmith\n");
        let resolver = AliasesFileResolver::new(file.path());

        let username = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap();
        assert_eq!(username, None);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let resolver = AliasesFileResolver::new("/nonexistent/aliases");

        let err = resolver
            .find_username(&request_for("alice@example.com"))
            .unwrap_err();
        assert!(matches!(err, Error::Resolver { .. }));
    }

    #[test]
    fn repeated_lookup_uses_cache() {
        let file = aliases_file("alice: ajones\n");
        let resolver = AliasesFileResolver::new(file.path());
        let request = request_for("alice@example.com");

        assert_eq!(
            resolver.find_username(&request).unwrap().as_deref(),
            Some("ajones")
        );

        // Rewrite the file; the cached pair for the same email wins.
        std::fs::write(file.path(), "alice: replaced\n").unwrap();
        assert_eq!(
            resolver.find_username(&request).unwrap().as_deref(),
            Some("ajones")
        );

        // A different email misses the cache and sees the new file.
        let other = request_for("alice@example.org");
        assert_eq!(
            resolver.find_username(&other).unwrap().as_deref(),
            Some("replaced")
        );
    }

    #[test]
    fn alias_line_match_rules() {
        assert_eq!(match_alias_line("alice: bob", "alice").as_deref(), Some("bob"));
        assert_eq!(match_alias_line("alice:bob", "alice").as_deref(), Some("bob"));
        assert_eq!(match_alias_line("alice bob", "alice"), None);
        assert_eq!(match_alias_line("alice: bob extra", "alice"), None);
        assert_eq!(match_alias_line("alice:", "alice"), None);
    }
}
