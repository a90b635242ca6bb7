//! Backend target addresses.
//!
//! # Responsibilities
//! - Parse configured targets (`http://host:port` or bare `host:port`)
//! - Provide the authority used for the rewritten `Host` header
//! - Build outbound URIs for forwarded paths

use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderValue, Uri};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Reasons a configured target is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid target {target:?}: {reason}")]
    Malformed { target: String, reason: String },

    #[error("target {target:?} uses unsupported scheme {scheme:?}; only http is supported")]
    UnsupportedScheme { target: String, scheme: String },

    #[error("target {0:?} has no host")]
    MissingHost(String),

    #[error("target {0:?} must not carry a path, query, fragment or credentials")]
    UnexpectedComponent(String),
}

/// A validated backend address.
#[derive(Debug, Clone)]
pub struct BackendTarget {
    authority: Authority,
    host_header: HeaderValue,
}

impl BackendTarget {
    /// Parse a configured target.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let malformed = |reason: String| TargetError::Malformed {
            target: raw.to_string(),
            reason,
        };

        let url = Url::parse(&candidate).map_err(|e| malformed(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(TargetError::UnsupportedScheme {
                target: raw.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetError::MissingHost(raw.to_string()))?;

        let has_path = !(url.path().is_empty() || url.path() == "/");
        let has_credentials = !url.username().is_empty() || url.password().is_some();
        if has_path || has_credentials || url.query().is_some() || url.fragment().is_some() {
            return Err(TargetError::UnexpectedComponent(raw.to_string()));
        }

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| malformed(e.to_string()))?;
        let host_header =
            HeaderValue::from_str(authority.as_str()).map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            authority,
            host_header,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Value for the rewritten `Host` header.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Absolute URI for a forwarded path (with optional query).
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, axum::http::Error> {
        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl std::fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}", self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_and_bare_forms() {
        let url = BackendTarget::parse("http://localhost:8084").unwrap();
        assert_eq!(url.authority().as_str(), "localhost:8084");
        assert_eq!(url.host_header(), "localhost:8084");

        let bare = BackendTarget::parse("127.0.0.1:8082").unwrap();
        assert_eq!(bare.authority().as_str(), "127.0.0.1:8082");
        assert_eq!(bare.to_string(), "http://127.0.0.1:8082");

        let trailing = BackendTarget::parse("http://auth-service:8080/").unwrap();
        assert_eq!(trailing.authority().as_str(), "auth-service:8080");
    }

    #[test]
    fn default_port_is_omitted_from_authority() {
        let target = BackendTarget::parse("http://backend").unwrap();
        assert_eq!(target.authority().as_str(), "backend");
        let target = BackendTarget::parse("http://backend:80").unwrap();
        assert_eq!(target.authority().as_str(), "backend");
    }

    #[test]
    fn rejects_unsupported_targets() {
        assert!(matches!(
            BackendTarget::parse("https://secure:443"),
            Err(TargetError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            BackendTarget::parse("http://backend:8080/api"),
            Err(TargetError::UnexpectedComponent(_))
        ));
        assert!(matches!(
            BackendTarget::parse("http://user:pw@backend:8080"),
            Err(TargetError::UnexpectedComponent(_))
        ));
        assert!(matches!(
            BackendTarget::parse("http://backend:99999"),
            Err(TargetError::Malformed { .. })
        ));
        assert!(BackendTarget::parse("").is_err());
    }

    #[test]
    fn builds_forwarded_uri() {
        let target = BackendTarget::parse("localhost:8082").unwrap();
        let uri = target.uri_for("/update?draft=true").unwrap();
        assert_eq!(uri.to_string(), "http://localhost:8082/update?draft=true");
    }
}
