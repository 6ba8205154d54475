use serde::Deserialize;
use url::Url;

use crate::error::Error;

/// OpenID Provider configuration.
///
/// The only required field is the client identifier — it is a constructor
/// parameter, so a missing one is a compile error rather than a runtime one.
/// The authorization endpoint may come from static configuration or from a
/// provider metadata document; see [`ProviderConfig::authorization_endpoint`].
///
/// ```rust,ignore
/// use oidc_gate::ProviderConfig;
///
/// let provider = ProviderConfig::new("my-client-id")
///     .with_authorization_endpoint("https://op.example.com/authorize".parse()?);
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub(crate) client_id: String,
    pub(crate) authorization_endpoint: Option<Url>,
    pub(crate) scopes: Vec<String>,
    pub(crate) metadata: Option<ProviderMetadata>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            authorization_endpoint: None,
            scopes: vec!["openid".into(), "email".into()],
            metadata: None,
        }
    }

    /// Pin the authorization endpoint statically. Takes precedence over
    /// anything a metadata document says.
    #[must_use]
    pub fn with_authorization_endpoint(mut self, url: Url) -> Self {
        self.authorization_endpoint = Some(url);
        self
    }

    /// Override the requested scopes (default: `["openid", "email"]`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Supply a provider metadata document to fall back on for endpoints
    /// that are not statically configured.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Resolve the authorization endpoint: static configuration first, then
    /// the metadata document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when neither source supplies one.
    pub fn authorization_endpoint(&self) -> Result<&Url, Error> {
        self.authorization_endpoint
            .as_ref()
            .or_else(|| {
                self.metadata
                    .as_ref()
                    .and_then(|m| m.authorization_endpoint.as_ref())
            })
            .ok_or_else(|| {
                Error::Config(
                    "authorization endpoint is not configured and provider metadata does not supply one"
                        .into(),
                )
            })
    }

    /// Assemble the authorization request URL.
    ///
    /// `extra` carries extension parameters; `nonce` is appended last, only
    /// when nonce mode produced one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no authorization endpoint resolves.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        nonce: Option<&str>,
        extra: &[(String, String)],
    ) -> Result<String, Error> {
        let mut url = self.authorization_endpoint()?.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("response_type", "code")
                .append_pair("scope", &self.scopes.join(" "))
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("state", state);
            for (key, value) in extra {
                pairs.append_pair(key, value);
            }
            if let Some(nonce) = nonce {
                pairs.append_pair("nonce", nonce);
            }
        }
        Ok(url.into())
    }
}

/// The subset of the provider's published
/// `.well-known/openid-configuration` document a relying party consumes.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct ProviderMetadata {
    pub issuer: String,
    #[serde(default)]
    pub authorization_endpoint: Option<Url>,
    #[serde(default)]
    pub token_endpoint: Option<Url>,
    #[serde(default)]
    pub userinfo_endpoint: Option<Url>,
    #[serde(default)]
    pub end_session_endpoint: Option<Url>,
    #[serde(default)]
    pub jwks_uri: Option<Url>,
}

impl ProviderMetadata {
    /// Fetch the provider's discovery document from
    /// `{issuer}/.well-known/openid-configuration`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// when the endpoint answers with a non-success status.
    pub async fn discover(http: &reqwest::Client, issuer: &Url) -> Result<Self, Error> {
        let url = format!(
            "{}/.well-known/openid-configuration",
            issuer.as_str().trim_end_matches('/')
        );
        let response = http.get(url).send().await?;
        let response = ensure_success(response, "provider discovery").await?;
        response.json::<Self>().await.map_err(Into::into)
    }
}

/// Checks HTTP response status; returns the response on success or an error
/// with details.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let detail = response.text().await.unwrap_or_default();
    Err(Error::Provider {
        operation,
        status: Some(status),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> ProviderConfig {
        ProviderConfig::new("test-client")
            .with_authorization_endpoint("https://op.example.com/authorize".parse().unwrap())
    }

    fn test_metadata() -> ProviderMetadata {
        serde_json::from_value(serde_json::json!({
            "issuer": "https://op.example.com",
            "authorization_endpoint": "https://op.example.com/from-metadata",
            "end_session_endpoint": "https://op.example.com/logout",
        }))
        .unwrap()
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = test_provider()
            .authorization_url("https://rp.example.com/oidc/callback", "st4te", Some("n0nce"), &[])
            .unwrap();

        assert!(url.starts_with("https://op.example.com/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Frp.example.com%2Foidc%2Fcallback"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("nonce=n0nce"));
    }

    #[test]
    fn test_authorization_url_without_nonce() {
        let url = test_provider()
            .authorization_url("https://rp.example.com/cb", "s", None, &[])
            .unwrap();
        assert!(!url.contains("nonce="));
    }

    #[test]
    fn test_authorization_url_extra_params() {
        let extra = vec![("audience".to_string(), "some-api.example.com".to_string())];
        let url = test_provider()
            .authorization_url("https://rp.example.com/cb", "s", None, &extra)
            .unwrap();
        assert!(url.contains("audience=some-api.example.com"));
    }

    #[test]
    fn test_custom_scopes() {
        let provider = test_provider().with_scopes(vec!["openid".into(), "profile".into()]);
        let url = provider
            .authorization_url("https://rp.example.com/cb", "s", None, &[])
            .unwrap();
        assert!(url.contains("scope=openid+profile"));
    }

    #[test]
    fn test_endpoint_resolution_prefers_static() {
        let provider = test_provider().with_metadata(test_metadata());
        assert_eq!(
            provider.authorization_endpoint().unwrap().as_str(),
            "https://op.example.com/authorize"
        );
    }

    #[test]
    fn test_endpoint_resolution_falls_back_to_metadata() {
        let provider = ProviderConfig::new("test-client").with_metadata(test_metadata());
        assert_eq!(
            provider.authorization_endpoint().unwrap().as_str(),
            "https://op.example.com/from-metadata"
        );
    }

    #[test]
    fn test_endpoint_resolution_unconfigured_is_config_error() {
        let provider = ProviderConfig::new("test-client");
        assert!(matches!(
            provider.authorization_endpoint(),
            Err(Error::Config(_))
        ));
    }
}
