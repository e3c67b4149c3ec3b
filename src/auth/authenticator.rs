//! Token authenticator implementation
//!
//! Applies the API token to outgoing requests.

use reqwest::RequestBuilder;

/// Header carrying the API token on every request
pub const TOKEN_HEADER: &str = "X-TrackerToken";

/// Authenticator that sets the `X-TrackerToken` header
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    token: String,
}

impl TokenAuthenticator {
    /// Create a new authenticator with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Attach the token header to an outgoing request
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(TOKEN_HEADER, &self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_token_header() {
        let auth = TokenAuthenticator::new("secret-token");
        let client = reqwest::Client::new();
        let req = auth
            .apply(client.get("https://example.com/projects"))
            .build()
            .unwrap();

        assert_eq!(
            req.headers().get(TOKEN_HEADER).unwrap().to_str().unwrap(),
            "secret-token"
        );
    }

    #[test]
    fn test_token_header_is_not_bearer() {
        let auth = TokenAuthenticator::new("secret-token");
        let client = reqwest::Client::new();
        let req = auth
            .apply(client.get("https://example.com/projects"))
            .build()
            .unwrap();

        assert!(req.headers().get("Authorization").is_none());
    }
}
