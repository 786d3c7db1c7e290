//! HTTP request handlers.

pub(crate) mod ai;
pub(crate) mod export;
pub(crate) mod health;

use axum::http::HeaderMap;
use diagen_ai::CredentialOverrides;

/// Collect per-provider credential overrides from request headers.
///
/// Header values that are not valid UTF-8 are ignored.
pub(crate) fn credential_overrides(headers: &HeaderMap) -> CredentialOverrides {
    CredentialOverrides::from_headers(|name| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use diagen_ai::AiProvider;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_credential_overrides_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-openai-key", HeaderValue::from_static("sk-user"));
        headers.insert(
            "x-anthropic-base-url",
            HeaderValue::from_static("https://claude.example.com/v1"),
        );

        let overrides = credential_overrides(&headers);
        let openai = overrides.get(AiProvider::OpenAi).unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-user"));
        assert_eq!(openai.base_url, None);

        let claude = overrides.get(AiProvider::Claude).unwrap();
        assert_eq!(claude.api_key, None);
        assert_eq!(
            claude.base_url.as_deref(),
            Some("https://claude.example.com/v1")
        );
        assert!(overrides.get(AiProvider::DeepSeek).is_none());
    }

    #[test]
    fn test_no_headers_no_overrides() {
        assert!(credential_overrides(&HeaderMap::new()).is_empty());
    }
}
