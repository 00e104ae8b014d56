use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderName;
use axum::http::request::Parts;

/// Header carrying the handshake secret in both directions.
pub const HOOK_SECRET_HEADER: HeaderName = HeaderName::from_static("x-hook-secret");

/// The `X-Hook-Secret` value presented by a webhook sender.
///
/// Never rejects: an absent, empty or undecodable header extracts as `None`,
/// leaving the decision to the admission gate.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSecret(pub Option<String>);

impl HookSecret {
    /// Returns the presented secret, if any.
    #[inline]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for HookSecret
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(&HOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(str::to_owned);

        Ok(Self(secret))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, Request};

    use super::*;

    async fn extract(value: Option<HeaderValue>) -> anyhow::Result<HookSecret> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(HOOK_SECRET_HEADER, value);
        }

        let (mut parts, ()) = builder.body(())?.into_parts();
        Ok(HookSecret::from_request_parts(&mut parts, &()).await?)
    }

    #[tokio::test]
    async fn missing_and_empty_headers_are_none() -> anyhow::Result<()> {
        assert_eq!(extract(None).await?, HookSecret(None));
        assert_eq!(
            extract(Some(HeaderValue::from_static(""))).await?,
            HookSecret(None)
        );
        Ok(())
    }

    #[tokio::test]
    async fn present_header_is_extracted() -> anyhow::Result<()> {
        let secret = extract(Some(HeaderValue::from_static("abc123"))).await?;
        assert_eq!(secret.as_deref(), Some("abc123"));
        Ok(())
    }

    #[tokio::test]
    async fn non_ascii_header_is_none() -> anyhow::Result<()> {
        let value = HeaderValue::from_bytes(b"caf\xe9")?;
        assert_eq!(extract(Some(value)).await?, HookSecret(None));
        Ok(())
    }
}
