//! Client identity from the certificate headers set by the mTLS-terminating proxy.
//!
//! The proxy verifies the client certificate and forwards the outcome in
//! `x-ssl-client-verify`, together with the certificate attributes. This module
//! trusts those headers as-is: anything reaching the service directly, without
//! going through the proxy, can forge them.

mod error;

use axum::extract::FromRequestParts;
use context::ClientIdentity;
use http::{HeaderMap, request::Parts};

pub use error::IdentityError;

pub const CLIENT_VERIFY: &str = "x-ssl-client-verify";
pub const CLIENT_SUBJECT_DN: &str = "x-ssl-client-s-dn";
pub const CLIENT_ISSUER_DN: &str = "x-ssl-client-i-dn";
pub const CLIENT_SERIAL: &str = "x-ssl-client-serial";
pub const CLIENT_FINGERPRINT: &str = "x-ssl-client-fingerprint";

const VERIFY_SUCCESS: &str = "SUCCESS";

/// Build the client identity from the forwarded certificate headers.
///
/// Fails unless the verify header is `SUCCESS`, in any case. The attribute
/// headers are optional and copied verbatim.
pub fn extract(headers: &HeaderMap) -> Result<ClientIdentity, IdentityError> {
    let verified = header_str(headers, CLIENT_VERIFY)
        .is_some_and(|value| value.to_ascii_uppercase() == VERIFY_SUCCESS);

    if !verified {
        return Err(IdentityError::Unauthorized);
    }

    Ok(ClientIdentity::from_certificate(
        header_string(headers, CLIENT_SUBJECT_DN),
        header_string(headers, CLIENT_ISSUER_DN),
        header_string(headers, CLIENT_SERIAL),
        header_string(headers, CLIENT_FINGERPRINT),
    ))
}

/// Extractor for handlers that require a verified client.
///
/// Rejects the request with a 401 when the proxy did not verify a certificate.
#[derive(Debug, Clone)]
pub struct VerifiedClient(pub ClientIdentity);

impl<S> FromRequestParts<S> for VerifiedClient
where
    S: Send + Sync,
{
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract(&parts.headers).map(Self)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Attribute values may carry UTF-8 (e.g. a DN with accented names), which
/// `HeaderValue::to_str` rejects. Only invalid UTF-8 is dropped.
fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .map(str::to_owned)
}
