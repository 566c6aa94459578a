//! JSON endpoints backed by the client certificate identity.

use std::fmt::{self, Display};

use axum::Json;
use context::ClientIdentity;
use serde::Serialize;

use crate::identity::VerifiedClient;

#[derive(Debug, Serialize)]
pub(crate) struct ProtectedResponse {
    ok: bool,
    message: String,
    identity: ClientIdentity,
}

/// Audit line for a call to the protected endpoint.
struct AuthRecord<'a>(&'a ClientIdentity);

impl Display for AuthRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = self.0;

        write!(
            f,
            "[AUTH] user={} serial={} issuer={} subject={}",
            identity.display_name(),
            or_dash(identity.serial.as_deref()),
            or_dash(identity.issuer_dn.as_deref()),
            or_dash(identity.subject_dn.as_deref()),
        )
    }
}

/// Return the verified client identity.
pub(crate) async fn me(VerifiedClient(identity): VerifiedClient) -> Json<ClientIdentity> {
    Json(identity)
}

/// Greet the verified client and record who called.
pub(crate) async fn protected(VerifiedClient(identity): VerifiedClient) -> Json<ProtectedResponse> {
    log::info!("{}", AuthRecord(&identity));

    Json(ProtectedResponse {
        ok: true,
        message: format!("Hello, {}", identity.display_name()),
        identity,
    })
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
