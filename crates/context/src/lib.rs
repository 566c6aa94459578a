//! Request-scoped types shared between the HTTP layer and its tests.

mod client_identity;

pub use client_identity::{ClientIdentity, common_name_from_dn};
