//! Identifier generation for emulated resources.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use uuid::Uuid;

/// Upper bound for numeric permission ids (twenty decimal digits).
const PERMISSION_ID_MODULUS: u128 = 100_000_000_000_000_000_000;

/// Generate a fresh opaque id: a random UUID encoded as unpadded base64url.
pub fn new_id() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

/// Deterministic permission id for an email address or domain.
///
/// Case and surrounding whitespace are ignored, so `Fred@Example.org` and
/// `fred@example.org` share an id.
pub fn permission_id_for(email: &str) -> String {
    let normalized = email.trim().to_ascii_lowercase();
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, normalized.as_bytes());
    format!("{:020}", uuid.as_u128() % PERMISSION_ID_MODULUS)
}
