//! ID prefixes and generation.
//!
//! IDs look like `ins-a3f8b2c1`: a three-letter prefix naming the record kind
//! followed by eight lowercase hex characters.

use rand::Rng;

pub const PREFIX_SESSION: &str = "ses";
pub const PREFIX_INSPECTION: &str = "ins";
pub const PREFIX_TICKET: &str = "mnt";

/// Generate a prefixed ID from the thread-local RNG.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    generate_id_with(prefix, &mut rand::thread_rng())
}

/// Generate a prefixed ID from the given RNG.
pub fn generate_id_with<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    format!("{prefix}-{:08x}", rng.r#gen::<u32>())
}

/// Candidates [`fresh_id`] draws before giving up.
pub const MAX_ID_ATTEMPTS: usize = 16;

/// The first candidate from `next` that is not `taken`, or `None` once
/// [`MAX_ID_ATTEMPTS`] candidates were all taken.
pub fn fresh_id(mut next: impl FnMut() -> String, taken: impl Fn(&str) -> bool) -> Option<String> {
    std::iter::repeat_with(&mut next)
        .take(MAX_ID_ATTEMPTS)
        .find(|id| !taken(id.as_str()))
}
