//! Sealed-value format versions
//!
//! The version number is written in front of every sealed value; the key
//! derivation parameters it stands for live only here.
//! - Version 1: PBKDF2-HMAC-SHA256, 100,000 iterations

/// Version 1: PBKDF2-HMAC-SHA256, 100,000 iterations
const VERSION_1_ITERATIONS: u32 = 100_000;

/// Version written by [`seal`](super::seal).
pub const CURRENT_SEAL_VERSION: u32 = 1;

/// Iteration count for the current version, resolved at compile time.
///
/// # Panics
/// Fails the build, not the program, when `CURRENT_SEAL_VERSION` is unknown.
#[allow(clippy::panic)]
pub const fn current_iterations() -> u32 {
    match pbkdf2_iterations(CURRENT_SEAL_VERSION) {
        Some(iterations) => iterations,
        None => panic!("Invalid CURRENT_SEAL_VERSION"),
    }
}

/// PBKDF2 iteration count for a sealed-value version, `None` when unsupported.
pub const fn pbkdf2_iterations(version: u32) -> Option<u32> {
    match version {
        1 => Some(VERSION_1_ITERATIONS),
        _ => None,
    }
}
