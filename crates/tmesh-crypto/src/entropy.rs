//! # Entropy
//!
//! Every random value in the workspace comes from the operating system
//! CSPRNG through these helpers. Failure is reported, never panicked on.

use curve25519_dalek::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use tmesh_core::IdentityError;
use zeroize::Zeroize;

/// Fill `buf` from the OS CSPRNG.
///
/// # Errors
///
/// [`IdentityError::EntropyExhausted`] if the entropy source fails.
pub fn fill_random(buf: &mut [u8]) -> Result<(), IdentityError> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!(error = %e, "OS entropy source failed");
        IdentityError::EntropyExhausted(e.to_string())
    })
}

/// A uniformly random scalar (wide reduction of 64 random bytes).
pub fn random_scalar() -> Result<Scalar, IdentityError> {
    let mut wide = [0u8; 64];
    fill_random(&mut wide)?;
    let scalar = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    Ok(scalar)
}

/// A uniformly random non-zero scalar.
pub fn random_nonzero_scalar() -> Result<Scalar, IdentityError> {
    loop {
        let scalar = random_scalar()?;
        if scalar != Scalar::ZERO {
            return Ok(scalar);
        }
    }
}

/// A uniformly random `u32`.
pub fn random_u32() -> Result<u32, IdentityError> {
    let mut buf = [0u8; 4];
    fill_random(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}
