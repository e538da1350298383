//! # Issuance Configuration
//!
//! Parameters for generating identities: grid precision, proof security
//! parameter, nonce lifetime, and which commitment construction to use.
//!
//! Values come from serde (any format the caller chooses) or from the
//! process environment via [`IdentityConfig::from_env()`]:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TMESH_PRECISION_METERS` | `precision_meters` | `100.0` |
//! | `TMESH_SECURITY_BITS` | `security_bits` | `256` |
//! | `TMESH_NONCE_LIFETIME_SECS` | `nonce_lifetime_secs` | `3600` |
//! | `TMESH_COMMITMENT_SCHEME` | `commitment_scheme` | `self-blinded` |

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::geo::default_precision;

/// Default proof security parameter, in bits.
pub const DEFAULT_SECURITY_BITS: u32 = 256;

/// Smallest accepted proof security parameter, in bits.
pub const MIN_SECURITY_BITS: u32 = 80;

/// Largest accepted proof security parameter, in bits.
pub const MAX_SECURITY_BITS: u32 = 256;

/// How long an issued nonce stays valid, in seconds.
pub const DEFAULT_NONCE_LIFETIME_SECS: i64 = 3600;

/// Which location-commitment construction to use at issuance.
///
/// `SelfBlinded` reuses the identity's private scalar as the blinding term.
/// It is binding but not hiding: anyone holding the public key can test
/// candidate cells offline, and the accompanying location proof is
/// enumerable the same way. `RandomBlinded` draws an independent blinding
/// factor and salts the location proof with it, so neither the commitment
/// nor the proof in a published record can be matched against candidate
/// cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitmentMode {
    /// `C = x·G + H(cell)·G`.
    #[default]
    SelfBlinded,
    /// `C = H(cell)·G + r·H` with independent random `r`.
    RandomBlinded,
}

impl CommitmentMode {
    /// Stable identifier used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfBlinded => "self-blinded",
            Self::RandomBlinded => "random-blinded",
        }
    }
}

impl std::str::FromStr for CommitmentMode {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self-blinded" | "self_blinded" | "selfblinded" => Ok(Self::SelfBlinded),
            "random-blinded" | "random_blinded" | "randomblinded" => Ok(Self::RandomBlinded),
            other => Err(IdentityError::Config(format!(
                "unknown commitment scheme {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for CommitmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity issuance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Grid cell edge in meters.
    pub precision_meters: f64,
    /// Security parameter passed to the proof primitive.
    pub security_bits: u32,
    /// Nonce lifetime in seconds.
    pub nonce_lifetime_secs: i64,
    /// Commitment construction.
    pub commitment_scheme: CommitmentMode,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            precision_meters: default_precision(),
            security_bits: DEFAULT_SECURITY_BITS,
            nonce_lifetime_secs: DEFAULT_NONCE_LIFETIME_SECS,
            commitment_scheme: CommitmentMode::SelfBlinded,
        }
    }
}

impl IdentityConfig {
    /// Defaults overlaid with `TMESH_*` environment variables.
    pub fn from_env() -> Result<Self, IdentityError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values returned by `lookup`, then validated.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, IdentityError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("TMESH_PRECISION_METERS") {
            config.precision_meters = parse_var("TMESH_PRECISION_METERS", &raw)?;
        }
        if let Some(raw) = lookup("TMESH_SECURITY_BITS") {
            config.security_bits = parse_var("TMESH_SECURITY_BITS", &raw)?;
        }
        if let Some(raw) = lookup("TMESH_NONCE_LIFETIME_SECS") {
            config.nonce_lifetime_secs = parse_var("TMESH_NONCE_LIFETIME_SECS", &raw)?;
        }
        if let Some(raw) = lookup("TMESH_COMMITMENT_SCHEME") {
            config.commitment_scheme = raw.parse()?;
        }

        config.validate()?;
        tracing::debug!(
            precision_meters = config.precision_meters,
            security_bits = config.security_bits,
            nonce_lifetime_secs = config.nonce_lifetime_secs,
            commitment_scheme = %config.commitment_scheme,
            "identity configuration loaded"
        );
        Ok(config)
    }

    /// Reject values the issuer cannot work with.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if !self.precision_meters.is_finite() || self.precision_meters <= 0.0 {
            return Err(IdentityError::Config(format!(
                "precision_meters must be > 0, got {}",
                self.precision_meters
            )));
        }
        if !(MIN_SECURITY_BITS..=MAX_SECURITY_BITS).contains(&self.security_bits)
            || self.security_bits % 8 != 0
        {
            return Err(IdentityError::Config(format!(
                "security_bits must be a multiple of 8 in [{MIN_SECURITY_BITS}, {MAX_SECURITY_BITS}], got {}",
                self.security_bits
            )));
        }
        if self.nonce_lifetime_secs <= 0 {
            return Err(IdentityError::Config(format!(
                "nonce_lifetime_secs must be > 0, got {}",
                self.nonce_lifetime_secs
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, IdentityError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| IdentityError::Config(format!("{name}={raw:?}: {e}")))
}
