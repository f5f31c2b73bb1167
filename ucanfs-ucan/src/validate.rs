use std::{fmt::Display, time::SystemTime};

use ucanfs_did::KeyRegistry;

use crate::{unix_secs, Ucan};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The check a token failed during validation.
///
/// A failed check is an expected outcome, not an error. [`Ucan::is_valid`] folds all of these into
/// `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The current time is before the token's `nbf`.
    NotYetValid {
        /// The token's not-before time.
        not_before: u64,
        /// The time validation ran at.
        now: u64,
    },

    /// The current time is at or after the token's `exp`.
    Expired {
        /// The token's expiration time.
        expiration: u64,
        /// The time validation ran at.
        now: u64,
    },

    /// The issuer DID does not encode a key type the registry knows.
    UnknownIssuerKey(String),

    /// The header algorithm differs from the one registered for the issuer's key type.
    AlgorithmMismatch {
        /// The algorithm registered for the issuer's key type.
        expected: String,
        /// The algorithm named in the token header.
        found: String,
    },

    /// The signature does not verify over the signed data.
    BadSignature,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Ucan {
    /// Checks the token's time bounds, algorithm and signature at `now`.
    ///
    /// The signature is checked over the exact `header.payload` string the token was decoded from.
    pub fn check_validity(
        &self,
        registry: &KeyRegistry,
        now: SystemTime,
    ) -> Result<(), ValidationFailure> {
        let now = unix_secs(now);

        if let Some(not_before) = self.not_before() {
            if now < not_before {
                return Err(ValidationFailure::NotYetValid { not_before, now });
            }
        }

        if let Some(expiration) = self.expiration() {
            if now >= expiration {
                return Err(ValidationFailure::Expired { expiration, now });
            }
        }

        let key = registry
            .recover(self.issuer())
            .map_err(|e| ValidationFailure::UnknownIssuerKey(e.to_string()))?;

        if key.algorithm != self.header().alg() {
            return Err(ValidationFailure::AlgorithmMismatch {
                expected: key.algorithm,
                found: self.header().alg().to_string(),
            });
        }

        if !registry.verify(
            &key.key_type,
            self.signed_data().as_bytes(),
            &key.public_key,
            self.signature().as_bytes(),
        ) {
            return Err(ValidationFailure::BadSignature);
        }

        Ok(())
    }

    /// Returns `true` if the token is valid at `now`.
    pub fn is_valid_at(&self, registry: &KeyRegistry, now: SystemTime) -> bool {
        match self.check_validity(registry, now) {
            Ok(()) => true,
            Err(failure) => {
                tracing::debug!(cid = %self.cid(), %failure, "token failed validation");
                false
            }
        }
    }

    /// Returns `true` if the token is valid now.
    pub fn is_valid(&self, registry: &KeyRegistry) -> bool {
        self.is_valid_at(registry, SystemTime::now())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotYetValid { not_before, now } => {
                write!(f, "not valid before {not_before} (now {now})")
            }
            Self::Expired { expiration, now } => write!(f, "expired at {expiration} (now {now})"),
            Self::UnknownIssuerKey(reason) => write!(f, "unknown issuer key: {reason}"),
            Self::AlgorithmMismatch { expected, found } => {
                write!(f, "algorithm mismatch: issuer uses {expected}, header says {found}")
            }
            Self::BadSignature => write!(f, "bad signature"),
        }
    }
}

impl std::error::Error for ValidationFailure {}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use base64::prelude::{Engine, BASE64_URL_SAFE_NO_PAD};
    use ucanfs_did::Did;
    use ucanfs_key::{Ed25519KeyPair, KeyPairGenerate, RsaKeyPair};

    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test_log::test]
    fn test_ucan_valid_within_time_bounds() -> anyhow::Result<()> {
        let registry = KeyRegistry::default();
        let key = Ed25519KeyPair::generate(&mut rand::thread_rng())?;

        let ucan = Ucan::builder()
            .audience(Did::from_key(&key)?)
            .not_before(at(100))
            .expiration(at(200))
            .sign(&key)?;

        assert!(ucan.is_valid_at(&registry, at(100)));
        assert!(ucan.is_valid_at(&registry, at(199)));
        assert_eq!(
            ucan.check_validity(&registry, at(99)),
            Err(ValidationFailure::NotYetValid {
                not_before: 100,
                now: 99
            })
        );
        assert_eq!(
            ucan.check_validity(&registry, at(200)),
            Err(ValidationFailure::Expired {
                expiration: 200,
                now: 200
            })
        );

        Ok(())
    }

    #[test_log::test]
    fn test_ucan_expired_is_invalid_even_with_bad_signature() -> anyhow::Result<()> {
        let registry = KeyRegistry::default();
        let key = Ed25519KeyPair::generate(&mut rand::thread_rng())?;

        let ucan = Ucan::builder()
            .audience(Did::from_key(&key)?)
            .expiration(at(50))
            .sign(&key)?;

        let forged = Ucan::decode(&format!("{}.AAAA", ucan.signed_data()))?;

        assert!(!ucan.is_valid(&registry));
        assert!(matches!(
            forged.check_validity(&registry, at(60)),
            Err(ValidationFailure::Expired { .. })
        ));
        assert_eq!(
            forged.check_validity(&registry, at(10)),
            Err(ValidationFailure::BadSignature)
        );

        Ok(())
    }

    #[test_log::test]
    fn test_ucan_algorithm_mismatch() -> anyhow::Result<()> {
        let registry = KeyRegistry::default();
        let key = Ed25519KeyPair::generate(&mut rand::thread_rng())?;

        let ucan = Ucan::builder()
            .audience(Did::from_key(&key)?)
            .sign(&key)?;

        // Same payload and signature, header claims RS256.
        let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT","ucv":"0.8.1"}"#);
        let (_, payload) = ucan
            .signed_data()
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("no payload"))?;
        let tampered = Ucan::decode(&format!("{header}.{payload}.{}", ucan.signature()))?;

        assert!(ucan.is_valid(&registry));
        assert!(!tampered.is_valid(&registry));
        assert_eq!(
            tampered.check_validity(&registry, SystemTime::now()),
            Err(ValidationFailure::AlgorithmMismatch {
                expected: "EdDSA".to_string(),
                found: "RS256".to_string()
            })
        );

        Ok(())
    }

    #[test_log::test]
    fn test_ucan_rsa_issuer() -> anyhow::Result<()> {
        let registry = KeyRegistry::default();
        let key = RsaKeyPair::generate_with_bits(&mut rand::thread_rng(), 1024)?;

        let ucan = Ucan::builder()
            .audience(Did::from_key(&key)?)
            .sign(&key)?;

        assert!(ucan.is_valid(&registry));
        assert!(!ucan.is_valid(&KeyRegistry::empty()));
        assert!(matches!(
            ucan.check_validity(&KeyRegistry::empty(), SystemTime::now()),
            Err(ValidationFailure::UnknownIssuerKey(_))
        ));

        Ok(())
    }

    #[test_log::test]
    fn test_ucan_tampered_payload() -> anyhow::Result<()> {
        let registry = KeyRegistry::default();
        let mut rng = rand::thread_rng();
        let key = Ed25519KeyPair::generate(&mut rng)?;
        let other = Did::from_key(&Ed25519KeyPair::generate(&mut rng)?)?;

        let ucan = Ucan::builder()
            .audience(Did::from_key(&key)?)
            .sign(&key)?;
        let other_ucan = Ucan::builder().audience(other).sign(&key)?;

        let (header, _) = ucan
            .signed_data()
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("no header"))?;
        let (_, other_payload) = other_ucan
            .signed_data()
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("no payload"))?;
        let spliced = Ucan::decode(&format!("{header}.{other_payload}.{}", ucan.signature()))?;

        assert!(!spliced.is_valid(&registry));

        Ok(())
    }
}
