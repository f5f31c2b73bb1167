use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use ucanfs_did::Did;
use ucanfs_key::{GetKeyType, JwsAlgName, PublicKeyBytes, Sign};

use crate::{
    Capability, Fact, ProofReference, Ucan, UcanError, UcanFacts, UcanHeader, UcanPayload,
    UcanResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The lifetime given to a token when no expiration is set.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(30);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A builder for creating UCAN (User-Controlled Authorization Network) tokens.
///
/// The issuer is derived from the signing key, so only the audience must be set before signing.
pub struct UcanBuilder<A = ()> {
    audience: A,
    attenuations: Vec<Capability>,
    proofs: Vec<ProofReference>,
    facts: UcanFacts,
    not_before: Option<u64>,
    expiration: Option<u64>,
    lifetime: Duration,
    nonce: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<A> UcanBuilder<A> {
    /// Sets the audience (recipient) of the UCAN.
    pub fn audience(self, audience: Did) -> UcanBuilder<Did> {
        UcanBuilder {
            audience,
            attenuations: self.attenuations,
            proofs: self.proofs,
            facts: self.facts,
            not_before: self.not_before,
            expiration: self.expiration,
            lifetime: self.lifetime,
            nonce: self.nonce,
        }
    }

    /// Sets the capabilities granted by the UCAN.
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.attenuations = capabilities.into_iter().collect();
        self
    }

    /// Adds a single capability.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.attenuations.push(capability);
        self
    }

    /// Sets the proofs the UCAN's authority derives from.
    pub fn proofs<P>(mut self, proofs: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<ProofReference>,
    {
        self.proofs = proofs.into_iter().map(Into::into).collect();
        self
    }

    /// Adds facts (claims) to the UCAN.
    pub fn facts(mut self, facts: impl IntoIterator<Item = Fact>) -> Self {
        self.facts = facts.into_iter().collect();
        self
    }

    /// Sets the time before which the UCAN is not valid.
    pub fn not_before(mut self, not_before: SystemTime) -> Self {
        self.not_before = Some(unix_secs(not_before));
        self
    }

    /// Sets the expiration time of the UCAN.
    pub fn expiration(mut self, expiration: SystemTime) -> Self {
        self.expiration = Some(unix_secs(expiration));
        self
    }

    /// Sets the lifetime used when no expiration is set. Defaults to [`DEFAULT_LIFETIME`].
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets a nonce to prevent replay attacks.
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets a random 12 hex digit nonce.
    pub fn with_nonce(self) -> Self {
        let bytes: [u8; 6] = rand::thread_rng().gen();
        let nonce = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();
        self.nonce(nonce)
    }
}

impl UcanBuilder<Did> {
    /// Signs the UCAN with `keypair`, which also determines the issuer and algorithm.
    pub fn sign<K>(self, keypair: &K) -> UcanResult<Ucan>
    where
        K: Sign + JwsAlgName + PublicKeyBytes + GetKeyType,
    {
        self.sign_at(keypair, SystemTime::now())
    }

    /// Signs the UCAN, computing the default expiration from `now`.
    pub fn sign_at<K>(self, keypair: &K, now: SystemTime) -> UcanResult<Ucan>
    where
        K: Sign + JwsAlgName + PublicKeyBytes + GetKeyType,
    {
        let expiration = self
            .expiration
            .unwrap_or_else(|| unix_secs(now).saturating_add(self.lifetime.as_secs()));

        if let Some(not_before) = self.not_before {
            if not_before > expiration {
                return Err(UcanError::InvalidTimeBounds(not_before, expiration));
            }
        }

        let header = UcanHeader::from(keypair.alg());
        let payload = UcanPayload {
            issuer: Did::from_key(keypair)?,
            audience: self.audience,
            expiration: Some(expiration),
            not_before: self.not_before,
            nonce: self.nonce,
            facts: self.facts,
            attenuations: self.attenuations,
            proofs: self.proofs.into_iter().collect(),
        };

        let signed_data = format!("{}.{}", header.encode()?, payload.encode()?);
        let signature = keypair.sign(signed_data.as_bytes())?;

        Ok(Ucan::from_parts(
            header,
            payload,
            signed_data,
            signature.into(),
        ))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Converts a time to whole seconds since the Unix epoch. Times before the epoch map to zero.
pub fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for UcanBuilder<()> {
    fn default() -> Self {
        UcanBuilder {
            audience: (),
            attenuations: Vec::new(),
            proofs: Vec::new(),
            facts: UcanFacts::default(),
            not_before: None,
            expiration: None,
            lifetime: DEFAULT_LIFETIME,
            nonce: None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
