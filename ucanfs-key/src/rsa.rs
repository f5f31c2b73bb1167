use rand_core::CryptoRngCore;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey},
    pkcs1v15::{Signature, SigningKey, VerifyingKey},
    signature::{SignatureEncoding, Signer, Verifier},
    RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;

use crate::{
    AsymmetricKey, GetKeyType, JwsAlgName, JwsAlgorithm, KeyError, KeyPairBytes, KeyPairGenerate,
    KeyResult, KeyType, PubKey, PublicKeyBytes, PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The modulus size used when generating RSA key pairs.
pub const RSA_DEFAULT_BITS: usize = 2048;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An RSA public key used to verify `RS256` signatures.
pub type RsaPubKey = PubKey<RsaPublicKey>;

/// An RSA key pair that signs with PKCS#1 v1.5 padding over SHA-256.
pub type RsaKeyPair = RsaKey<RsaPrivateKey>;

pub(crate) type RsaKey<S> = AsymmetricKey<RsaPublicKey, S>;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl RsaKeyPair {
    /// Generates a key pair with a modulus of `bits` bits.
    pub fn generate_with_bits(rng: &mut impl CryptoRngCore, bits: usize) -> KeyResult<Self> {
        let private = RsaPrivateKey::new(rng, bits)?;
        Ok(Self {
            public: private.to_public_key(),
            private,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> Verify for RsaKey<S> {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        let signature =
            Signature::try_from(signature).map_err(|e| KeyError::InvalidSignature(e.to_string()))?;

        VerifyingKey::<Sha256>::new(self.public.clone())
            .verify(data, &signature)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))
    }
}

impl Sign for RsaKeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature = SigningKey::<Sha256>::new(self.private.clone())
            .try_sign(data)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))?;

        Ok(signature.to_vec())
    }
}

impl PublicKeyGenerate for RsaPubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        let public =
            RsaPublicKey::from_pkcs1_der(bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(Self {
            public,
            private: (),
        })
    }
}

impl KeyPairGenerate for RsaKeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        Self::generate_with_bits(rng, RSA_DEFAULT_BITS)
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let private = RsaPrivateKey::from_pkcs1_der(bytes)
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(Self {
            public: private.to_public_key(),
            private,
        })
    }
}

impl<S> PublicKeyBytes for RsaKey<S> {
    fn public_key_bytes(&self) -> KeyResult<Vec<u8>> {
        let document = self
            .public
            .to_pkcs1_der()
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(document.as_bytes().to_vec())
    }
}

impl KeyPairBytes for RsaKeyPair {
    fn private_key_bytes(&self) -> KeyResult<Vec<u8>> {
        let document = self
            .private
            .to_pkcs1_der()
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        Ok(document.as_bytes().to_vec())
    }
}

impl<S> JwsAlgName for RsaKey<S> {
    fn alg(&self) -> JwsAlgorithm {
        JwsAlgorithm::RS256
    }
}

impl<S> GetKeyType for RsaKey<S> {
    fn key_type(&self) -> KeyType {
        KeyType::Rsa
    }
}

impl From<&RsaKeyPair> for RsaPubKey {
    fn from(key_pair: &RsaKeyPair) -> Self {
        Self {
            public: key_pair.public.clone(),
            private: (),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsa_sign_and_verify() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = RsaKeyPair::generate_with_bits(&mut rng, 1024)?;

        let data = b"header.payload";
        let signature = key_pair.sign(data)?;

        key_pair.verify(data, &signature)?;
        assert!(key_pair.verify(b"tampered", &signature).is_err());

        let public_key = RsaPubKey::from_public_key(&key_pair.public_key_bytes()?)?;
        public_key.verify(data, &signature)?;
        assert_eq!(public_key, RsaPubKey::from(&key_pair));

        Ok(())
    }

    #[test]
    fn test_rsa_private_key_bytes() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = RsaKeyPair::generate_with_bits(&mut rng, 1024)?;

        let restored = RsaKeyPair::from_private_key(&key_pair.private_key_bytes()?)?;
        assert_eq!(restored.public_key_bytes()?, key_pair.public_key_bytes()?);
        assert_eq!(restored.alg(), JwsAlgorithm::RS256);

        assert!(RsaPubKey::from_public_key(b"not der").is_err());

        Ok(())
    }
}
