//! Signed entity metadata statements.
//!
//! A statement is the canonical CBOR encoding of an [`EntityMetadata`] record
//! together with the signer's public key and a signature over those bytes.
//! The raw value is untrusted until [`SignedEntityMetadata::open`] succeeds.

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, Signature, SignatureContext, Signer};
use crate::error::{CoreError, Result};
use crate::metadata::{EntityMetadata, ValidationLimits};

/// Maximum size of a serialized statement in bytes.
pub const MAX_STATEMENT_SIZE: usize = 16 * 1024;

/// A signature together with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSignature {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// Signed entity metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEntityMetadata {
    /// Canonical CBOR bytes of the record. Not trusted until opened.
    #[serde(with = "hex::serde")]
    pub untrusted_raw_value: Vec<u8>,

    pub signature: StatementSignature,
}

impl SignedEntityMetadata {
    /// Sign a metadata record.
    ///
    /// The record is not validated here; [`open`](Self::open) validates on
    /// the way out.
    pub fn sign<S: Signer + ?Sized>(
        signer: &S,
        context: &SignatureContext,
        metadata: &EntityMetadata,
    ) -> Result<Self> {
        let raw = metadata.canonical_bytes();
        let signature = signer.sign(context, &raw)?;
        Ok(Self {
            untrusted_raw_value: raw,
            signature: StatementSignature {
                public_key: signer.public_key(),
                signature,
            },
        })
    }

    /// The public key embedded in the statement.
    pub fn public_key(&self) -> PublicKey {
        self.signature.public_key
    }

    /// Verify the statement was signed by `expected` and return the record.
    ///
    /// Checks signer identity, then signature, then decoding, then basic
    /// validation. The first failure is returned.
    pub fn open(&self, context: &SignatureContext, expected: &PublicKey) -> Result<EntityMetadata> {
        self.open_with_limits(context, expected, &ValidationLimits::default())
    }

    /// Open against whatever key the statement embeds.
    pub fn open_unchecked_signer(&self, context: &SignatureContext) -> Result<EntityMetadata> {
        self.open(context, &self.signature.public_key)
    }

    /// Like [`open`](Self::open), validating against explicit limits.
    pub fn open_with_limits(
        &self,
        context: &SignatureContext,
        expected: &PublicKey,
        limits: &ValidationLimits,
    ) -> Result<EntityMetadata> {
        if self.signature.public_key != *expected {
            return Err(CoreError::SignerMismatch {
                expected: *expected,
                actual: self.signature.public_key,
            });
        }

        self.signature.public_key.verify(
            context,
            &self.untrusted_raw_value,
            &self.signature.signature,
        )?;

        let metadata = EntityMetadata::from_canonical_bytes(&self.untrusted_raw_value)?;
        metadata.validate_basic_with(limits)?;
        Ok(metadata)
    }

    /// Serialize to the JSON storage format.
    pub fn save(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Deserialize from the JSON storage format.
    ///
    /// Input larger than `max_size` is rejected before any parsing happens.
    pub fn load(bytes: &[u8], max_size: usize) -> Result<Self> {
        if bytes.len() > max_size {
            return Err(CoreError::StatementTooLarge {
                size: bytes.len(),
                max: max_size,
            });
        }
        serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::error::ValidationError;

    fn record() -> EntityMetadata {
        EntityMetadata {
            name: Some("hello world".into()),
            url: Some("https://helloworld.io".into()),
            ..EntityMetadata::new(1)
        }
    }

    fn signed(kp: &Keypair, meta: &EntityMetadata) -> SignedEntityMetadata {
        SignedEntityMetadata::sign(kp, &SignatureContext::default(), meta).unwrap()
    }

    #[test]
    fn test_sign_and_open() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let stmt = signed(&kp, &record());

        assert_eq!(stmt.public_key(), kp.public_key());
        let opened = stmt
            .open(&SignatureContext::default(), &kp.public_key())
            .unwrap();
        assert_eq!(opened, record());
    }

    #[test]
    fn test_signer_mismatch() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let other = Keypair::from_seed(&[2u8; 32]);
        let stmt = signed(&kp, &record());

        let err = stmt
            .open(&SignatureContext::default(), &other.public_key())
            .unwrap_err();
        assert!(matches!(err, CoreError::SignerMismatch { .. }));
    }

    #[test]
    fn test_tampered_signature() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let mut stmt = signed(&kp, &record());
        stmt.signature.signature.0[0] ^= 0x01;

        let err = stmt
            .open(&SignatureContext::default(), &kp.public_key())
            .unwrap_err();
        assert!(matches!(err, CoreError::SignatureFailed));
    }

    #[test]
    fn test_tampered_payload() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let mut stmt = signed(&kp, &record());
        let last = stmt.untrusted_raw_value.len() - 1;
        stmt.untrusted_raw_value[last] ^= 0x01;

        assert!(matches!(
            stmt.open_unchecked_signer(&SignatureContext::default()),
            Err(CoreError::SignatureFailed)
        ));
    }

    #[test]
    fn test_wrong_context() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let stmt = signed(&kp, &record());
        let other = SignatureContext::new("metadata-registry/other/v1").unwrap();

        assert!(matches!(
            stmt.open(&other, &kp.public_key()),
            Err(CoreError::SignatureFailed)
        ));
    }

    #[test]
    fn test_signed_garbage_is_corrupt() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let ctx = SignatureContext::default();
        let raw = b"not cbor".to_vec();
        let stmt = SignedEntityMetadata {
            signature: StatementSignature {
                public_key: kp.public_key(),
                signature: kp.sign(&ctx, &raw).unwrap(),
            },
            untrusted_raw_value: raw,
        };

        assert!(matches!(
            stmt.open(&ctx, &kp.public_key()),
            Err(CoreError::CorruptPayload(_))
        ));
    }

    #[test]
    fn test_signed_invalid_record() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let meta = EntityMetadata {
            twitter: Some("foo:bar".into()),
            ..EntityMetadata::new(1)
        };
        let stmt = signed(&kp, &meta);

        match stmt.open(&SignatureContext::default(), &kp.public_key()) {
            Err(CoreError::InvalidMetadata(ValidationError::MalformedField { field, .. })) => {
                assert_eq!(field, crate::MetadataField::Twitter)
            }
            other => panic!("expected invalid metadata, got {other:?}"),
        }
    }

    #[test]
    fn test_open_with_limits() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let stmt = signed(&kp, &record());
        let limits = ValidationLimits {
            max_name_length: 5,
            ..ValidationLimits::default()
        };

        assert!(matches!(
            stmt.open_with_limits(&SignatureContext::default(), &kp.public_key(), &limits),
            Err(CoreError::InvalidMetadata(ValidationError::FieldTooLong { .. }))
        ));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let stmt = signed(&kp, &record());

        let bytes = stmt.save().unwrap();
        let loaded = SignedEntityMetadata::load(&bytes, MAX_STATEMENT_SIZE).unwrap();
        assert_eq!(loaded, stmt);

        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json["untrusted_raw_value"],
            serde_json::Value::String(hex::encode(&stmt.untrusted_raw_value))
        );
        assert_eq!(
            json["signature"]["public_key"],
            serde_json::Value::String(kp.public_key().to_hex())
        );
    }

    #[test]
    fn test_load_rejects_oversized() {
        let bytes = vec![b' '; MAX_STATEMENT_SIZE + 1];
        assert!(matches!(
            SignedEntityMetadata::load(&bytes, MAX_STATEMENT_SIZE),
            Err(CoreError::StatementTooLarge { size, max })
                if size == MAX_STATEMENT_SIZE + 1 && max == MAX_STATEMENT_SIZE
        ));
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            SignedEntityMetadata::load(b"{}", MAX_STATEMENT_SIZE),
            Err(CoreError::DecodingError(_))
        ));
    }
}
