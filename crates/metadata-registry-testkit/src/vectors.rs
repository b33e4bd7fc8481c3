//! Test vectors for entity metadata statements.
//!
//! Each vector carries a record, its canonical encoding, a statement signed
//! by a deterministic key and whether validation should accept it. Other
//! implementations can check their encoding and signing against these.

use serde::{Deserialize, Serialize};

use metadata_registry_core::{
    EntityMetadata, Keypair, PublicKey, SignatureContext, SignedEntityMetadata, Signer,
};

use crate::cases::{basic_version_and_size, extended_version_and_size, EntityMetadataTestCase};
use crate::fixtures::test_signer;

/// Prefix of the names the vector signing keys are derived from.
pub const KEY_SEED_PREFIX: &str = "metadata-registry test vectors: ";

/// A single test vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadataTestVector {
    /// Which case table the vector comes from.
    pub kind: String,
    pub signature_context: SignatureContext,
    pub entity_meta: EntityMetadata,
    pub signed_entity_meta: SignedEntityMetadata,
    /// Canonical CBOR of `entity_meta`.
    #[serde(with = "hex::serde")]
    pub encoded_entity_meta: Vec<u8>,
    /// Storage encoding of `signed_entity_meta`.
    #[serde(with = "hex::serde")]
    pub encoded_signed_entity_meta: Vec<u8>,
    pub valid: bool,
    #[serde(with = "hex::serde")]
    pub signer_private_key: [u8; 32],
    pub signer_public_key: PublicKey,
}

impl EntityMetadataTestVector {
    /// Build a vector signed with the key derived from `kind`.
    pub fn new(kind: &str, metadata: &EntityMetadata, valid: bool) -> Self {
        let signer = test_signer(&format!("{KEY_SEED_PREFIX}{kind}"));
        Self::with_signer(kind, metadata, valid, &signer)
    }

    /// Build a vector signed with a specific key.
    pub fn with_signer(kind: &str, metadata: &EntityMetadata, valid: bool, signer: &Keypair) -> Self {
        let context = SignatureContext::default();
        let signed = SignedEntityMetadata::sign(signer, &context, metadata)
            .expect("in-process signing cannot fail");
        let encoded_signed = signed.save().expect("statement serializes to JSON");

        Self {
            kind: kind.to_string(),
            signature_context: context,
            entity_meta: metadata.clone(),
            signed_entity_meta: signed,
            encoded_entity_meta: metadata.canonical_bytes(),
            encoded_signed_entity_meta: encoded_signed,
            valid,
            signer_private_key: signer.seed(),
            signer_public_key: signer.public_key(),
        }
    }

    /// Check the vector against this implementation.
    pub fn verify(&self) -> Result<(), String> {
        let signer = Keypair::from_seed(&self.signer_private_key);
        if signer.public_key() != self.signer_public_key {
            return Err("signer key pair mismatch".into());
        }
        if self.entity_meta.canonical_bytes() != self.encoded_entity_meta {
            return Err("canonical encoding mismatch".into());
        }
        if self.signed_entity_meta.untrusted_raw_value != self.encoded_entity_meta {
            return Err("signed payload differs from encoding".into());
        }

        let loaded = SignedEntityMetadata::load(
            &self.encoded_signed_entity_meta,
            metadata_registry_core::MAX_STATEMENT_SIZE,
        )
        .map_err(|e| format!("statement does not load: {e}"))?;
        if loaded != self.signed_entity_meta {
            return Err("stored statement differs".into());
        }

        match (
            loaded.open(&self.signature_context, &self.signer_public_key),
            self.valid,
        ) {
            (Ok(meta), true) if meta == self.entity_meta => Ok(()),
            (Ok(_), true) => Err("opened record differs".into()),
            (Ok(_), false) => Err("invalid vector opened".into()),
            (Err(e), true) => Err(format!("valid vector failed to open: {e}")),
            (Err(_), false) => Ok(()),
        }
    }
}

fn from_cases(kind: &str, cases: Vec<EntityMetadataTestCase>) -> Vec<EntityMetadataTestVector> {
    cases
        .iter()
        .map(|case| EntityMetadataTestVector::new(kind, &case.metadata, case.valid))
        .collect()
}

/// Generate every test vector.
pub fn all_vectors() -> Vec<EntityMetadataTestVector> {
    let mut vectors = from_cases("EntityMetadataBasicVersionAndSize", basic_version_and_size());
    vectors.extend(from_cases(
        "EntityMetadataExtendedVersionAndSize",
        extended_version_and_size(),
    ));
    vectors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_verify() {
        let vectors = all_vectors();
        assert_eq!(vectors.len(), 12 + 768);
        for (i, v) in vectors.iter().enumerate() {
            v.verify().unwrap_or_else(|e| panic!("vector {i} ({}): {e}", v.kind));
        }
    }

    #[test]
    fn test_vector_json_roundtrip() {
        let v = EntityMetadataTestVector::new("test", &EntityMetadata::new(1), true);
        let json = serde_json::to_string(&v).unwrap();
        let back: EntityMetadataTestVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        back.verify().unwrap();
    }

    #[test]
    fn test_tampered_vector_fails() {
        let mut v = EntityMetadataTestVector::new("test", &EntityMetadata::new(1), true);
        v.entity_meta.serial = 2;
        assert!(v.verify().is_err());
    }

    #[test]
    fn test_keys_depend_on_kind() {
        let a = EntityMetadataTestVector::new("a", &EntityMetadata::new(1), true);
        let b = EntityMetadataTestVector::new("b", &EntityMetadata::new(1), true);
        assert_ne!(a.signer_public_key, b.signer_public_key);
    }
}
