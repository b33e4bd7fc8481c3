//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use metadata_registry_core::{
    EntityMetadata, Keypair, PublicKey, SignatureContext, SignedEntityMetadata, Signer,
};

/// Derive a deterministic keypair from a human-readable name.
///
/// The seed is the BLAKE3 hash of the name, so the same name always yields
/// the same entity across runs.
pub fn test_signer(name: &str) -> Keypair {
    Keypair::from_seed(blake3::hash(name.as_bytes()).as_bytes())
}

/// A test entity with a deterministic keypair.
pub struct TestEntity {
    pub keypair: Keypair,
    pub context: SignatureContext,
}

impl TestEntity {
    /// Create an entity whose key is derived from `name`.
    pub fn new(name: &str) -> Self {
        Self {
            keypair: test_signer(name),
            context: SignatureContext::default(),
        }
    }

    /// Create with a random keypair.
    pub fn random() -> Self {
        Self {
            keypair: Keypair::generate(),
            context: SignatureContext::default(),
        }
    }

    /// Get the keypair's public key.
    pub fn id(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// A valid record with every field filled in.
    pub fn record(&self, serial: u64) -> EntityMetadata {
        EntityMetadata {
            name: Some("this is a name".into()),
            url: Some("https://hello.world/bar/goo".into()),
            email: Some("hello@world.org".into()),
            keybase: Some("Hello_world42".into()),
            twitter: Some("Hello_world42".into()),
            ..EntityMetadata::new(serial)
        }
    }

    /// Sign an arbitrary record.
    pub fn sign(&self, metadata: &EntityMetadata) -> SignedEntityMetadata {
        SignedEntityMetadata::sign(&self.keypair, &self.context, metadata)
            .expect("in-process signing cannot fail")
    }

    /// Sign [`record`](Self::record) with the given serial.
    pub fn statement(&self, serial: u64) -> SignedEntityMetadata {
        self.sign(&self.record(serial))
    }
}

/// Create several entities with distinct deterministic keys.
pub fn entities(count: usize) -> Vec<TestEntity> {
    (0..count)
        .map(|i| TestEntity::new(&format!("entity-{i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_is_deterministic() {
        assert_eq!(test_signer("a").public_key(), test_signer("a").public_key());
        assert_ne!(test_signer("a").public_key(), test_signer("b").public_key());
    }

    #[test]
    fn test_statement_opens() {
        let entity = TestEntity::new("alice");
        let stmt = entity.statement(3);
        let meta = stmt.open(&entity.context, &entity.id()).unwrap();
        assert_eq!(meta, entity.record(3));
    }

    #[test]
    fn test_entities_distinct() {
        let all = entities(4);
        let mut ids: Vec<_> = all.iter().map(TestEntity::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
