//! Update-integrity checking between two registry snapshots.

use tracing::{debug, warn};

use crate::error::{RegistryError, Result};
use crate::provider::Provider;

/// Check that `candidate` is a valid successor of `prior`.
///
/// - every entity in `prior` must still be present in `candidate`;
/// - an entity whose record changed (by canonical encoding) must carry a
///   strictly larger serial;
/// - entities only in `candidate` are accepted as is.
///
/// Both snapshots are recomputed from storage.
pub fn verify_update<C, P>(candidate: &C, prior: &P) -> Result<()>
where
    C: Provider + ?Sized,
    P: Provider + ?Sized,
{
    let dst = candidate.get_entities().map_err(|e| {
        RegistryError::Corrupt(format!("destination registry: {}", e.corrupt_reason()))
    })?;
    let src = prior
        .get_entities()
        .map_err(|e| RegistryError::Corrupt(format!("source registry: {}", e.corrupt_reason())))?;

    // No entities can be removed by an update.
    if let Some(id) = src.keys().find(|id| !dst.contains_key(id)) {
        warn!(entity = %id, "entity removed by update");
        return Err(RegistryError::EntityRemoved(*id));
    }

    for (id, new) in &dst {
        let Some(old) = src.get(id) else {
            continue;
        };

        if !old.canonical_eq(new) && new.serial <= old.serial {
            warn!(entity = %id, existing = old.serial, provided = new.serial, "serial not increased");
            return Err(RegistryError::SerialNotIncreased {
                id: *id,
                existing: old.serial,
                provided: new.serial,
            });
        }
    }

    debug!(prior = src.len(), candidate = dst.len(), "update verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::memory::MemoryBlobStore;
    use crate::provider::{FsProvider, MutableProvider};
    use metadata_registry_core::{
        EntityMetadata, Keypair, SignatureContext, SignedEntityMetadata, Signer,
    };

    fn registry() -> FsProvider<MemoryBlobStore> {
        let p = FsProvider::in_memory(RegistryConfig::default());
        p.init().unwrap();
        p
    }

    fn put(p: &FsProvider<MemoryBlobStore>, kp: &Keypair, meta: &EntityMetadata) {
        let signed = SignedEntityMetadata::sign(kp, &SignatureContext::default(), meta).unwrap();
        p.update_entity(&signed).unwrap();
    }

    #[test]
    fn test_identical_registries() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let a = registry();
        let b = registry();
        put(&a, &kp, &EntityMetadata::new(1));
        put(&b, &kp, &EntityMetadata::new(1));
        a.verify_update(&b).unwrap();
    }

    #[test]
    fn test_new_entity_allowed() {
        let prior = registry();
        let candidate = registry();
        put(&candidate, &Keypair::from_seed(&[1u8; 32]), &EntityMetadata::new(0));
        candidate.verify_update(&prior).unwrap();
    }

    #[test]
    fn test_removed_entity() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let prior = registry();
        let candidate = registry();
        put(&prior, &kp, &EntityMetadata::new(1));

        match candidate.verify_update(&prior) {
            Err(RegistryError::EntityRemoved(id)) => assert_eq!(id, kp.public_key()),
            other => panic!("expected removal, got {other:?}"),
        }
    }

    #[test]
    fn test_changed_without_serial_bump() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let prior = registry();
        let candidate = registry();
        put(&prior, &kp, &EntityMetadata::new(5));
        put(
            &candidate,
            &kp,
            &EntityMetadata {
                name: Some("renamed".into()),
                ..EntityMetadata::new(5)
            },
        );

        assert!(matches!(
            candidate.verify_update(&prior),
            Err(RegistryError::SerialNotIncreased {
                existing: 5,
                provided: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_corrupt_sides_are_tagged() {
        let healthy = registry();
        let uninitialized = FsProvider::in_memory(RegistryConfig::default());

        let err = uninitialized.verify_update(&healthy).unwrap_err();
        assert!(err.is_corrupt());
        assert!(err.to_string().contains("destination registry"));

        let err = healthy.verify_update(&uninitialized).unwrap_err();
        assert!(err.to_string().contains("source registry"));
    }
}
