//! Integration tests for update-integrity checking between registries.

use metadata_registry_core::EntityMetadata;
use metadata_registry_store::{
    entity_path, verify_update, BlobStore, FsProvider, MemoryBlobStore, MutableProvider,
    OsBlobStore, Provider, RegistryConfig, RegistryError,
};
use metadata_registry_testkit::{entities, TestEntity};

fn memory_registry() -> FsProvider<MemoryBlobStore> {
    let reg = FsProvider::in_memory(RegistryConfig::default());
    reg.init().unwrap();
    reg
}

/// Copy every statement from `src` into `dst`, as a fresh checkout would.
fn copy_into(src: &impl Provider, dst: &impl MutableProvider, signers: &[TestEntity]) {
    for e in signers {
        if let Ok(meta) = src.get_entity(&e.id()) {
            dst.update_entity(&e.sign(&meta)).unwrap();
        }
    }
}

#[test]
fn test_add_and_bump() {
    let people = entities(3);
    let prior = memory_registry();
    prior.update_entity(&people[0].statement(1)).unwrap();
    prior.update_entity(&people[1].statement(1)).unwrap();

    let candidate = memory_registry();
    copy_into(&prior, &candidate, &people);
    candidate.update_entity(&people[0].statement(2)).unwrap();
    candidate.update_entity(&people[2].statement(0)).unwrap();

    candidate.verify_update(&prior).unwrap();
    verify_update(&candidate, &prior).unwrap();
}

#[test]
fn test_removal_detected() {
    let people = entities(2);
    let prior = memory_registry();
    prior.update_entity(&people[0].statement(1)).unwrap();
    prior.update_entity(&people[1].statement(1)).unwrap();

    let candidate = memory_registry();
    candidate.update_entity(&people[0].statement(1)).unwrap();

    match candidate.verify_update(&prior) {
        Err(RegistryError::EntityRemoved(id)) => assert_eq!(id, people[1].id()),
        other => panic!("expected EntityRemoved, got {other:?}"),
    }
}

#[test]
fn test_identical_resubmission_needs_no_bump() {
    let alice = TestEntity::new("alice");
    let prior = memory_registry();
    prior.update_entity(&alice.statement(3)).unwrap();

    // A fresh signature over the same record.
    let candidate = memory_registry();
    candidate.update_entity(&alice.sign(&alice.record(3))).unwrap();
    candidate.verify_update(&prior).unwrap();
}

#[test]
fn test_rollback_detected() {
    let alice = TestEntity::new("alice");
    let prior = memory_registry();
    prior.update_entity(&alice.statement(5)).unwrap();

    // Bypass the serial check by writing the older statement directly.
    let candidate = memory_registry();
    candidate
        .store()
        .write(
            &entity_path(&alice.id()),
            &alice.statement(4).save().unwrap(),
        )
        .unwrap();

    assert!(matches!(
        candidate.verify_update(&prior),
        Err(RegistryError::SerialNotIncreased {
            existing: 5,
            provided: 4,
            ..
        })
    ));
}

#[test]
fn test_empty_field_differs_from_absent() {
    let alice = TestEntity::new("alice");
    let prior = memory_registry();
    prior.update_entity(&alice.sign(&EntityMetadata::new(1))).unwrap();

    let changed = EntityMetadata {
        name: Some(String::new()),
        ..EntityMetadata::new(1)
    };
    let candidate = memory_registry();
    candidate.update_entity(&alice.sign(&changed)).unwrap();

    assert!(matches!(
        candidate.verify_update(&prior),
        Err(RegistryError::SerialNotIncreased { .. })
    ));
}

#[test]
fn test_directories_on_disk() {
    let prior_dir = tempfile::tempdir().unwrap();
    let candidate_dir = tempfile::tempdir().unwrap();
    let prior = FsProvider::new(OsBlobStore::new(prior_dir.path()), RegistryConfig::default());
    let candidate = FsProvider::open(candidate_dir.path(), RegistryConfig::default());
    prior.init().unwrap();
    candidate.init().unwrap();

    let alice = TestEntity::new("alice");
    prior.update_entity(&alice.statement(1)).unwrap();
    candidate.update_entity(&alice.statement(2)).unwrap();
    candidate.verify_update(&prior).unwrap();

    // Reversed direction is a serial decrease.
    assert!(prior.verify_update(&candidate).is_err());
}

#[test]
fn test_corrupt_prior_is_reported_as_source() {
    let prior = FsProvider::in_memory(RegistryConfig::default());
    let candidate = memory_registry();

    let err = candidate.verify_update(&prior).unwrap_err();
    assert!(err.is_corrupt());
    assert!(err.to_string().contains("source registry"));
}
