//! Proptest generators for property-based testing.

use proptest::prelude::*;

use metadata_registry_core::{EntityMetadata, Keypair, PublicKey, Signer};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random PublicKey.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a serial number.
pub fn serial() -> impl Strategy<Value = u64> {
    prop_oneof![0u64..=1000, Just(u64::MAX), any::<u64>()]
}

/// Generate a valid entity name.
pub fn name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,'-]{1,50}".prop_map(String::from)
}

/// Generate a valid https URL.
pub fn url() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,15}", "[a-z]{2,6}", "(/[a-z0-9_-]{1,8}){0,3}")
        .prop_map(|(host, tld, path)| format!("https://{host}.{tld}{path}"))
}

/// Generate a valid e-mail address.
pub fn email() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9._+]{0,6}[a-z0-9]", "[a-z][a-z0-9]{0,8}", "[a-z]{2,4}")
        .prop_filter("no consecutive dots", |(local, _, _)| !local.contains(".."))
        .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
}

/// Generate a valid keybase or twitter handle.
pub fn handle() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{1,32}".prop_map(String::from)
}

/// Generate a string containing at least one character a handle may not.
pub fn bad_handle() -> impl Strategy<Value = String> {
    ("[A-Za-z0-9_]{0,8}", "[-:/.@ ]", "[A-Za-z0-9_]{0,8}")
        .prop_map(|(a, bad, b)| format!("{a}{bad}{b}"))
}

/// Generate a record that passes validation.
pub fn valid_metadata() -> impl Strategy<Value = EntityMetadata> {
    (
        serial(),
        proptest::option::of(name()),
        proptest::option::of(url()),
        proptest::option::of(email()),
        proptest::option::of(handle()),
        proptest::option::of(handle()),
    )
        .prop_map(|(serial, name, url, email, keybase, twitter)| EntityMetadata {
            name,
            url,
            email,
            keybase,
            twitter,
            ..EntityMetadata::new(serial)
        })
}

/// Generate a record with arbitrary version and field contents.
pub fn any_metadata() -> impl Strategy<Value = EntityMetadata> {
    (
        any::<u16>(),
        any::<u64>(),
        proptest::option::of(".{0,60}"),
        proptest::option::of(".{0,70}"),
        proptest::option::of(".{0,40}"),
        proptest::option::of(".{0,40}"),
        proptest::option::of(".{0,40}"),
    )
        .prop_map(|(v, serial, name, url, email, keybase, twitter)| EntityMetadata {
            v,
            serial,
            name,
            url,
            email,
            keybase,
            twitter,
        })
}
