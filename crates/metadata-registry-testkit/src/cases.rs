//! Shared validation test cases for entity metadata.
//!
//! Three tables: basic version and size checks, the full permutation of
//! versions, serials and in/out-of-bounds fields, and field semantics.

use metadata_registry_core::{
    EntityMetadata, MAX_ENTITY_EMAIL_LENGTH, MAX_ENTITY_KEYBASE_LENGTH, MAX_ENTITY_NAME_LENGTH,
    MAX_ENTITY_TWITTER_LENGTH, MAX_ENTITY_URL_LENGTH, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION,
};

pub const VALID_NAME: &str = "this is a name";
pub const TOO_LONG_NAME: &str = "this is a name but it is soooooooooooooooooooo long";
pub const VALID_URL: &str = "https://hello.world/bar/goo";
pub const TOO_LONG_URL: &str = "https://too.too.too.too.too.too.too.too.too.too.too.too.too.too.long";
pub const VALID_EMAIL: &str = "hello@world.org";
pub const TOO_LONG_EMAIL: &str = "too@too.too.too.too.too.too.too.long";
pub const VALID_KEYBASE: &str = "Hello_world42";
pub const TOO_LONG_KEYBASE: &str = "tootootootootootootootootootoolong";
pub const VALID_TWITTER: &str = "Hello_world42";
pub const TOO_LONG_TWITTER: &str = "tootootootootootootootootootoolong";

/// A named record with its expected validity.
#[derive(Debug, Clone)]
pub struct EntityMetadataTestCase {
    pub name: String,
    pub metadata: EntityMetadata,
    pub valid: bool,
}

impl EntityMetadataTestCase {
    fn new(name: &str, metadata: EntityMetadata, valid: bool) -> Self {
        Self {
            name: name.to_string(),
            metadata,
            valid,
        }
    }

    /// Check `validate_basic` against the expectation.
    pub fn check(&self) -> Result<(), String> {
        match (self.metadata.validate_basic(), self.valid) {
            (Ok(()), true) | (Err(_), false) => Ok(()),
            (Ok(()), false) => Err(format!("{}: validation should fail", self.name)),
            (Err(e), true) => Err(format!("{}: validation should pass: {e}", self.name)),
        }
    }
}

fn versioned(v: u16) -> EntityMetadata {
    EntityMetadata {
        v,
        ..EntityMetadata::default()
    }
}

fn with_name(name: &str) -> EntityMetadata {
    EntityMetadata {
        name: Some(name.into()),
        ..versioned(1)
    }
}

fn with_url(url: &str) -> EntityMetadata {
    EntityMetadata {
        url: Some(url.into()),
        ..versioned(1)
    }
}

fn with_email(email: &str) -> EntityMetadata {
    EntityMetadata {
        email: Some(email.into()),
        ..versioned(1)
    }
}

fn with_keybase(keybase: &str) -> EntityMetadata {
    EntityMetadata {
        keybase: Some(keybase.into()),
        ..versioned(1)
    }
}

fn with_twitter(twitter: &str) -> EntityMetadata {
    EntityMetadata {
        twitter: Some(twitter.into()),
        ..versioned(1)
    }
}

/// Basic version and field size checks.
pub fn basic_version_and_size() -> Vec<EntityMetadataTestCase> {
    vec![
        EntityMetadataTestCase::new("InvalidVersion1", versioned(0), false),
        EntityMetadataTestCase::new("InvalidVersion2", versioned(2), false),
        EntityMetadataTestCase::new("ValidName", with_name(VALID_NAME), true),
        EntityMetadataTestCase::new("TooLongName", with_name(TOO_LONG_NAME), false),
        EntityMetadataTestCase::new("ValidURL", with_url(VALID_URL), true),
        EntityMetadataTestCase::new("TooLongURL", with_url(TOO_LONG_URL), false),
        EntityMetadataTestCase::new("ValidEmail", with_email(VALID_EMAIL), true),
        EntityMetadataTestCase::new("TooLongEmail", with_email(TOO_LONG_EMAIL), false),
        EntityMetadataTestCase::new("ValidKeybase", with_keybase(VALID_KEYBASE), true),
        EntityMetadataTestCase::new("TooLongKeybase", with_keybase(TOO_LONG_KEYBASE), false),
        EntityMetadataTestCase::new("ValidTwitter", with_twitter(VALID_TWITTER), true),
        EntityMetadataTestCase::new("TooLongTwitter", with_twitter(TOO_LONG_TWITTER), false),
    ]
}

/// Whether a fully populated record is within version and length bounds.
pub fn valid_bounds(
    v: u16,
    name: &str,
    url: &str,
    email: &str,
    keybase: &str,
    twitter: &str,
) -> bool {
    (MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&v)
        && name.len() <= MAX_ENTITY_NAME_LENGTH
        && url.len() <= MAX_ENTITY_URL_LENGTH
        && email.len() <= MAX_ENTITY_EMAIL_LENGTH
        && keybase.len() <= MAX_ENTITY_KEYBASE_LENGTH
        && twitter.len() <= MAX_ENTITY_TWITTER_LENGTH
}

/// Every permutation of version, serial and valid/too-long field values.
///
/// All records have every field set.
pub fn extended_version_and_size() -> Vec<EntityMetadataTestCase> {
    let versions = [0u16, 1, 2];
    let serials = [0u64, 1, 10, 42, 1000, 1_000_000, 10_000_000, u64::MAX];
    let names = [VALID_NAME, TOO_LONG_NAME];
    let urls = [VALID_URL, TOO_LONG_URL];
    let emails = [VALID_EMAIL, TOO_LONG_EMAIL];
    let keybases = [VALID_KEYBASE, TOO_LONG_KEYBASE];
    let twitters = [VALID_TWITTER, TOO_LONG_TWITTER];

    let mut cases = Vec::new();
    for v in versions {
        for serial in serials {
            for name in names {
                for url in urls {
                    for email in emails {
                        for keybase in keybases {
                            for twitter in twitters {
                                let metadata = EntityMetadata {
                                    v,
                                    serial,
                                    name: Some(name.into()),
                                    url: Some(url.into()),
                                    email: Some(email.into()),
                                    keybase: Some(keybase.into()),
                                    twitter: Some(twitter.into()),
                                };
                                cases.push(EntityMetadataTestCase {
                                    name: format!("ExtendedVersionAndSizeChecks: {}", cases.len()),
                                    metadata,
                                    valid: valid_bounds(v, name, url, email, keybase, twitter),
                                });
                            }
                        }
                    }
                }
            }
        }
    }
    cases
}

/// Syntax checks of the individual fields.
pub fn field_semantics() -> Vec<EntityMetadataTestCase> {
    vec![
        EntityMetadataTestCase::new("ValidURL", with_url(VALID_URL), true),
        EntityMetadataTestCase::new("BadSchemeURL", with_url("http://hello.world/bar/goo"), false),
        EntityMetadataTestCase::new("BadQueryURL", with_url("https://hello.world/bar?goo=1"), false),
        EntityMetadataTestCase::new("BadFragmentURL", with_url("https://hello.world/bar#goo"), false),
        EntityMetadataTestCase::new("BadPortURL", with_url("https://hello.world:123/bar"), false),
        EntityMetadataTestCase::new("BadURL1", with_url("hello.world"), false),
        EntityMetadataTestCase::new("BadURL2", with_url("127.0.0.1:1234"), false),
        EntityMetadataTestCase::new("ValidEmail", with_email(VALID_EMAIL), true),
        EntityMetadataTestCase::new(
            "ValidEmailEmptyName",
            with_email("\"\" <hello@world.org>"),
            true,
        ),
        EntityMetadataTestCase::new("BadEmail1", with_email("hello world.org"), false),
        EntityMetadataTestCase::new("BadEmail2", with_email("Hello World <hello@world.org>"), false),
        EntityMetadataTestCase::new("BadEmail3", with_email("@world.org"), false),
        EntityMetadataTestCase::new("BadEmail4", with_email("hello@.org"), false),
        EntityMetadataTestCase::new("ValidKeybase", with_keybase(VALID_KEYBASE), true),
        EntityMetadataTestCase::new("BadKeybase1", with_keybase("helloworld-"), false),
        EntityMetadataTestCase::new("BadKeybase2", with_keybase("https://keybase.io/hello"), false),
        EntityMetadataTestCase::new("BadKeybase3", with_keybase("foo-bar"), false),
        EntityMetadataTestCase::new("BadKeybase4", with_keybase("foo:bar"), false),
        EntityMetadataTestCase::new("ValidTwitter", with_twitter(VALID_TWITTER), true),
        EntityMetadataTestCase::new("BadTwitter1", with_twitter("helloworld-"), false),
        EntityMetadataTestCase::new("BadTwitter2", with_twitter("https://twitter.com/hello"), false),
        EntityMetadataTestCase::new("BadTwitter3", with_twitter("foo-bar"), false),
        EntityMetadataTestCase::new("BadTwitter4", with_twitter("foo:bar"), false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_cases() {
        for case in basic_version_and_size() {
            case.check().unwrap();
        }
    }

    #[test]
    fn test_extended_cases() {
        let cases = extended_version_and_size();
        assert_eq!(cases.len(), 3 * 8 * 32);
        assert_eq!(cases.iter().filter(|c| c.valid).count(), 8);
        for case in &cases {
            case.check().unwrap();
        }
    }

    #[test]
    fn test_field_semantics_cases() {
        for case in field_semantics() {
            case.check().unwrap();
        }
    }
}
