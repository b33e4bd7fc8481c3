//! Entity metadata: the versioned record an entity publishes about itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

use crate::canonical::{decode_metadata, encode_metadata};
use crate::error::{CoreError, ValidationError};
use crate::validation::{validate_email, validate_handle, validate_url};

/// Minimum supported entity metadata version.
pub const MIN_SUPPORTED_VERSION: u16 = 1;
/// Maximum supported entity metadata version.
pub const MAX_SUPPORTED_VERSION: u16 = 1;

/// Maximum length of the `name` field.
pub const MAX_ENTITY_NAME_LENGTH: usize = 50;
/// Maximum length of the `url` field.
pub const MAX_ENTITY_URL_LENGTH: usize = 64;
/// Maximum length of the `email` field.
pub const MAX_ENTITY_EMAIL_LENGTH: usize = 32;
/// Maximum length of the `keybase` field.
pub const MAX_ENTITY_KEYBASE_LENGTH: usize = 32;
/// Maximum length of the `twitter` field.
pub const MAX_ENTITY_TWITTER_LENGTH: usize = 32;

/// The optional, validated fields of an entity metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Name,
    Url,
    Email,
    Keybase,
    Twitter,
}

impl MetadataField {
    /// All fields, in validation order.
    pub const ALL: [MetadataField; 5] = [
        MetadataField::Name,
        MetadataField::Url,
        MetadataField::Email,
        MetadataField::Keybase,
        MetadataField::Twitter,
    ];

    /// The field name as it appears in encodings.
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataField::Name => "name",
            MetadataField::Url => "url",
            MetadataField::Email => "email",
            MetadataField::Keybase => "keybase",
            MetadataField::Twitter => "twitter",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version range and per-field length bounds used by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub min_version: u16,
    pub max_version: u16,
    pub max_name_length: usize,
    pub max_url_length: usize,
    pub max_email_length: usize,
    pub max_keybase_length: usize,
    pub max_twitter_length: usize,
}

impl ValidationLimits {
    /// The length bound for a field.
    pub fn max_length(&self, field: MetadataField) -> usize {
        match field {
            MetadataField::Name => self.max_name_length,
            MetadataField::Url => self.max_url_length,
            MetadataField::Email => self.max_email_length,
            MetadataField::Keybase => self.max_keybase_length,
            MetadataField::Twitter => self.max_twitter_length,
        }
    }
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_version: MIN_SUPPORTED_VERSION,
            max_version: MAX_SUPPORTED_VERSION,
            max_name_length: MAX_ENTITY_NAME_LENGTH,
            max_url_length: MAX_ENTITY_URL_LENGTH,
            max_email_length: MAX_ENTITY_EMAIL_LENGTH,
            max_keybase_length: MAX_ENTITY_KEYBASE_LENGTH,
            max_twitter_length: MAX_ENTITY_TWITTER_LENGTH,
        }
    }
}

/// Metadata about an entity.
///
/// Two records are considered equal only if their canonical encodings are
/// equal, see [`EntityMetadata::canonical_eq`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityMetadata {
    /// Record format version.
    pub v: u16,

    /// Serial number of the statement. Must increase with every update.
    pub serial: u64,

    /// Entity name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL associated with the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Contact e-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// keybase.io handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keybase: Option<String>,

    /// Twitter handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EntityMetadata {
    /// Create an empty record of the current version.
    pub fn new(serial: u64) -> Self {
        Self {
            v: MAX_SUPPORTED_VERSION,
            serial,
            name: None,
            url: None,
            email: None,
            keybase: None,
            twitter: None,
        }
    }

    /// Get the value of an optional field.
    pub fn field(&self, field: MetadataField) -> Option<&str> {
        match field {
            MetadataField::Name => self.name.as_deref(),
            MetadataField::Url => self.url.as_deref(),
            MetadataField::Email => self.email.as_deref(),
            MetadataField::Keybase => self.keybase.as_deref(),
            MetadataField::Twitter => self.twitter.as_deref(),
        }
    }

    /// Perform basic validity checks using the default limits.
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        self.validate_basic_with(&ValidationLimits::default())
    }

    /// Perform basic validity checks.
    ///
    /// Checks run in order: version, then name, url, email, keybase, twitter.
    /// For each field the length bound is checked before the syntax. An
    /// absent or empty field is always valid.
    pub fn validate_basic_with(&self, limits: &ValidationLimits) -> Result<(), ValidationError> {
        if self.v < limits.min_version || self.v > limits.max_version {
            return Err(ValidationError::UnsupportedVersion(self.v));
        }

        for field in MetadataField::ALL {
            let value = match self.field(field) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };

            let max = limits.max_length(field);
            if value.len() > max {
                return Err(ValidationError::FieldTooLong {
                    field,
                    len: value.len(),
                    max,
                });
            }

            let syntax = match field {
                MetadataField::Name => Ok(()),
                MetadataField::Url => validate_url(value),
                MetadataField::Email => validate_email(value),
                MetadataField::Keybase | MetadataField::Twitter => validate_handle(value),
            };
            syntax.map_err(|reason| ValidationError::MalformedField { field, reason })?;
        }

        Ok(())
    }

    /// Deterministic CBOR encoding. This is what gets signed.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        encode_metadata(self)
    }

    /// Decode from canonical CBOR bytes.
    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_metadata(bytes)
    }

    /// Compare by canonical encoding.
    pub fn canonical_eq(&self, other: &EntityMetadata) -> bool {
        self.canonical_bytes() == other.canonical_bytes()
    }

    /// Write a human-readable listing, one field per line.
    pub fn pretty_print<W: Write>(&self, prefix: &str, w: &mut W) -> io::Result<()> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        writeln!(w, "{prefix}Version: {}", self.v)?;
        writeln!(w, "{prefix}Serial:  {}", self.serial)?;
        writeln!(w, "{prefix}Name:    {}", opt(&self.name))?;
        writeln!(w, "{prefix}URL:     {}", opt(&self.url))?;
        writeln!(w, "{prefix}Email:   {}", opt(&self.email))?;
        writeln!(w, "{prefix}Keybase: {}", opt(&self.keybase))?;
        writeln!(w, "{prefix}Twitter: {}", opt(&self.twitter))?;
        Ok(())
    }
}
