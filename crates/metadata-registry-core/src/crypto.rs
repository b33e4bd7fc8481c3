//! Cryptographic primitives for the metadata registry.
//!
//! Wraps Ed25519 signing with strong types. Every signature is taken over a
//! message prefixed by a [`SignatureContext`], so a signature produced for one
//! kind of statement can never be replayed as another kind.

use ed25519_dalek::{Signature as DalekSignature, Signer as _, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Domain separation context used for entity metadata statements.
pub const ENTITY_METADATA_CONTEXT: &str = "metadata-registry/entity/v1";

/// Maximum length of a signature context in bytes.
pub const MAX_CONTEXT_LENGTH: usize = 255;

/// A domain separation tag mixed into every signed message.
///
/// The prepared message is `len(context) || context || message`, with the
/// length encoded as a single byte.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignatureContext(String);

impl SignatureContext {
    /// Create a new context. Must be non-empty and at most 255 bytes.
    pub fn new(context: impl Into<String>) -> Result<Self> {
        let context = context.into();
        if context.is_empty() {
            return Err(CoreError::InvalidContext("context must not be empty".into()));
        }
        if context.len() > MAX_CONTEXT_LENGTH {
            return Err(CoreError::InvalidContext(format!(
                "context too long (length: {} max: {})",
                context.len(),
                MAX_CONTEXT_LENGTH
            )));
        }
        Ok(Self(context))
    }

    /// The context used for entity metadata statements.
    pub fn entity_metadata() -> Self {
        Self(ENTITY_METADATA_CONTEXT.to_string())
    }

    /// Get the context string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the message that is actually signed.
    pub fn prepare_message(&self, message: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.0.len() + message.len());
        // Length fits in a byte, enforced by the constructor.
        buf.push(self.0.len() as u8);
        buf.extend_from_slice(self.0.as_bytes());
        buf.extend_from_slice(message);
        buf
    }
}

impl Default for SignatureContext {
    fn default() -> Self {
        Self::entity_metadata()
    }
}

impl TryFrom<String> for SignatureContext {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SignatureContext> for String {
    fn from(ctx: SignatureContext) -> Self {
        ctx.0
    }
}

impl fmt::Debug for SignatureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureContext({:?})", self.0)
    }
}

impl fmt::Display for SignatureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 32-byte Ed25519 public key.
///
/// This is the entity identifier: it names the statement file in the
/// registry and verifies the statement's signature.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex::serde")] pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Verify a signature over a message under the given context.
    pub fn verify(
        &self,
        context: &SignatureContext,
        message: &[u8],
        signature: &Signature,
    ) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig = DalekSignature::from_bytes(&signature.0);

        verifying_key
            .verify_strict(&context.prepare_message(message), &sig)
            .map_err(|_| CoreError::SignatureFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "hex::serde")] pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// Anything that can produce context-separated signatures.
///
/// Hardware or remote signers implement this; [`Keypair`] is the in-process
/// implementation.
pub trait Signer {
    /// The public key matching the signatures this signer produces.
    fn public_key(&self) -> PublicKey;

    /// Sign `message` under `context`.
    fn sign(&self, context: &SignatureContext, message: &[u8]) -> Result<Signature>;
}

/// An Ed25519 keypair.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create from a hex-encoded 32-byte seed. Surrounding whitespace is ignored.
    pub fn from_hex_seed(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.trim())?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self::from_seed(&seed))
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Signer for Keypair {
    fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    fn sign(&self, context: &SignatureContext, message: &[u8]) -> Result<Signature> {
        let sig = self.signing_key.sign(&context.prepare_message(message));
        Ok(Signature(sig.to_bytes()))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let ctx = SignatureContext::entity_metadata();
        let message = b"hello world";
        let signature = keypair.sign(&ctx, message).unwrap();

        // Valid signature should verify
        keypair
            .public_key()
            .verify(&ctx, message, &signature)
            .expect("valid signature should verify");

        // Tampered message should fail
        let tampered = b"hello worlD";
        assert!(keypair.public_key().verify(&ctx, tampered, &signature).is_err());
    }

    #[test]
    fn test_context_separates_signatures() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let entity = SignatureContext::entity_metadata();
        let other = SignatureContext::new("metadata-registry/other/v1").unwrap();

        let signature = keypair.sign(&entity, b"payload").unwrap();
        assert!(matches!(
            keypair.public_key().verify(&other, b"payload", &signature),
            Err(CoreError::SignatureFailed)
        ));
        assert_ne!(signature, keypair.sign(&other, b"payload").unwrap());
    }

    #[test]
    fn test_context_bounds() {
        assert!(SignatureContext::new("").is_err());
        assert!(SignatureContext::new("x".repeat(255)).is_ok());
        assert!(SignatureContext::new("x".repeat(256)).is_err());
    }

    #[test]
    fn test_prepare_message_is_length_prefixed() {
        let ctx = SignatureContext::new("ab").unwrap();
        assert_eq!(ctx.prepare_message(b"c"), vec![2, b'a', b'b', b'c']);
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.seed(), seed);
    }

    #[test]
    fn test_keypair_from_hex_seed() {
        let kp = Keypair::from_hex_seed(&format!("{}\n", hex::encode([7u8; 32]))).unwrap();
        assert_eq!(kp.public_key(), Keypair::from_seed(&[7u8; 32]).public_key());
        assert!(Keypair::from_hex_seed("abcd").is_err());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let keypair = Keypair::generate();
        let pk = keypair.public_key();
        let recovered: PublicKey = pk.to_hex().parse().unwrap();
        assert_eq!(pk, recovered);
        assert!(PublicKey::from_hex("00ff").is_err());
    }

    #[test]
    fn test_public_key_serde_is_hex() {
        let pk = PublicKey::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }
}
