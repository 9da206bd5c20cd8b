//! Local account keys
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are never serialized to JSON
//! - Keys are never logged
//! - Only signatures and the public key leave this module

use super::Address;
use crate::{Error, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};

/// Authentication key scheme byte for a single Ed25519 key
const ED25519_SCHEME: u8 = 0x00;

/// An Ed25519 account held in process memory
///
/// Accounts are created locally, funded and observed remotely, and simply
/// dropped when no longer needed.
pub struct LocalAccount {
    signing_key: SigningKey,
    public_key: VerifyingKey,
    address: Address,
}

impl LocalAccount {
    /// Generate a fresh keypair. No network access.
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        Self::from_signing_key(SigningKey::generate(&mut csprng))
    }

    /// Restore an account from a hex-encoded 32-byte private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let bytes = hex::decode(key_hex)
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Wallet("Private key must be 32 bytes".to_string()))?;

        Ok(Self::from_signing_key(SigningKey::from_bytes(&bytes)))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = signing_key.verifying_key();
        let address = derive_address(&public_key);
        Self {
            signing_key,
            public_key,
            address,
        }
    }

    /// Get the account address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Public key as `0x`-prefixed hex
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key.as_bytes()))
    }

    /// Sign an arbitrary message (the node-provided signing message for transactions)
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

/// Address of a single-key Ed25519 account: `sha3_256(public_key || 0x00)`
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key.as_bytes());
    hasher.update([ED25519_SCHEME]);
    Address::new(hasher.finalize().into())
}

// Implement Debug manually to avoid exposing the signing key
impl std::fmt::Debug for LocalAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAccount")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;

    // Test key (DO NOT use outside tests!)
    const TEST_KEY: &str = "0x9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

    #[test]
    fn test_from_hex_is_deterministic() {
        let a = LocalAccount::from_hex(TEST_KEY).unwrap();
        let b = LocalAccount::from_hex(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.public_key_hex(), b.public_key_hex());
    }

    #[test]
    fn test_address_is_sha3_of_key_and_scheme() {
        let account = LocalAccount::from_hex(TEST_KEY).unwrap();

        let mut hasher = Sha3_256::new();
        hasher.update(account.public_key.as_bytes());
        hasher.update([0u8]);
        let expected: [u8; 32] = hasher.finalize().into();

        assert_eq!(account.address().as_bytes(), &expected);
    }

    #[test]
    fn test_generated_accounts_are_distinct() {
        let a = LocalAccount::generate();
        let b = LocalAccount::generate();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_signature_verifies() {
        let account = LocalAccount::generate();
        let signature = account.sign(b"signing message");
        assert!(account
            .public_key
            .verify(b"signing message", &signature)
            .is_ok());
    }

    #[test]
    fn test_rejects_short_key() {
        let err = LocalAccount::from_hex("0xabcd").unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let account = LocalAccount::from_hex(TEST_KEY).unwrap();
        let debug_str = format!("{:?}", account);

        assert!(!debug_str.contains("9bf49a6a"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
