//! Commitment and reveal primitives for sealed bidding.
//!
//! A bidder hides their terms behind a two-stage digest, computed off-engine:
//!
//! ```text
//! message    = SHA-256(domain ‖ amount ‖ price ‖ token ‖ offer_id)
//! commitment = SHA-256(domain ‖ message ‖ signature(message))
//! ```
//!
//! Binding the signature into the commitment makes the sealed bid both
//! front-running resistant (terms are hidden) and replay resistant (only
//! the bidder can produce a signature their own key verifies at reveal).
//!
//! The engine never signs anything. `AccountId` is the bidder's ed25519
//! public key, so "the signature recovers to the bidder" is realized as
//! strict verification under that key.

use ed25519_dalek::{Signature, VerifyingKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, OfferId};

/// Domain separator for the revealed-terms message.
const MESSAGE_DOMAIN: &[u8] = b"dutchmarket:bid:v1:";
/// Domain separator for the commitment digest.
const COMMITMENT_DOMAIN: &[u8] = b"dutchmarket:commit:v1:";

/// A fixed-width sealed-bid commitment digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentHash(pub [u8; 32]);

impl CommitmentHash {
    /// The all-zero digest is the one malformed value rejected at submission.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl std::fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Canonical message digest over a bid's revealed terms.
///
/// Fields are length-unambiguous: decimal fields render through
/// `to_string` and every field is followed by a `:` separator.
#[must_use]
pub fn bid_message(amount: Decimal, price: Decimal, token: &str, offer_id: OfferId) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(MESSAGE_DOMAIN);
    hasher.update(amount.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(price.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    hasher.update(b":");
    hasher.update(offer_id.0.to_le_bytes());
    hasher.finalize().into()
}

/// Commitment digest binding a message and its signature.
#[must_use]
pub fn commitment_hash(message: &[u8; 32], signature: &Signature) -> CommitmentHash {
    let mut hasher = Sha256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(message);
    hasher.update(signature.to_bytes());
    CommitmentHash(hasher.finalize().into())
}

/// Verify that `signature` over `message` belongs to `bidder`.
///
/// Returns `false` for a malformed key or a signature that does not verify.
/// Strict verification rejects malleable / mixed-order signatures.
#[must_use]
pub fn verify_reveal(bidder: AccountId, message: &[u8; 32], signature: &Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(bidder.as_bytes()) else {
        return false;
    };
    key.verify_strict(message, signature).is_ok()
}
