//! # BlindedBid — the sealed-bid commitment record
//!
//! A `BlindedBid` stores an opaque commitment hash binding the bidder's
//! hidden terms (amount, price, token, target offer) together with their
//! signature over those terms. At submission time nothing about the terms
//! can be validated — that is the point of blinding; only existence and
//! bidder association are recorded.
//!
//! ## Lifecycle
//!
//! ```text
//!   unopened ──(successful reveal)──▶ opened
//! ```
//!
//! Opening is the only transition and it is terminal: a bid can be opened
//! at most once. A reveal that fails verification leaves the bid unopened
//! and retry-able.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, BidId, CommitmentHash, DutchmarketError, OfferId, Result};

/// The terms a bid resolved to when it was opened and matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBid {
    /// The sell offer the bid matched against.
    pub offer_id: OfferId,
    /// Quantity of tokens transferred.
    pub amount: Decimal,
    /// Settlement price — the offer's ask at open time, not the revealed
    /// bid price.
    pub price: Decimal,
}

/// A sealed bid awaiting (at most one) reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindedBid {
    /// Monotonically assigned bid identifier (first bid is 1).
    pub id: BidId,
    /// The account that submitted the commitment.
    pub bidder: AccountId,
    /// `Hash(message ‖ signature)` where `message` hashes the hidden terms.
    pub commitment: CommitmentHash,
    /// `true` once the bid has been successfully opened. Terminal.
    pub opened: bool,
    /// Populated exactly once, on successful opening.
    pub resolved: Option<ResolvedBid>,
    /// When the commitment was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl BlindedBid {
    /// Record a freshly submitted commitment.
    #[must_use]
    pub fn new(id: BidId, bidder: AccountId, commitment: CommitmentHash) -> Self {
        Self {
            id,
            bidder,
            commitment,
            opened: false,
            resolved: None,
            submitted_at: Utc::now(),
        }
    }

    /// Transition to opened with the terms the bid resolved to.
    ///
    /// # Errors
    /// Returns `AlreadyOpened` if the bid was opened before; the resolved
    /// fields are left untouched in that case.
    pub fn mark_opened(&mut self, resolved: ResolvedBid) -> Result<()> {
        if self.opened {
            return Err(DutchmarketError::AlreadyOpened(self.id));
        }
        self.opened = true;
        self.resolved = Some(resolved);
        Ok(())
    }
}

impl std::fmt::Display for BlindedBid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BlindedBid[{}] {} {}",
            self.id,
            self.bidder,
            if self.opened { "opened" } else { "sealed" },
        )
    }
}
