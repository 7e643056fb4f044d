//! The commitment registry.
//!
//! Stores every submitted [`BlindedBid`] keyed by its monotonic id. The
//! registry knows nothing about offers — a commitment only meets the offer
//! book when the bid is opened. Submitted bids are immutable except for the
//! one-time opening transition.

use std::collections::HashMap;

use dutchmarket_types::{
    AccountId, BidId, BlindedBid, CommitmentHash, DutchmarketError, ResolvedBid, Result,
};

/// Owns the set of blinded bids and assigns their ids.
#[derive(Debug, Default)]
pub struct CommitmentRegistry {
    bids: HashMap<BidId, BlindedBid>,
    /// Id to assign to the next bid. Never reused.
    next_id: u64,
}

impl CommitmentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: HashMap::new(),
            next_id: BidId::FIRST.0,
        }
    }

    /// Record a sealed commitment. The hash's content cannot be validated
    /// here — that is the point of blinding; only existence and bidder
    /// association are stored.
    ///
    /// # Errors
    /// Returns `InvalidCommitment` for the all-zero digest.
    pub fn submit(&mut self, commitment: CommitmentHash, bidder: AccountId) -> Result<BidId> {
        if commitment.is_zero() {
            return Err(DutchmarketError::InvalidCommitment);
        }

        let id = BidId(self.next_id);
        self.next_id += 1;
        self.bids.insert(id, BlindedBid::new(id, bidder, commitment));

        tracing::debug!(bid = %id, bidder = %bidder, "Blinded bid submitted");
        Ok(id)
    }

    /// Look up a bid by id.
    ///
    /// # Errors
    /// Returns `UnknownBid` if no bid was ever submitted with this id.
    pub fn get(&self, bid_id: BidId) -> Result<&BlindedBid> {
        self.bids
            .get(&bid_id)
            .ok_or(DutchmarketError::UnknownBid(bid_id))
    }

    /// Transition a bid to opened with its resolved terms. One-time only.
    ///
    /// # Errors
    /// Returns `UnknownBid` or `AlreadyOpened`.
    pub fn open(&mut self, bid_id: BidId, resolved: ResolvedBid) -> Result<&BlindedBid> {
        let bid = self
            .bids
            .get_mut(&bid_id)
            .ok_or(DutchmarketError::UnknownBid(bid_id))?;
        bid.mark_opened(resolved)?;
        Ok(bid)
    }

    /// Number of bids ever submitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bids.len()
    }

    /// Returns `true` if no bid was ever submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}
