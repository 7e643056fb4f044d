//! Error types for the DutchMarket engine.
//!
//! All errors use the `DM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Ledger / balance errors
//! - 2xx: Offer book errors
//! - 3xx: Blinded bid / commitment errors
//! - 4xx: Matching errors
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors
//!
//! Every error is synchronous and local to the call that raised it; state
//! is only mutated as the final step of a successful call, so a returned
//! error always means "nothing changed".

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{BidId, OfferId};

/// Central error enum for all DutchMarket operations.
#[derive(Debug, Error)]
pub enum DutchmarketError {
    // =================================================================
    // Ledger / Balance Errors (1xx)
    // =================================================================
    /// A deposit, withdrawal, or offer amount was zero or negative.
    #[error("DM_ERR_100: Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    /// Not enough balance to perform the operation.
    #[error("DM_ERR_101: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// The token gateway refused to pull the deposit (no authorization,
    /// or authorization smaller than the requested amount).
    #[error("DM_ERR_102: Token transfer denied: {reason}")]
    TransferDenied { reason: String },

    // =================================================================
    // Offer Book Errors (2xx)
    // =================================================================
    /// No offer was ever created with this id.
    #[error("DM_ERR_200: Unknown offer: {0}")]
    UnknownOffer(OfferId),

    /// The offer was withdrawn or fully depleted.
    #[error("DM_ERR_201: Offer inactive: {0}")]
    OfferInactive(OfferId),

    /// The caller is not the offer's seller.
    #[error("DM_ERR_202: Not the owner of {0}")]
    NotOwner(OfferId),

    /// A price edit must be strictly below the current price.
    #[error("DM_ERR_203: Price not descending: {proposed} >= current {current}")]
    PriceNotDescending { current: Decimal, proposed: Decimal },

    /// An offer or bid price was zero or negative.
    #[error("DM_ERR_204: Invalid price: {price}")]
    InvalidPrice { price: Decimal },

    /// A fill requested more than the offer's remaining amount.
    #[error("DM_ERR_205: Insufficient offer amount: requested {requested}, remaining {remaining}")]
    InsufficientOfferAmount {
        requested: Decimal,
        remaining: Decimal,
    },

    // =================================================================
    // Blinded Bid / Commitment Errors (3xx)
    // =================================================================
    /// No bid was ever submitted with this id.
    #[error("DM_ERR_300: Unknown bid: {0}")]
    UnknownBid(BidId),

    /// The bid was already opened; opening is a one-time transition.
    #[error("DM_ERR_301: Bid already opened: {0}")]
    AlreadyOpened(BidId),

    /// The submitted commitment hash is malformed (all-zero digest).
    #[error("DM_ERR_302: Invalid commitment: zero hash")]
    InvalidCommitment,

    /// The revealed terms do not hash to the stored commitment.
    /// The bid stays unopened; the caller may retry with corrected values.
    #[error("DM_ERR_303: Commitment mismatch for {0}")]
    CommitmentMismatch(BidId),

    /// The reveal signature does not verify under the bidder's key.
    #[error("DM_ERR_304: Invalid reveal signature for {0}")]
    InvalidSignature(BidId),

    // =================================================================
    // Matching Errors (4xx)
    // =================================================================
    /// The revealed price is below the offer's current ask.
    #[error("DM_ERR_400: Price below ask: bid {bid} < ask {ask}")]
    PriceBelowAsk { ask: Decimal, bid: Decimal },

    /// The revealed amount exceeds the offer's remaining amount.
    #[error("DM_ERR_401: Amount exceeds offer: requested {requested}, remaining {remaining}")]
    AmountExceedsOffer {
        requested: Decimal,
        remaining: Decimal,
    },

    // =================================================================
    // Invariant Violations (8xx)
    // =================================================================
    /// Supply conservation invariant violated — critical safety alert.
    #[error("DM_ERR_800: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("DM_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DutchmarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = DutchmarketError::UnknownOffer(OfferId(3));
        let msg = format!("{err}");
        assert!(msg.starts_with("DM_ERR_200"), "Got: {msg}");
        assert!(msg.contains("offer:3"));
    }

    #[test]
    fn insufficient_balance_display() {
        let err = DutchmarketError::InsufficientBalance {
            needed: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("DM_ERR_101"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn price_not_descending_display() {
        let err = DutchmarketError::PriceNotDescending {
            current: Decimal::new(9, 0),
            proposed: Decimal::new(9, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("DM_ERR_203"));
        assert!(msg.contains("9 >= current 9"));
    }

    #[test]
    fn all_errors_have_dm_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(DutchmarketError::InvalidAmount {
                amount: Decimal::ZERO,
            }),
            Box::new(DutchmarketError::OfferInactive(OfferId(1))),
            Box::new(DutchmarketError::AlreadyOpened(BidId(1))),
            Box::new(DutchmarketError::InvalidCommitment),
            Box::new(DutchmarketError::CommitmentMismatch(BidId(2))),
            Box::new(DutchmarketError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("DM_ERR_"),
                "Error missing DM_ERR_ prefix: {msg}"
            );
        }
    }
}
