//! The settlement record produced by a successful bid opening.
//!
//! A [`Settlement`] is the immutable record of one atomic match: tokens
//! moved seller → buyer, native currency moved buyer → seller, the offer
//! depleted, the bid opened.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, BidId, OfferId};

/// The outcome of a matched bid.
///
/// `price` is always the offer's ask at open time — a bidder who revealed
/// a higher price is only charged the ask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// The offer that was (partially or fully) filled.
    pub offer_id: OfferId,
    /// The bid that was opened.
    pub bid_id: BidId,
    /// The bidder — receives tokens, pays native currency.
    pub buyer: AccountId,
    /// The offer's seller — receives native currency, pays tokens.
    pub seller: AccountId,
    /// The token traded.
    pub token: Asset,
    /// Quantity of tokens transferred.
    pub amount: Decimal,
    /// Settlement unit price (the ask).
    pub price: Decimal,
    /// Native currency moved: `price × amount`.
    pub total: Decimal,
    /// When the match settled.
    pub executed_at: DateTime<Utc>,
}

impl std::fmt::Display for Settlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Settlement[{} x {}] {} {} @ {} = {}",
            self.offer_id, self.bid_id, self.amount, self.token, self.price, self.total,
        )
    }
}
