//! # SellOffer — the descending-price sell posting
//!
//! A `SellOffer` posts a fixed quantity of one token at a unit price the
//! seller may only lower over time (the "Dutch" rule). The backing tokens
//! stay in the seller's ledger balance: the offer earmarks them at creation
//! and sufficiency is re-validated at match time.
//!
//! ## Lifecycle
//!
//! ```text
//!   active ──(fill to zero)──▶ inactive
//!     │
//!     └──(seller withdraws)──▶ inactive
//! ```
//!
//! `active = false` is terminal. The record is never deleted and stays
//! queryable by id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, DutchmarketError, OfferId, Result};

/// A standing sell offer in the Dutch market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellOffer {
    /// Monotonically assigned offer identifier (first offer is 1).
    pub id: OfferId,
    /// The account that posted the offer.
    pub seller: AccountId,
    /// The token being sold (one token per offer).
    pub token: Asset,
    /// Remaining sellable quantity. Only ever decreases, via fills.
    pub amount: Decimal,
    /// Unit price in native currency. Only ever decreases, via seller edits.
    pub price: Decimal,
    /// `false` once withdrawn or fully depleted. Terminal.
    pub active: bool,
    /// When the offer was posted.
    pub created_at: DateTime<Utc>,
}

impl SellOffer {
    /// Create a new active offer. Input validation (positive amount/price,
    /// seller balance) is the offer book's job.
    #[must_use]
    pub fn new(id: OfferId, seller: AccountId, token: Asset, amount: Decimal, price: Decimal) -> Self {
        Self {
            id,
            seller,
            token,
            amount,
            price,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Lower the offer's price. The new price must be positive and strictly
    /// below the current price.
    ///
    /// # Errors
    /// - `OfferInactive` if the offer is no longer active
    /// - `InvalidPrice` if `new_price <= 0`
    /// - `PriceNotDescending` if `new_price >= price`
    pub fn reduce_price(&mut self, new_price: Decimal) -> Result<()> {
        if !self.active {
            return Err(DutchmarketError::OfferInactive(self.id));
        }
        if new_price <= Decimal::ZERO {
            return Err(DutchmarketError::InvalidPrice { price: new_price });
        }
        if new_price >= self.price {
            return Err(DutchmarketError::PriceNotDescending {
                current: self.price,
                proposed: new_price,
            });
        }
        self.price = new_price;
        Ok(())
    }

    /// Withdraw the offer. Leaves `amount` untouched — the earmarked tokens
    /// were never moved out of the seller's balance.
    ///
    /// # Errors
    /// Returns `OfferInactive` if already withdrawn or depleted.
    pub fn deactivate(&mut self) -> Result<()> {
        if !self.active {
            return Err(DutchmarketError::OfferInactive(self.id));
        }
        self.active = false;
        Ok(())
    }

    /// Consume `amount` from the remaining quantity (matching-engine only).
    /// Depleting the offer to zero deactivates it.
    ///
    /// # Errors
    /// - `OfferInactive` if the offer is no longer active
    /// - `InsufficientOfferAmount` if `amount` exceeds the remainder
    pub fn fill(&mut self, amount: Decimal) -> Result<()> {
        if !self.active {
            return Err(DutchmarketError::OfferInactive(self.id));
        }
        if amount > self.amount {
            return Err(DutchmarketError::InsufficientOfferAmount {
                requested: amount,
                remaining: self.amount,
            });
        }
        self.amount -= amount;
        if self.amount.is_zero() {
            self.active = false;
        }
        Ok(())
    }
}

impl std::fmt::Display for SellOffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SellOffer[{}] {} x {} @ {} ({})",
            self.id,
            self.amount,
            self.token,
            self.price,
            if self.active { "active" } else { "inactive" },
        )
    }
}
