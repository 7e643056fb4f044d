//! The sell-offer book.
//!
//! Owns every [`SellOffer`] ever created plus the monotonic id counter.
//! Offers are never deleted: withdrawal and depletion deactivate the record
//! but leave it queryable by id.
//!
//! Escrow is by earmark — creating an offer validates that the seller's
//! ledger balance covers the amount, but the tokens stay in place. The
//! matching engine re-validates sufficiency at fill time.

use std::collections::HashMap;

use dutchmarket_ledger::Ledger;
use dutchmarket_types::{AccountId, Asset, DutchmarketError, OfferId, Result, SellOffer};
use rust_decimal::Decimal;

/// Owns the set of sell offers and assigns their ids.
#[derive(Debug, Default)]
pub struct OfferBook {
    offers: HashMap<OfferId, SellOffer>,
    /// Id to assign to the next offer. Never reused.
    next_id: u64,
}

impl OfferBook {
    /// Create a new empty offer book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offers: HashMap::new(),
            next_id: OfferId::FIRST.0,
        }
    }

    /// Post a new descending-price sell offer.
    ///
    /// The seller's ledger token balance must cover `amount`; the balance is
    /// only validated, not moved.
    ///
    /// # Errors
    /// - `InvalidAmount` / `InvalidPrice` if non-positive
    /// - `InsufficientBalance` if the seller holds less than `amount`
    pub fn create(
        &mut self,
        ledger: &Ledger,
        seller: AccountId,
        token: Asset,
        amount: Decimal,
        price: Decimal,
    ) -> Result<OfferId> {
        if amount <= Decimal::ZERO {
            return Err(DutchmarketError::InvalidAmount { amount });
        }
        if price <= Decimal::ZERO {
            return Err(DutchmarketError::InvalidPrice { price });
        }
        let held = ledger.token_balance(seller, &token);
        if held < amount {
            return Err(DutchmarketError::InsufficientBalance {
                needed: amount,
                available: held,
            });
        }

        let id = OfferId(self.next_id);
        self.next_id += 1;
        self.offers
            .insert(id, SellOffer::new(id, seller, token, amount, price));

        tracing::debug!(offer = %id, seller = %seller, "Sell offer created");
        Ok(id)
    }

    /// Lower an active offer's price. Seller only; strictly descending.
    ///
    /// # Errors
    /// `UnknownOffer`, `NotOwner`, `OfferInactive`, `InvalidPrice`, or
    /// `PriceNotDescending`.
    pub fn reduce_price(
        &mut self,
        offer_id: OfferId,
        caller: AccountId,
        new_price: Decimal,
    ) -> Result<&SellOffer> {
        let offer = self
            .offers
            .get_mut(&offer_id)
            .ok_or(DutchmarketError::UnknownOffer(offer_id))?;
        if offer.seller != caller {
            return Err(DutchmarketError::NotOwner(offer_id));
        }
        offer.reduce_price(new_price)?;
        Ok(offer)
    }

    /// Withdraw an active offer. Seller only; no balance change — the
    /// earmarked tokens never left the seller's ledger balance.
    ///
    /// # Errors
    /// `UnknownOffer`, `NotOwner`, or `OfferInactive`.
    pub fn withdraw(&mut self, offer_id: OfferId, caller: AccountId) -> Result<&SellOffer> {
        let offer = self
            .offers
            .get_mut(&offer_id)
            .ok_or(DutchmarketError::UnknownOffer(offer_id))?;
        if offer.seller != caller {
            return Err(DutchmarketError::NotOwner(offer_id));
        }
        offer.deactivate()?;
        Ok(offer)
    }

    /// Consume `amount` from an offer's remainder. Matching-engine internal;
    /// deactivates the offer if it depletes to zero.
    ///
    /// # Errors
    /// `UnknownOffer`, `OfferInactive`, or `InsufficientOfferAmount`.
    pub fn fill(&mut self, offer_id: OfferId, amount: Decimal) -> Result<&SellOffer> {
        let offer = self
            .offers
            .get_mut(&offer_id)
            .ok_or(DutchmarketError::UnknownOffer(offer_id))?;
        offer.fill(amount)?;
        Ok(offer)
    }

    /// Look up an offer by id. Inactive offers remain queryable.
    ///
    /// # Errors
    /// Returns `UnknownOffer` if no offer was ever created with this id.
    pub fn get(&self, offer_id: OfferId) -> Result<&SellOffer> {
        self.offers
            .get(&offer_id)
            .ok_or(DutchmarketError::UnknownOffer(offer_id))
    }

    /// Number of offers ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    /// Returns `true` if no offer was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}
