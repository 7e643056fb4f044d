//! The `DutchMarket` facade — every public engine operation in one place.
//!
//! Owns the ledger, the token gateway, the offer book, and the commitment
//! registry, and wires them together for the one non-trivial operation:
//! opening a blinded bid. Each method is a single atomically-applied state
//! transition — all validation happens before the first mutation, so any
//! error leaves the engine exactly as it was.
//!
//! Mutating operations take `&mut self`; the surrounding environment is
//! expected to serialize calls (there is no internal locking, no background
//! work, and no cancellation).

use chrono::Utc;
use dutchmarket_book::OfferBook;
use dutchmarket_ledger::{AllowanceGateway, Ledger};
use dutchmarket_types::{
    AccountId, Asset, BidId, BlindedBid, CommitmentHash, DutchmarketError, EventSink, MarketEvent,
    NullSink, OfferId, ResolvedBid, Result, SellOffer, Settlement, bid_message, commitment_hash,
    verify_reveal,
};
use ed25519_dalek::Signature;
use rust_decimal::Decimal;

use crate::registry::CommitmentRegistry;

/// The custodial Dutch-auction market engine.
///
/// Generic over the event sink so observers can plug in; correctness never
/// depends on what the sink does with an event.
#[derive(Debug)]
pub struct DutchMarket<S: EventSink = NullSink> {
    ledger: Ledger,
    gateway: AllowanceGateway,
    book: OfferBook,
    registry: CommitmentRegistry,
    sink: S,
}

impl DutchMarket<NullSink> {
    /// Create a market that discards its events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(NullSink)
    }
}

impl Default for DutchMarket<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> DutchMarket<S> {
    /// Create a market publishing to the given sink.
    #[must_use]
    pub fn with_sink(sink: S) -> Self {
        Self {
            ledger: Ledger::new(),
            gateway: AllowanceGateway::new(),
            book: OfferBook::new(),
            registry: CommitmentRegistry::new(),
            sink,
        }
    }

    /// The event sink, for observers that want to read back what happened.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Read-only view of the ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // =================================================================
    // Ledger surface
    // =================================================================

    /// Deposit native currency. Returns the new balance.
    pub fn deposit_native(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        let balance = self.ledger.deposit_native(account, amount)?;
        tracing::info!(account = %account, amount = %amount, "Native deposit");
        self.sink.publish(MarketEvent::Deposited {
            account,
            token: None,
            amount,
        });
        Ok(balance)
    }

    /// Authorize the engine to pull up to `amount` of `token` from `owner`
    /// on a later deposit. Overwrites any earlier authorization.
    pub fn approve_token(&mut self, owner: AccountId, token: &str, amount: Decimal) {
        self.gateway.approve(owner, token, amount);
    }

    /// Deposit tokens, consuming a prior authorization. Returns the new
    /// balance of `token`.
    pub fn deposit_token(
        &mut self,
        account: AccountId,
        token: &str,
        amount: Decimal,
    ) -> Result<Decimal> {
        let balance = self
            .ledger
            .deposit_token(&mut self.gateway, account, token, amount)?;
        tracing::info!(account = %account, token, amount = %amount, "Token deposit");
        self.sink.publish(MarketEvent::Deposited {
            account,
            token: Some(token.to_string()),
            amount,
        });
        Ok(balance)
    }

    /// Withdraw native currency. Returns the new balance.
    pub fn withdraw_native(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        let balance = self.ledger.withdraw_native(account, amount)?;
        tracing::info!(account = %account, amount = %amount, "Native withdrawal");
        self.sink.publish(MarketEvent::Withdrawn {
            account,
            token: None,
            amount,
        });
        Ok(balance)
    }

    /// Withdraw tokens. Returns the new balance of `token`.
    pub fn withdraw_token(
        &mut self,
        account: AccountId,
        token: &str,
        amount: Decimal,
    ) -> Result<Decimal> {
        let balance = self.ledger.withdraw_token(account, token, amount)?;
        tracing::info!(account = %account, token, amount = %amount, "Token withdrawal");
        self.sink.publish(MarketEvent::Withdrawn {
            account,
            token: Some(token.to_string()),
            amount,
        });
        Ok(balance)
    }

    /// The account's native balance. Zero for unknown accounts.
    #[must_use]
    pub fn native_balance(&self, account: AccountId) -> Decimal {
        self.ledger.native_balance(account)
    }

    /// The account's balance of `token`. Zero for unknown accounts.
    #[must_use]
    pub fn token_balance(&self, account: AccountId, token: &str) -> Decimal {
        self.ledger.token_balance(account, token)
    }

    // =================================================================
    // Offer surface
    // =================================================================

    /// Post a descending-price sell offer. Returns its id.
    pub fn create_sell_offer(
        &mut self,
        seller: AccountId,
        token: Asset,
        amount: Decimal,
        price: Decimal,
    ) -> Result<OfferId> {
        let offer_id = self
            .book
            .create(&self.ledger, seller, token.clone(), amount, price)?;
        tracing::info!(offer = %offer_id, seller = %seller, amount = %amount, price = %price, "Sell offer created");
        self.sink.publish(MarketEvent::SellOfferCreated {
            offer_id,
            seller,
            token,
            amount,
            price,
        });
        Ok(offer_id)
    }

    /// Lower an active offer's price (seller only, strictly descending).
    /// Returns the updated offer.
    pub fn reduce_sell_offer_price(
        &mut self,
        offer_id: OfferId,
        caller: AccountId,
        new_price: Decimal,
    ) -> Result<SellOffer> {
        let offer = self.book.reduce_price(offer_id, caller, new_price)?.clone();
        tracing::info!(offer = %offer_id, new_price = %new_price, "Offer price reduced");
        self.sink.publish(MarketEvent::SellOfferPriceReduced {
            offer_id,
            new_price,
        });
        Ok(offer)
    }

    /// Withdraw an active offer (seller only). Returns the now-inactive offer.
    pub fn withdraw_sell_offer(&mut self, offer_id: OfferId, caller: AccountId) -> Result<SellOffer> {
        let offer = self.book.withdraw(offer_id, caller)?.clone();
        tracing::info!(offer = %offer_id, "Offer withdrawn");
        self.sink
            .publish(MarketEvent::SellOfferWithdrawn { offer_id });
        Ok(offer)
    }

    /// Look up an offer by id. Inactive offers remain queryable.
    pub fn offer(&self, offer_id: OfferId) -> Result<&SellOffer> {
        self.book.get(offer_id)
    }

    // =================================================================
    // Bid surface
    // =================================================================

    /// Record a sealed commitment for `bidder`. Returns the assigned bid id.
    pub fn submit_blinded_bid(
        &mut self,
        commitment: CommitmentHash,
        bidder: AccountId,
    ) -> Result<BidId> {
        let bid_id = self.registry.submit(commitment, bidder)?;
        tracing::info!(bid = %bid_id, bidder = %bidder, "Blinded bid submitted");
        self.sink
            .publish(MarketEvent::BlindedBidSubmitted { bid_id });
        Ok(bid_id)
    }

    /// Look up a bid by id.
    pub fn bid(&self, bid_id: BidId) -> Result<&BlindedBid> {
        self.registry.get(bid_id)
    }

    /// Reveal and match a blinded bid against a sell offer.
    ///
    /// The revealed terms must hash (together with `signature`) to the
    /// stored commitment, and the signature must verify under the bidder's
    /// key. A valid reveal at or above the live ask settles at the **ask**:
    /// the bidder is charged the offer's current price, never their own.
    ///
    /// Verification failures (`CommitmentMismatch`, `InvalidSignature`)
    /// leave the bid unopened and retry-able. Any error leaves every
    /// balance, the offer, and the bid untouched.
    ///
    /// # Errors
    /// `UnknownBid`, `AlreadyOpened`, `UnknownOffer`, `OfferInactive`,
    /// `InvalidAmount`, `InvalidPrice`, `CommitmentMismatch`,
    /// `InvalidSignature`, `AmountExceedsOffer`, `PriceBelowAsk`, or
    /// `InsufficientBalance`.
    pub fn open_blinded_bid(
        &mut self,
        bid_id: BidId,
        offer_id: OfferId,
        amount: Decimal,
        price: Decimal,
        signature: &Signature,
    ) -> Result<Settlement> {
        if amount <= Decimal::ZERO {
            return Err(DutchmarketError::InvalidAmount { amount });
        }
        if price <= Decimal::ZERO {
            return Err(DutchmarketError::InvalidPrice { price });
        }

        // 1. Bid lifecycle guards.
        let bid = self.registry.get(bid_id)?;
        if bid.opened {
            return Err(DutchmarketError::AlreadyOpened(bid_id));
        }
        let bidder = bid.bidder;
        let commitment = bid.commitment;

        // 2. Offer guards — the message binds the offer's token, so the
        //    offer must be fetched before the commitment can be checked.
        let offer = self.book.get(offer_id)?;
        if !offer.active {
            return Err(DutchmarketError::OfferInactive(offer_id));
        }
        let seller = offer.seller;
        let token = offer.token.clone();
        let ask = offer.price;
        let remaining = offer.amount;

        // 3. Commitment and signature verification. Failure here leaves
        //    the bid unopened; the caller may retry with corrected values.
        let message = bid_message(amount, price, &token, offer_id);
        if commitment_hash(&message, signature) != commitment {
            tracing::warn!(bid = %bid_id, "Commitment mismatch on reveal");
            return Err(DutchmarketError::CommitmentMismatch(bid_id));
        }
        if !verify_reveal(bidder, &message, signature) {
            tracing::warn!(bid = %bid_id, bidder = %bidder, "Reveal signature invalid");
            return Err(DutchmarketError::InvalidSignature(bid_id));
        }

        // 4. Trade validation: within the remainder, at or above the ask.
        if amount > remaining {
            return Err(DutchmarketError::AmountExceedsOffer {
                requested: amount,
                remaining,
            });
        }
        if price < ask {
            return Err(DutchmarketError::PriceBelowAsk { ask, bid: price });
        }

        // 5. Settlement executes at the ask, protecting the seller's floor
        //    and never charging the bidder more than they revealed.
        let total = ask
            .checked_mul(amount)
            .ok_or_else(|| DutchmarketError::Internal("price * amount overflow".into()))?;

        // 6. Atomic mutation. The ledger validates both debits (the bidder's
        //    native total and the seller's earmarked tokens) before moving
        //    anything; the fill and the open were validated above and
        //    cannot fail after this point.
        self.ledger.settle(bidder, seller, &token, amount, total)?;
        self.book.fill(offer_id, amount)?;
        self.registry.open(
            bid_id,
            ResolvedBid {
                offer_id,
                amount,
                price: ask,
            },
        )?;

        let settlement = Settlement {
            offer_id,
            bid_id,
            buyer: bidder,
            seller,
            token,
            amount,
            price: ask,
            total,
            executed_at: Utc::now(),
        };

        tracing::info!(
            offer = %offer_id,
            bid = %bid_id,
            amount = %amount,
            price = %ask,
            total = %total,
            "Trade settled"
        );

        // 7. Best-effort notifications.
        self.sink.publish(MarketEvent::BidOpened { bid_id, offer_id });
        self.sink.publish(MarketEvent::TradeSettled {
            offer_id,
            bid_id,
            amount,
            price: ask,
            buyer: bidder,
            seller,
        });

        Ok(settlement)
    }

    // =================================================================
    // Conservation
    // =================================================================

    /// Verify supply conservation for `token` and for the native currency.
    pub fn verify_supply(&self, token: &str) -> Result<()> {
        self.ledger.verify_token_supply(token)?;
        self.ledger.verify_native_supply()
    }
}
