//! End-to-end scenarios across the whole engine.
//!
//! These tests exercise the full custodial lifecycle:
//! Ledger (deposits) -> Offer Book -> Commitment Registry -> Matching ->
//! Ledger (settlement), verifying balances, offer state, bid state, the
//! event stream, and supply conservation along the way.

use dutchmarket_engine::DutchMarket;
use dutchmarket_types::{
    AccountId, BidId, CommitmentHash, DutchmarketError, MarketEvent, MemorySink, OfferId,
    bid_message, commitment_hash,
};
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rust_decimal::Decimal;

const TOKEN: &str = "MTKN";

/// A market participant with a signing key and its derived account id.
struct Participant {
    signing: SigningKey,
    account: AccountId,
}

impl Participant {
    fn new() -> Self {
        let signing = SigningKey::generate(&mut OsRng);
        let account = AccountId::from_pubkey(signing.verifying_key().to_bytes());
        Self { signing, account }
    }

    /// Build the sealed commitment for the given terms and submit it.
    fn submit_bid(
        &self,
        market: &mut DutchMarket<MemorySink>,
        amount: Decimal,
        price: Decimal,
        offer_id: OfferId,
    ) -> (BidId, Signature) {
        let message = bid_message(amount, price, TOKEN, offer_id);
        let signature = self.signing.sign(&message);
        let bid_id = market
            .submit_blinded_bid(commitment_hash(&message, &signature), self.account)
            .expect("Bid submission should succeed");
        (bid_id, signature)
    }
}

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

// =============================================================================
// Test: deposits land and are readable
// =============================================================================
#[test]
fn e2e_deposits() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let alice = Participant::new();
    let bob = Participant::new();

    market.deposit_native(alice.account, dec(1)).unwrap();
    assert_eq!(market.native_balance(alice.account), dec(1));

    market.approve_token(bob.account, TOKEN, dec(1));
    market.deposit_token(bob.account, TOKEN, dec(1)).unwrap();
    assert_eq!(market.token_balance(bob.account, TOKEN), dec(1));

    // Unapproved deposit is refused with nothing credited.
    let carol = Participant::new();
    let err = market.deposit_token(carol.account, TOKEN, dec(1)).unwrap_err();
    assert!(matches!(err, DutchmarketError::TransferDenied { .. }));
    assert_eq!(market.token_balance(carol.account, TOKEN), Decimal::ZERO);

    market.verify_supply(TOKEN).unwrap();
}

// =============================================================================
// Test: offer lifecycle — create, descend, withdraw
// =============================================================================
#[test]
fn e2e_offer_lifecycle() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let seller = Participant::new();

    market.approve_token(seller.account, TOKEN, dec(150));
    market.deposit_token(seller.account, TOKEN, dec(150)).unwrap();

    let offer_id = market
        .create_sell_offer(seller.account, TOKEN.into(), dec(100), dec(10))
        .unwrap();
    assert_eq!(offer_id, OfferId(1));

    let offer = market
        .reduce_sell_offer_price(offer_id, seller.account, dec(9))
        .unwrap();
    assert_eq!(offer.price, dec(9));

    // The same price again is not a descent.
    let err = market
        .reduce_sell_offer_price(offer_id, seller.account, dec(9))
        .unwrap_err();
    assert!(matches!(err, DutchmarketError::PriceNotDescending { .. }));

    let offer = market.withdraw_sell_offer(offer_id, seller.account).unwrap();
    assert!(!offer.active);
    assert_eq!(offer.amount, dec(100));

    let err = market
        .withdraw_sell_offer(offer_id, seller.account)
        .unwrap_err();
    assert!(matches!(err, DutchmarketError::OfferInactive(_)));

    // Withdrawal never touched the seller's balance.
    assert_eq!(market.token_balance(seller.account, TOKEN), dec(150));
}

// =============================================================================
// Test: submit, open, and match a blinded bid
// =============================================================================
#[test]
fn e2e_blinded_bid_match() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let seller = Participant::new();
    let buyer = Participant::new();

    market.approve_token(seller.account, TOKEN, dec(150));
    market.deposit_token(seller.account, TOKEN, dec(150)).unwrap();
    let offer_id = market
        .create_sell_offer(seller.account, TOKEN.into(), dec(100), dec(10))
        .unwrap();

    market.deposit_native(buyer.account, dec(500)).unwrap();

    let (bid_id, signature) = buyer.submit_bid(&mut market, dec(50), dec(10), offer_id);
    let settlement = market
        .open_blinded_bid(bid_id, offer_id, dec(50), dec(10), &signature)
        .unwrap();

    // 50 tokens at the 10 ask: 500 native moves buyer -> seller.
    assert_eq!(settlement.amount, dec(50));
    assert_eq!(settlement.price, dec(10));
    assert_eq!(settlement.total, dec(500));
    assert_eq!(market.token_balance(seller.account, TOKEN), dec(100));
    assert_eq!(market.token_balance(buyer.account, TOKEN), dec(50));
    assert_eq!(market.native_balance(seller.account), dec(500));
    assert_eq!(market.native_balance(buyer.account), Decimal::ZERO);

    // Offer half-filled and still live.
    let offer = market.offer(offer_id).unwrap();
    assert_eq!(offer.amount, dec(50));
    assert!(offer.active);

    // Bid resolved and terminal.
    let bid = market.bid(bid_id).unwrap();
    assert!(bid.opened);
    let resolved = bid.resolved.unwrap();
    assert_eq!(resolved.offer_id, offer_id);
    assert_eq!(resolved.amount, dec(50));
    assert_eq!(resolved.price, dec(10));

    market.verify_supply(TOKEN).unwrap();
}

// =============================================================================
// Test: settlement price is the ask, not the revealed bid price
// =============================================================================
#[test]
fn e2e_settles_at_ask_after_price_descent() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let seller = Participant::new();
    let buyer = Participant::new();

    market.approve_token(seller.account, TOKEN, dec(100));
    market.deposit_token(seller.account, TOKEN, dec(100)).unwrap();
    let offer_id = market
        .create_sell_offer(seller.account, TOKEN.into(), dec(100), dec(10))
        .unwrap();

    market.deposit_native(buyer.account, dec(1000)).unwrap();

    // Buyer commits at 10 while the ask is 10; the seller then descends to 8.
    let (bid_id, signature) = buyer.submit_bid(&mut market, dec(50), dec(10), offer_id);
    market
        .reduce_sell_offer_price(offer_id, seller.account, dec(8))
        .unwrap();

    let settlement = market
        .open_blinded_bid(bid_id, offer_id, dec(50), dec(10), &signature)
        .unwrap();

    // Charged 8 per unit, not the revealed 10.
    assert_eq!(settlement.price, dec(8));
    assert_eq!(settlement.total, dec(400));
    assert_eq!(market.native_balance(buyer.account), dec(600));
    assert_eq!(market.native_balance(seller.account), dec(400));
}

// =============================================================================
// Test: failed reveal is retry-able; successful open is terminal
// =============================================================================
#[test]
fn e2e_reveal_retry_then_terminal() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let seller = Participant::new();
    let buyer = Participant::new();

    market.approve_token(seller.account, TOKEN, dec(100));
    market.deposit_token(seller.account, TOKEN, dec(100)).unwrap();
    let offer_id = market
        .create_sell_offer(seller.account, TOKEN.into(), dec(100), dec(10))
        .unwrap();
    market.deposit_native(buyer.account, dec(500)).unwrap();

    let (bid_id, signature) = buyer.submit_bid(&mut market, dec(50), dec(10), offer_id);

    // Wrong revealed price: commitment mismatch, no state change.
    let err = market
        .open_blinded_bid(bid_id, offer_id, dec(50), dec(11), &signature)
        .unwrap_err();
    assert!(matches!(err, DutchmarketError::CommitmentMismatch(_)));
    assert!(!market.bid(bid_id).unwrap().opened);
    assert_eq!(market.native_balance(buyer.account), dec(500));
    assert_eq!(market.offer(offer_id).unwrap().amount, dec(100));

    // Corrected reveal succeeds.
    market
        .open_blinded_bid(bid_id, offer_id, dec(50), dec(10), &signature)
        .unwrap();

    // A second open of the same bid never mutates anything.
    let err = market
        .open_blinded_bid(bid_id, offer_id, dec(50), dec(10), &signature)
        .unwrap_err();
    assert!(matches!(err, DutchmarketError::AlreadyOpened(_)));
    assert_eq!(market.native_balance(buyer.account), Decimal::ZERO);
    assert_eq!(market.offer(offer_id).unwrap().amount, dec(50));
}

// =============================================================================
// Test: two buyers deplete one offer; second overfill attempt fails
// =============================================================================
#[test]
fn e2e_sequential_fills_deplete_offer() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let seller = Participant::new();
    let bob = Participant::new();
    let carol = Participant::new();

    market.approve_token(seller.account, TOKEN, dec(100));
    market.deposit_token(seller.account, TOKEN, dec(100)).unwrap();
    let offer_id = market
        .create_sell_offer(seller.account, TOKEN.into(), dec(100), dec(10))
        .unwrap();

    market.deposit_native(bob.account, dec(600)).unwrap();
    market.deposit_native(carol.account, dec(600)).unwrap();

    let (bob_bid, bob_sig) = bob.submit_bid(&mut market, dec(60), dec(10), offer_id);
    market
        .open_blinded_bid(bob_bid, offer_id, dec(60), dec(10), &bob_sig)
        .unwrap();
    assert_eq!(market.offer(offer_id).unwrap().amount, dec(40));

    // Carol committed to 60 but only 40 remain.
    let (carol_bid, carol_sig) = carol.submit_bid(&mut market, dec(60), dec(10), offer_id);
    let err = market
        .open_blinded_bid(carol_bid, offer_id, dec(60), dec(10), &carol_sig)
        .unwrap_err();
    assert!(matches!(err, DutchmarketError::AmountExceedsOffer { .. }));

    // A fresh commitment for the remainder drains the offer.
    let (carol_bid2, carol_sig2) = carol.submit_bid(&mut market, dec(40), dec(10), offer_id);
    market
        .open_blinded_bid(carol_bid2, offer_id, dec(40), dec(10), &carol_sig2)
        .unwrap();

    let offer = market.offer(offer_id).unwrap();
    assert_eq!(offer.amount, Decimal::ZERO);
    assert!(!offer.active);

    assert_eq!(market.token_balance(bob.account, TOKEN), dec(60));
    assert_eq!(market.token_balance(carol.account, TOKEN), dec(40));
    assert_eq!(market.native_balance(seller.account), dec(1000));

    market.verify_supply(TOKEN).unwrap();
}

// =============================================================================
// Test: the event stream mirrors every transition
// =============================================================================
#[test]
fn e2e_event_stream() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let seller = Participant::new();
    let buyer = Participant::new();

    market.approve_token(seller.account, TOKEN, dec(100));
    market.deposit_token(seller.account, TOKEN, dec(100)).unwrap();
    let offer_id = market
        .create_sell_offer(seller.account, TOKEN.into(), dec(100), dec(10))
        .unwrap();
    market
        .reduce_sell_offer_price(offer_id, seller.account, dec(9))
        .unwrap();
    market.deposit_native(buyer.account, dec(500)).unwrap();
    let (bid_id, signature) = buyer.submit_bid(&mut market, dec(50), dec(9), offer_id);
    market
        .open_blinded_bid(bid_id, offer_id, dec(50), dec(9), &signature)
        .unwrap();

    let events = market.sink().events();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            MarketEvent::Deposited { .. } => "deposited",
            MarketEvent::Withdrawn { .. } => "withdrawn",
            MarketEvent::SellOfferCreated { .. } => "offer_created",
            MarketEvent::SellOfferPriceReduced { .. } => "price_reduced",
            MarketEvent::SellOfferWithdrawn { .. } => "offer_withdrawn",
            MarketEvent::BlindedBidSubmitted { .. } => "bid_submitted",
            MarketEvent::BidOpened { .. } => "bid_opened",
            MarketEvent::TradeSettled { .. } => "trade_settled",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "deposited",
            "offer_created",
            "price_reduced",
            "deposited",
            "bid_submitted",
            "bid_opened",
            "trade_settled",
        ]
    );

    assert!(matches!(
        events.last().unwrap(),
        MarketEvent::TradeSettled { price, amount, .. }
            if *price == dec(9) && *amount == dec(50)
    ));
}

// =============================================================================
// Test: a malformed commitment never enters the registry
// =============================================================================
#[test]
fn e2e_zero_commitment_rejected() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let buyer = Participant::new();
    let err = market
        .submit_blinded_bid(CommitmentHash([0u8; 32]), buyer.account)
        .unwrap_err();
    assert!(matches!(err, DutchmarketError::InvalidCommitment));
    assert!(market.bid(BidId(1)).is_err());
}

// =============================================================================
// Test: withdrawals round-trip through the ledger and the supply invariant
// =============================================================================
#[test]
fn e2e_withdrawals_and_conservation() {
    let mut market = DutchMarket::with_sink(MemorySink::new());
    let alice = Participant::new();

    market.deposit_native(alice.account, dec(10)).unwrap();
    let balance = market.withdraw_native(alice.account, dec(4)).unwrap();
    assert_eq!(balance, dec(6));

    market.approve_token(alice.account, TOKEN, dec(20));
    market.deposit_token(alice.account, TOKEN, dec(20)).unwrap();
    let balance = market.withdraw_token(alice.account, TOKEN, dec(5)).unwrap();
    assert_eq!(balance, dec(15));

    let err = market.withdraw_native(alice.account, dec(7)).unwrap_err();
    assert!(matches!(err, DutchmarketError::InsufficientBalance { .. }));

    market.verify_supply(TOKEN).unwrap();
}
