//! State-transition notifications for external observers.
//!
//! The engine publishes an event after every successful public operation.
//! Delivery is notify-and-forget: a sink may drop, buffer, or forward
//! events, and nothing about engine correctness depends on what it does.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Asset, BidId, OfferId};

/// A state transition worth telling observers about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// Funds entered the ledger. `token` is `None` for native currency.
    Deposited {
        account: AccountId,
        token: Option<Asset>,
        amount: Decimal,
    },
    /// Funds left the ledger. `token` is `None` for native currency.
    Withdrawn {
        account: AccountId,
        token: Option<Asset>,
        amount: Decimal,
    },
    /// A seller posted a new offer.
    SellOfferCreated {
        offer_id: OfferId,
        seller: AccountId,
        token: Asset,
        amount: Decimal,
        price: Decimal,
    },
    /// A seller lowered an offer's price.
    SellOfferPriceReduced {
        offer_id: OfferId,
        new_price: Decimal,
    },
    /// A seller withdrew an offer.
    SellOfferWithdrawn { offer_id: OfferId },
    /// A sealed commitment was recorded.
    BlindedBidSubmitted { bid_id: BidId },
    /// A bid was successfully opened.
    BidOpened { bid_id: BidId, offer_id: OfferId },
    /// A match settled.
    TradeSettled {
        offer_id: OfferId,
        bid_id: BidId,
        amount: Decimal,
        price: Decimal,
        buyer: AccountId,
        seller: AccountId,
    },
}

/// Where the engine pushes its events. Best-effort by contract: `publish`
/// is infallible from the engine's point of view.
pub trait EventSink {
    fn publish(&mut self, event: MarketEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: MarketEvent) {}
}

/// Appends every event to an in-memory log. Used by observers and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<MarketEvent>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for MemorySink {
    fn publish(&mut self, event: MarketEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let mut sink = MemorySink::new();
        sink.publish(MarketEvent::BlindedBidSubmitted { bid_id: BidId(1) });
        sink.publish(MarketEvent::SellOfferWithdrawn {
            offer_id: OfferId(2),
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.events()[0],
            MarketEvent::BlindedBidSubmitted { bid_id: BidId(1) }
        );
    }

    #[test]
    fn null_sink_discards() {
        let mut sink = NullSink;
        sink.publish(MarketEvent::SellOfferWithdrawn {
            offer_id: OfferId(1),
        });
    }

    #[test]
    fn event_serde_roundtrip() {
        let event = MarketEvent::TradeSettled {
            offer_id: OfferId(1),
            bid_id: BidId(2),
            amount: Decimal::new(50, 0),
            price: Decimal::new(10, 0),
            buyer: AccountId([2u8; 32]),
            seller: AccountId([1u8; 32]),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
