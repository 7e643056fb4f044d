//! # dutchmarket-types
//!
//! Shared types for the **DutchMarket** custodial market engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`OfferId`], [`BidId`], [`Asset`]
//! - **Offer model**: [`SellOffer`]
//! - **Bid model**: [`BlindedBid`], [`ResolvedBid`]
//! - **Commitment primitives**: [`CommitmentHash`], [`bid_message`],
//!   [`commitment_hash`], [`verify_reveal`]
//! - **Settlement model**: [`Settlement`]
//! - **Event model**: [`MarketEvent`], [`EventSink`], [`NullSink`], [`MemorySink`]
//! - **Errors**: [`DutchmarketError`] with `DM_ERR_` prefix codes

pub mod bid;
pub mod commitment;
pub mod error;
pub mod event;
pub mod ids;
pub mod offer;
pub mod settlement;

// Re-export all primary types at crate root for ergonomic imports:
//   use dutchmarket_types::{SellOffer, BlindedBid, CommitmentHash, ...};

pub use bid::*;
pub use commitment::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use offer::*;
pub use settlement::*;
