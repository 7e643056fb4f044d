//! # dutchmarket-book
//!
//! **Offer plane**: the descending-price sell-offer book.
//!
//! Owns offer lifecycle — create (with ledger earmark check), price
//! reduction, withdrawal, and fills driven by the matching engine.
//! Offers deactivate but are never deleted, so every id stays queryable.

pub mod offer_book;

pub use offer_book::OfferBook;
