//! # dutchmarket-engine
//!
//! **Matching plane**: the commitment registry and the `DutchMarket`
//! facade that ties ledger, offer book, and registry together.
//!
//! ## Bid Flow
//!
//! ```text
//! deposit → create_sell_offer → submit_blinded_bid (sealed)
//!         → open_blinded_bid: commitment + signature checks
//!         → trade validation against the live ask
//!         → atomic ledger settlement + offer fill + bid opening
//! ```
//!
//! Every operation is a single serialized transition: all validation
//! precedes the first mutation, so an error means nothing changed.

pub mod market;
pub mod registry;

pub use market::DutchMarket;
pub use registry::CommitmentRegistry;
