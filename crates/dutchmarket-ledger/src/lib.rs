//! # dutchmarket-ledger
//!
//! **Escrow ledger plane**: custodial balance accounting for native currency
//! and fungible tokens.
//!
//! ## Architecture
//!
//! 1. **Ledger**: per-account native and per-(account, token) balances;
//!    deposits, withdrawals, and the atomic settlement move
//! 2. **TokenGateway / AllowanceGateway**: the pre-authorized token
//!    transfer boundary (approve, then pull)
//! 3. **SupplyConservation**: proves Σ balances == deposits - withdrawals
//!    for every asset after any sequence of operations
//!
//! The ledger exposes no standalone credit/debit surface — value moves only
//! through deposits, withdrawals, and [`Ledger::settle`].

pub mod gateway;
pub mod ledger;
pub mod supply;

pub use gateway::{AllowanceGateway, TokenGateway};
pub use ledger::Ledger;
pub use supply::SupplyConservation;
