//! The token transfer boundary.
//!
//! Token deposits are in-kind: the depositor must have pre-authorized the
//! engine to pull the tokens from the outside world. The engine only sees
//! this boundary as a capability — [`TokenGateway::pull`] either hands over
//! the tokens or refuses.

use std::collections::HashMap;

use dutchmarket_types::{AccountId, Asset, DutchmarketError, Result};
use rust_decimal::Decimal;

/// Capability interface for pulling pre-authorized token transfers.
pub trait TokenGateway {
    /// Pull `amount` of `token` from `from` into custody.
    ///
    /// # Errors
    /// Returns `TransferDenied` if the transfer was not authorized or the
    /// authorization is smaller than `amount`.
    fn pull(&mut self, from: AccountId, token: &str, amount: Decimal) -> Result<()>;
}

/// An allowance-based gateway mirroring the ERC-20 approve/transferFrom
/// handshake: depositors grant a spendable allowance per token, and each
/// deposit consumes from it.
#[derive(Debug, Default)]
pub struct AllowanceGateway {
    allowances: HashMap<(AccountId, Asset), Decimal>,
}

impl AllowanceGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant (or overwrite) the engine's allowance for `(owner, token)`.
    pub fn approve(&mut self, owner: AccountId, token: &str, amount: Decimal) {
        self.allowances.insert((owner, token.to_string()), amount);
    }

    /// Remaining allowance for `(owner, token)`. Zero if never approved.
    #[must_use]
    pub fn allowance(&self, owner: AccountId, token: &str) -> Decimal {
        self.allowances
            .get(&(owner, token.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl TokenGateway for AllowanceGateway {
    fn pull(&mut self, from: AccountId, token: &str, amount: Decimal) -> Result<()> {
        let allowance = self
            .allowances
            .get_mut(&(from, token.to_string()))
            .ok_or_else(|| DutchmarketError::TransferDenied {
                reason: format!("{from} has not approved any {token}"),
            })?;

        if *allowance < amount {
            return Err(DutchmarketError::TransferDenied {
                reason: format!("{from} approved {allowance} {token}, needed {amount}"),
            });
        }

        *allowance -= amount;
        Ok(())
    }
}
