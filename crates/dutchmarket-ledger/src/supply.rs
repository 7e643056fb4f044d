//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced over the ledger:
//! ```text
//! ∀ asset: Σ per-account balances == Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! Matching moves value between accounts and never changes the totals,
//! so the identity must hold after every settlement. If it ever breaks,
//! something has gone catastrophically wrong inside the engine.

use std::collections::HashMap;

use dutchmarket_types::{Asset, DutchmarketError, Result};
use rust_decimal::Decimal;

/// Tracks deposits and withdrawals per asset (and for the native currency)
/// so the ledger can prove it never creates or destroys value.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    /// Total token deposits per asset since genesis.
    token_deposits: HashMap<Asset, Decimal>,
    /// Total token withdrawals per asset since genesis.
    token_withdrawals: HashMap<Asset, Decimal>,
    /// Total native-currency deposits since genesis.
    native_deposits: Decimal,
    /// Total native-currency withdrawals since genesis.
    native_withdrawals: Decimal,
}

impl SupplyConservation {
    /// Create a new supply conservation tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a token deposit.
    pub fn record_token_deposit(&mut self, token: &str, amount: Decimal) {
        *self
            .token_deposits
            .entry(token.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Record a token withdrawal.
    pub fn record_token_withdrawal(&mut self, token: &str, amount: Decimal) {
        *self
            .token_withdrawals
            .entry(token.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Record a native-currency deposit.
    pub fn record_native_deposit(&mut self, amount: Decimal) {
        self.native_deposits += amount;
    }

    /// Record a native-currency withdrawal.
    pub fn record_native_withdrawal(&mut self, amount: Decimal) {
        self.native_withdrawals += amount;
    }

    /// Expected total supply of a token: deposits - withdrawals.
    #[must_use]
    pub fn expected_token_supply(&self, token: &str) -> Decimal {
        let deposited = self
            .token_deposits
            .get(token)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let withdrawn = self
            .token_withdrawals
            .get(token)
            .copied()
            .unwrap_or(Decimal::ZERO);
        deposited - withdrawn
    }

    /// Expected total native supply: deposits - withdrawals.
    #[must_use]
    pub fn expected_native_supply(&self) -> Decimal {
        self.native_deposits - self.native_withdrawals
    }

    /// Verify that the actual token supply (sum of all account balances)
    /// matches the expected supply.
    ///
    /// # Errors
    /// Returns [`DutchmarketError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify_token(&self, token: &str, actual_supply: Decimal) -> Result<()> {
        let expected = self.expected_token_supply(token);
        if actual_supply != expected {
            return Err(DutchmarketError::SupplyInvariantViolation {
                reason: format!(
                    "Token {token}: actual supply {actual_supply} != expected {expected}"
                ),
            });
        }
        Ok(())
    }

    /// Verify the native-currency supply against the expected total.
    ///
    /// # Errors
    /// Returns [`DutchmarketError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify_native(&self, actual_supply: Decimal) -> Result<()> {
        let expected = self.expected_native_supply();
        if actual_supply != expected {
            return Err(DutchmarketError::SupplyInvariantViolation {
                reason: format!(
                    "Native currency: actual supply {actual_supply} != expected {expected}"
                ),
            });
        }
        Ok(())
    }
}
