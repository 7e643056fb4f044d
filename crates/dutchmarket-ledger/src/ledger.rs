//! The custodial escrow ledger.
//!
//! Holds every participant's native-currency balance and per-token balances.
//! All mutation goes through deposit/withdraw or the atomic [`Ledger::settle`]
//! used by the matching engine; the raw credit/debit primitives are private
//! so no caller can move value outside those paths.
//!
//! Balances never go negative: every debit is validated against the current
//! balance before any state changes.

use std::collections::HashMap;

use dutchmarket_types::{AccountId, Asset, DutchmarketError, Result};
use rust_decimal::Decimal;

use crate::gateway::TokenGateway;
use crate::supply::SupplyConservation;

/// The source of truth for all balance state.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Per-account native-currency balances.
    native: HashMap<AccountId, Decimal>,
    /// Per-(account, token) balances.
    tokens: HashMap<(AccountId, Asset), Decimal>,
    /// Deposit/withdrawal totals backing the conservation invariant.
    supply: SupplyConservation,
}

impl Ledger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Deposits
    // =================================================================

    /// Credit a native-currency deposit. The enclosing environment is
    /// trusted to have actually received the funds.
    ///
    /// Returns the account's new native balance.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount <= 0`.
    pub fn deposit_native(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        Self::require_positive(amount)?;
        let balance = self.native.entry(account).or_insert(Decimal::ZERO);
        *balance += amount;
        self.supply.record_native_deposit(amount);
        Ok(*balance)
    }

    /// Pull a pre-authorized token transfer through the gateway and credit it.
    ///
    /// Returns the account's new balance of `token`.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0`
    /// - `TransferDenied` if the gateway refuses the pull (nothing is credited)
    pub fn deposit_token(
        &mut self,
        gateway: &mut dyn TokenGateway,
        account: AccountId,
        token: &str,
        amount: Decimal,
    ) -> Result<Decimal> {
        Self::require_positive(amount)?;
        gateway.pull(account, token, amount)?;
        let balance = self
            .tokens
            .entry((account, token.to_string()))
            .or_insert(Decimal::ZERO);
        *balance += amount;
        self.supply.record_token_deposit(token, amount);
        Ok(*balance)
    }

    // =================================================================
    // Withdrawals
    // =================================================================

    /// Withdraw native currency back to the account's owner.
    ///
    /// Returns the account's new native balance.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientBalance` if the account holds less than `amount`
    pub fn withdraw_native(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        Self::require_positive(amount)?;
        self.debit_native(account, amount)?;
        self.supply.record_native_withdrawal(amount);
        Ok(self.native_balance(account))
    }

    /// Withdraw tokens back to the account's owner.
    ///
    /// Tokens earmarked by a live sell offer are *not* protected — this is
    /// the earmark escrow model, and the open call re-validates sufficiency.
    ///
    /// Returns the account's new balance of `token`.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientBalance` if the account holds less than `amount`
    pub fn withdraw_token(
        &mut self,
        account: AccountId,
        token: &str,
        amount: Decimal,
    ) -> Result<Decimal> {
        Self::require_positive(amount)?;
        self.debit_token(account, token, amount)?;
        self.supply.record_token_withdrawal(token, amount);
        Ok(self.token_balance(account, token))
    }

    // =================================================================
    // Reads
    // =================================================================

    /// The account's native balance. Zero for unknown accounts.
    #[must_use]
    pub fn native_balance(&self, account: AccountId) -> Decimal {
        self.native.get(&account).copied().unwrap_or(Decimal::ZERO)
    }

    /// The account's balance of `token`. Zero for unknown accounts.
    #[must_use]
    pub fn token_balance(&self, account: AccountId, token: &str) -> Decimal {
        self.tokens
            .get(&(account, token.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// The atomic four-way balance move of a matched trade:
    /// buyer pays `native_total`, seller pays `token_amount` of `token`,
    /// each receives the other leg.
    ///
    /// Both debits are validated before any mutation, so a failure leaves
    /// every balance exactly as it was — no partial settlement is observable.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the buyer lacks the native total or
    /// the seller lacks the token amount.
    pub fn settle(
        &mut self,
        buyer: AccountId,
        seller: AccountId,
        token: &str,
        token_amount: Decimal,
        native_total: Decimal,
    ) -> Result<()> {
        let buyer_native = self.native_balance(buyer);
        if buyer_native < native_total {
            return Err(DutchmarketError::InsufficientBalance {
                needed: native_total,
                available: buyer_native,
            });
        }
        let seller_tokens = self.token_balance(seller, token);
        if seller_tokens < token_amount {
            return Err(DutchmarketError::InsufficientBalance {
                needed: token_amount,
                available: seller_tokens,
            });
        }

        // Validated above: none of these can underflow.
        self.debit_native(buyer, native_total)?;
        self.credit_native(seller, native_total);
        self.debit_token(seller, token, token_amount)?;
        self.credit_token(buyer, token, token_amount);

        tracing::debug!(
            buyer = %buyer,
            seller = %seller,
            token,
            token_amount = %token_amount,
            native_total = %native_total,
            "Ledger settled"
        );
        Ok(())
    }

    // =================================================================
    // Conservation
    // =================================================================

    /// Verify that the summed token balances equal deposits - withdrawals.
    pub fn verify_token_supply(&self, token: &str) -> Result<()> {
        let actual: Decimal = self
            .tokens
            .iter()
            .filter(|((_, t), _)| t == token)
            .map(|(_, balance)| *balance)
            .sum();
        self.supply.verify_token(token, actual)
    }

    /// Verify that the summed native balances equal deposits - withdrawals.
    pub fn verify_native_supply(&self) -> Result<()> {
        let actual: Decimal = self.native.values().copied().sum();
        self.supply.verify_native(actual)
    }

    // =================================================================
    // Internal primitives — only reachable through settlement
    // =================================================================

    fn credit_native(&mut self, account: AccountId, amount: Decimal) {
        *self.native.entry(account).or_insert(Decimal::ZERO) += amount;
    }

    fn debit_native(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let balance = self.native.entry(account).or_insert(Decimal::ZERO);
        if *balance < amount {
            return Err(DutchmarketError::InsufficientBalance {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn credit_token(&mut self, account: AccountId, token: &str, amount: Decimal) {
        *self
            .tokens
            .entry((account, token.to_string()))
            .or_insert(Decimal::ZERO) += amount;
    }

    fn debit_token(&mut self, account: AccountId, token: &str, amount: Decimal) -> Result<()> {
        let balance = self
            .tokens
            .entry((account, token.to_string()))
            .or_insert(Decimal::ZERO);
        if *balance < amount {
            return Err(DutchmarketError::InsufficientBalance {
                needed: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn require_positive(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(DutchmarketError::InvalidAmount { amount });
        }
        Ok(())
    }
}
