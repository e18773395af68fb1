//! Payment model for the allocation protocol.
//!
//! OpenDrop does not process payments; it accepts a [`PaymentInstrument`]
//! of a declared kind, validates its value against the phase's unit price,
//! and splits exactly the owed amount into the launch's revenue ledger.
//! The remainder travels back to the caller as change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OpendropError, Result};

/// Type alias for payment kind identifiers (e.g., "SUI", "USDC", "POINTS").
pub type PaymentKind = String;

/// A spendable value of one payment kind.
///
/// Deliberately not `Clone`: an instrument models custody of value, and
/// duplicating it would mint money. Value moves between instruments only
/// through [`PaymentInstrument::split`] and [`PaymentInstrument::merge`].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstrument {
    kind: PaymentKind,
    value: Decimal,
}

impl PaymentInstrument {
    /// Create an instrument holding `value` of `kind`.
    #[must_use]
    pub fn new(kind: impl Into<PaymentKind>, value: Decimal) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }

    /// An empty instrument of the given kind.
    #[must_use]
    pub fn zero(kind: impl Into<PaymentKind>) -> Self {
        Self::new(kind, Decimal::ZERO)
    }

    /// The payment kind this instrument carries.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The value currently held.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Whether the instrument holds nothing.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Atomically deduct `amount` and return it as a new instrument of the
    /// same kind.
    ///
    /// # Errors
    /// Returns [`OpendropError::SplitExceedsValue`] if `amount` exceeds the
    /// held value; the instrument is unchanged in that case.
    pub fn split(&mut self, amount: Decimal) -> Result<Self> {
        if amount > self.value {
            return Err(OpendropError::SplitExceedsValue {
                requested: amount,
                available: self.value,
            });
        }
        self.value -= amount;
        Ok(Self {
            kind: self.kind.clone(),
            value: amount,
        })
    }

    /// Absorb another instrument of the same kind.
    ///
    /// # Errors
    /// Returns [`OpendropError::PaymentKindMismatch`] if the kinds differ;
    /// neither instrument is changed in that case.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        if other.kind != self.kind {
            return Err(OpendropError::PaymentKindMismatch {
                expected: self.kind.clone(),
                actual: other.kind,
            });
        }
        self.value += other.value;
        Ok(())
    }
}
