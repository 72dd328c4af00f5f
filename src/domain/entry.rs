use crate::domain::catalog::CustomerSnapshot;
use crate::domain::money::{Amount, Money};
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Payment state of a ledger entry.
///
/// Transitions only move forward: `unpaid -> partial -> paid`, or
/// `unpaid -> paid` for a full payment in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// An entry is open while it still carries an outstanding balance.
    pub fn is_open(&self) -> bool {
        !matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        };
        f.write_str(s)
    }
}

/// A customer's outstanding balance record.
///
/// At most one open entry exists per customer; every sale for that customer
/// merges into it until the balance is settled. A paid entry is an immutable
/// historical record and a later sale opens a fresh entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub customer_id: String,
    /// Display snapshot captured at the most recent write.
    pub customer: CustomerSnapshot,
    /// Distinct product names accumulated across all merged sales.
    pub products: BTreeSet<String>,
    pub total: Money,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every write.
    #[serde(default)]
    pub version: u64,
}

impl LedgerEntry {
    /// Opens a fresh entry for a customer with no open balance.
    pub fn open(
        customer_id: impl Into<String>,
        customer: CustomerSnapshot,
        products: BTreeSet<String>,
        total: Money,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            customer,
            products,
            total,
            status: PaymentStatus::Unpaid,
            created_at: at,
            updated_at: at,
            version: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Merges a new sale's charges into this open entry.
    ///
    /// The product set only grows (set union, duplicates collapse) and a
    /// `partial` entry stays `partial`: the customer still owes the reduced
    /// balance plus the new charge.
    pub fn merge_sale(
        &mut self,
        sale_total: Money,
        products: impl IntoIterator<Item = String>,
        customer: CustomerSnapshot,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if !self.is_open() {
            return Err(LedgerError::Validation(
                "cannot merge a sale into a settled ledger entry".to_string(),
            ));
        }
        self.total += sale_total;
        self.products.extend(products);
        self.customer = customer;
        self.updated_at = at;
        Ok(())
    }

    /// Applies a partial payment. Rejects amounts exceeding the outstanding
    /// total; a settled entry has a zero balance, so any further payment
    /// against it is an overpayment as well.
    pub fn apply_payment(&mut self, amount: Amount, at: DateTime<Utc>) -> Result<(), LedgerError> {
        let remaining = self
            .total
            .checked_sub(amount)
            .ok_or(LedgerError::Overpayment {
                outstanding: self.total,
                requested: amount,
            })?;
        self.total = remaining;
        self.status = if remaining.is_zero() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        };
        self.updated_at = at;
        Ok(())
    }

    /// Settles the entry in full. Idempotent: settling a paid entry leaves it
    /// untouched.
    pub fn settle(&mut self, at: DateTime<Utc>) {
        if !self.is_open() {
            return;
        }
        self.total = Money::ZERO;
        self.status = PaymentStatus::Paid;
        self.updated_at = at;
    }
}
