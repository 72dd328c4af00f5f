use crate::domain::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of a sale: a product reference and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: u32,
}

impl SaleLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A sale as accepted by the engine, priced at posting time.
///
/// Immutable once recorded; the reporting aggregator consumes these to build
/// daily and monthly totals without touching ledger semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSale {
    pub id: Uuid,
    pub customer_id: String,
    pub lines: Vec<SaleLine>,
    pub total: Money,
    pub recorded_at: DateTime<Utc>,
}

impl RecordedSale {
    pub fn new(
        customer_id: impl Into<String>,
        lines: Vec<SaleLine>,
        total: Money,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            lines,
            total,
            recorded_at,
        }
    }
}
