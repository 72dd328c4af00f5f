use crate::domain::money::Money;
use crate::domain::sale::RecordedSale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total of all sales that fell in one period (a day or a month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub period: String,
    pub total: Money,
}

/// Sale totals per calendar day (UTC), newest day first.
pub fn daily_totals(sales: &[RecordedSale]) -> Vec<PeriodTotal> {
    totals_by_period(sales, "%Y-%m-%d")
}

/// Sale totals per calendar month (UTC), newest month first.
pub fn monthly_totals(sales: &[RecordedSale]) -> Vec<PeriodTotal> {
    totals_by_period(sales, "%Y-%m")
}

fn totals_by_period(sales: &[RecordedSale], format: &str) -> Vec<PeriodTotal> {
    let mut buckets: BTreeMap<String, Money> = BTreeMap::new();
    for sale in sales {
        let period = sale.recorded_at.format(format).to_string();
        *buckets.entry(period).or_insert(Money::ZERO) += sale.total;
    }

    buckets
        .into_iter()
        .rev()
        .map(|(period, total)| PeriodTotal { period, total })
        .collect()
}
