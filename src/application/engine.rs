use crate::domain::catalog::{CatalogBox, CustomerSnapshot};
use crate::domain::entry::LedgerEntry;
use crate::domain::money::{Amount, Money};
use crate::domain::ports::{LedgerFilter, LedgerStoreBox, SaleLogBox};
use crate::domain::sale::{RecordedSale, SaleLine};
use crate::error::{LedgerError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Upper bound on write attempts for one read-modify-write sequence; once
/// exhausted the conflict is surfaced to the caller.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// The customer ledger engine.
///
/// Pure decision logic over the stores it owns: given a sale or payment
/// event and the current store state, computes the resulting entry and
/// persists it as a single atomic write. Stateless between calls; all state
/// lives in the `LedgerStore`.
pub struct LedgerEngine {
    catalog: CatalogBox,
    store: LedgerStoreBox,
    sales: SaleLogBox,
}

impl LedgerEngine {
    pub fn new(catalog: CatalogBox, store: LedgerStoreBox, sales: SaleLogBox) -> Self {
        Self {
            catalog,
            store,
            sales,
        }
    }

    /// Posts a sale to the customer's ledger.
    ///
    /// Prices every line against the catalog at this moment, then either
    /// opens a fresh entry or merges the charges into the customer's single
    /// open entry. Concurrent postings for the same customer are serialized
    /// by optimistic version checks with a bounded retry.
    pub async fn post_sale(&self, customer_id: &str, lines: &[SaleLine]) -> Result<LedgerEntry> {
        if lines.is_empty() {
            return Err(LedgerError::Validation(
                "a sale must contain at least one line".to_string(),
            ));
        }
        if lines.iter().any(|line| line.quantity == 0) {
            return Err(LedgerError::Validation(
                "sale line quantity must be positive".to_string(),
            ));
        }

        let customer = self
            .catalog
            .customer(customer_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("customer", customer_id))?;
        let snapshot = CustomerSnapshot::from(&customer);

        let mut total = Decimal::ZERO;
        let mut products = BTreeSet::new();
        for line in lines {
            let product = self
                .catalog
                .product(&line.product_id)
                .await?
                .ok_or_else(|| LedgerError::not_found("product", &line.product_id))?;
            total += product.price * Decimal::from(line.quantity);
            products.insert(product.name);
        }
        let sale_total = Money::new(total)?;
        if sale_total.is_zero() {
            // A zero charge would open an entry that can never be settled:
            // it is not payable and a paid status requires a payment.
            return Err(LedgerError::Validation(
                "sale total must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let mut attempts = 0;
        let entry = loop {
            let result = match self.store.find_open(customer_id).await? {
                None => {
                    let entry = LedgerEntry::open(
                        customer_id,
                        snapshot.clone(),
                        products.clone(),
                        sale_total,
                        now,
                    );
                    self.store.insert_open(entry).await
                }
                Some(mut entry) => {
                    entry.merge_sale(
                        sale_total,
                        products.iter().cloned(),
                        snapshot.clone(),
                        now,
                    )?;
                    self.store.update(entry).await
                }
            };

            match result {
                Ok(entry) => break entry,
                Err(e) if e.is_conflict() => {
                    attempts += 1;
                    if attempts >= MAX_WRITE_ATTEMPTS {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        };

        // The entry write above is the commit point: if appending to the
        // sale log fails, the error surfaces but the posting has already
        // landed, and reports undercount that sale relative to the ledger.
        self.sales
            .record(RecordedSale::new(customer_id, lines.to_vec(), sale_total, now))
            .await?;
        Ok(entry)
    }

    /// Settles an entry in full. Idempotent: a second call on a paid entry
    /// succeeds without changing anything.
    pub async fn mark_paid(&self, entry_id: Uuid) -> Result<LedgerEntry> {
        let mut attempts = 0;
        loop {
            let mut entry = self
                .store
                .get(entry_id)
                .await?
                .ok_or_else(|| LedgerError::not_found("ledger entry", entry_id))?;
            if !entry.is_open() {
                return Ok(entry);
            }

            entry.settle(Utc::now());
            match self.store.update(entry).await {
                Ok(entry) => return Ok(entry),
                Err(e) if e.is_conflict() => {
                    attempts += 1;
                    if attempts >= MAX_WRITE_ATTEMPTS {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Applies a partial payment against an entry's outstanding balance.
    ///
    /// Amounts above the outstanding total are rejected outright; a caller
    /// wanting to settle in full should use `mark_paid`.
    pub async fn apply_partial_payment(&self, entry_id: Uuid, amount: Decimal) -> Result<LedgerEntry> {
        let amount = Amount::try_from(amount)?;

        let mut attempts = 0;
        loop {
            let mut entry = self
                .store
                .get(entry_id)
                .await?
                .ok_or_else(|| LedgerError::not_found("ledger entry", entry_id))?;
            entry.apply_payment(amount, Utc::now())?;

            match self.store.update(entry).await {
                Ok(entry) => return Ok(entry),
                Err(e) if e.is_conflict() => {
                    attempts += 1;
                    if attempts >= MAX_WRITE_ATTEMPTS {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The customer's current open entry, if any. Invariant: at most one.
    pub async fn open_entry(&self, customer_id: &str) -> Result<Option<LedgerEntry>> {
        self.store.find_open(customer_id).await
    }

    /// The open-balance view: one row per customer with an outstanding
    /// balance, newest mutation first.
    pub async fn list_open_balances(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        self.store.list_open(filter).await
    }

    /// All sales accepted so far, for the reporting aggregator.
    pub async fn recorded_sales(&self) -> Result<Vec<RecordedSale>> {
        self.sales.all().await
    }
}
