use crate::domain::catalog::{CatalogLookup, Customer, Product};
use crate::domain::entry::LedgerEntry;
use crate::domain::ports::{LedgerFilter, LedgerStore, SaleLog, sort_newest_first};
use crate::domain::sale::RecordedSale;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct LedgerState {
    entries: HashMap<Uuid, LedgerEntry>,
    /// Secondary index: customer id -> id of the single open entry.
    open_by_customer: HashMap<String, Uuid>,
}

/// A thread-safe in-memory ledger store.
///
/// Every trait method takes the write or read lock for its whole body, so
/// each store operation is atomic; the optimistic version check inside
/// `update` serializes read-modify-write sequences across callers.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get(&self, id: Uuid) -> Result<Option<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state.entries.get(&id).cloned())
    }

    async fn find_open(&self, customer_id: &str) -> Result<Option<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .open_by_customer
            .get(customer_id)
            .and_then(|id| state.entries.get(id))
            .cloned())
    }

    async fn insert_open(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let mut state = self.state.write().await;
        if state.open_by_customer.contains_key(&entry.customer_id) {
            return Err(LedgerError::Conflict(format!(
                "customer {} already has an open ledger entry",
                entry.customer_id
            )));
        }
        state
            .open_by_customer
            .insert(entry.customer_id.clone(), entry.id);
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update(&self, mut entry: LedgerEntry) -> Result<LedgerEntry> {
        let mut state = self.state.write().await;
        let stored = state
            .entries
            .get(&entry.id)
            .ok_or_else(|| LedgerError::not_found("ledger entry", entry.id))?;
        if stored.version != entry.version {
            return Err(LedgerError::Conflict(format!(
                "ledger entry {} was modified concurrently",
                entry.id
            )));
        }

        entry.version += 1;
        if entry.is_open() {
            state
                .open_by_customer
                .insert(entry.customer_id.clone(), entry.id);
        } else {
            state.open_by_customer.remove(&entry.customer_id);
        }
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn list_open(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<LedgerEntry> = state
            .open_by_customer
            .values()
            .filter_map(|id| state.entries.get(id))
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

/// A thread-safe in-memory sale log, in insertion order.
#[derive(Default, Clone)]
pub struct InMemorySaleLog {
    sales: Arc<RwLock<Vec<RecordedSale>>>,
}

impl InMemorySaleLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleLog for InMemorySaleLog {
    async fn record(&self, sale: RecordedSale) -> Result<()> {
        let mut sales = self.sales.write().await;
        sales.push(sale);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<RecordedSale>> {
        let sales = self.sales.read().await;
        Ok(sales.clone())
    }
}

/// An in-memory catalog of products and customers, loaded once at startup.
/// The engine only ever reads from it.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    products: HashMap<String, Product>,
    customers: HashMap<String, Customer>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(products: Vec<Product>, customers: Vec<Customer>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            customers: customers.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn insert_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id.clone(), customer);
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn product(&self, product_id: &str) -> Result<Option<Product>> {
        Ok(self.products.get(product_id).cloned())
    }

    async fn customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        Ok(self.customers.get(customer_id).cloned())
    }
}
