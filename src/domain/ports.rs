use crate::domain::entry::LedgerEntry;
use crate::domain::sale::RecordedSale;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Filter for the open-balance view.
#[derive(Debug, Default, Clone)]
pub struct LedgerFilter {
    /// Exact match on the customer identifier.
    pub customer_id: Option<String>,
    /// Case-insensitive substring match on the snapshot display name.
    pub customer_name: Option<String>,
}

impl LedgerFilter {
    pub fn by_customer_id(id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn by_customer_name(name: impl Into<String>) -> Self {
        Self {
            customer_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        let id_ok = self
            .customer_id
            .as_deref()
            .is_none_or(|id| entry.customer_id == id);
        let name_ok = self.customer_name.as_deref().is_none_or(|name| {
            entry
                .customer
                .name
                .to_lowercase()
                .contains(&name.to_lowercase())
        });
        id_ok && name_ok
    }
}

/// Canonical ordering of the balance view: most recently mutated first, ties
/// broken by entry id for deterministic pagination.
pub fn sort_newest_first(entries: &mut [LedgerEntry]) {
    entries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Durable collection of ledger entries, keyed by entry id and indexed by
/// customer for the single open entry.
///
/// Writes use optimistic concurrency: `update` compares the caller's
/// `version` against the stored one and fails with a conflict on mismatch,
/// and `insert_open` fails with a conflict if the customer already has an
/// open entry. Callers retry with a fresh read.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<LedgerEntry>>;
    async fn find_open(&self, customer_id: &str) -> Result<Option<LedgerEntry>>;
    async fn insert_open(&self, entry: LedgerEntry) -> Result<LedgerEntry>;
    async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry>;
    async fn list_open(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>>;
}

/// Append-only log of accepted sales, consumed by reporting.
#[async_trait]
pub trait SaleLog: Send + Sync {
    async fn record(&self, sale: RecordedSale) -> Result<()>;
    async fn all(&self) -> Result<Vec<RecordedSale>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type SaleLogBox = Box<dyn SaleLog>;
