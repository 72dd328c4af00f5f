use crate::domain::entry::LedgerEntry;
use crate::domain::ports::{LedgerFilter, LedgerStore, SaleLog, sort_newest_first};
use crate::domain::sale::RecordedSale;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for ledger entries, keyed by entry id.
pub const CF_ENTRIES: &str = "entries";
/// Column Family for the open-entry index, keyed by customer id.
pub const CF_OPEN_INDEX: &str = "open_index";
/// Column Family for the sale log, keyed by sale id.
pub const CF_SALES: &str = "sales";

/// A persistent ledger store backed by RocksDB.
///
/// Entries, the customer -> open-entry index, and the sale log live in
/// separate Column Families. A process-wide write lock serializes the
/// compare-and-swap inside `insert_open`/`update`; index and entry writes go
/// through a single `WriteBatch` so no partial write straddles the two.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_ENTRIES, Options::default()),
            ColumnFamilyDescriptor::new(CF_OPEN_INDEX, Options::default()),
            ColumnFamilyDescriptor::new(CF_SALES, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &'static str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LedgerError::Internal(Box::new(std::io::Error::other(format!(
                "column family not found: {name}"
            ))))
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::Internal(Box::new(e)))
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| LedgerError::Internal(Box::new(e)))
    }

    fn get_entry(&self, id: Uuid) -> Result<Option<LedgerEntry>> {
        let cf = self.cf(CF_ENTRIES)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_open_id(&self, customer_id: &str) -> Result<Option<Uuid>> {
        let cf = self.cf(CF_OPEN_INDEX)?;
        match self.db.get_cf(cf, customer_id.as_bytes())? {
            Some(bytes) => {
                let id = Uuid::from_slice(&bytes)
                    .map_err(|e| LedgerError::Internal(Box::new(e)))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    fn write_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let entries_cf = self.cf(CF_ENTRIES)?;
        let index_cf = self.cf(CF_OPEN_INDEX)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(entries_cf, entry.id.as_bytes(), Self::encode(entry)?);
        if entry.is_open() {
            batch.put_cf(index_cf, entry.customer_id.as_bytes(), entry.id.as_bytes());
        } else {
            batch.delete_cf(index_cf, entry.customer_id.as_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn get(&self, id: Uuid) -> Result<Option<LedgerEntry>> {
        self.get_entry(id)
    }

    async fn find_open(&self, customer_id: &str) -> Result<Option<LedgerEntry>> {
        match self.get_open_id(customer_id)? {
            Some(id) => self.get_entry(id),
            None => Ok(None),
        }
    }

    async fn insert_open(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let _guard = self.write_lock.lock().await;
        if self.get_open_id(&entry.customer_id)?.is_some() {
            return Err(LedgerError::Conflict(format!(
                "customer {} already has an open ledger entry",
                entry.customer_id
            )));
        }
        self.write_entry(&entry)?;
        Ok(entry)
    }

    async fn update(&self, mut entry: LedgerEntry) -> Result<LedgerEntry> {
        let _guard = self.write_lock.lock().await;
        let stored = self
            .get_entry(entry.id)?
            .ok_or_else(|| LedgerError::not_found("ledger entry", entry.id))?;
        if stored.version != entry.version {
            return Err(LedgerError::Conflict(format!(
                "ledger entry {} was modified concurrently",
                entry.id
            )));
        }

        entry.version += 1;
        self.write_entry(&entry)?;
        Ok(entry)
    }

    async fn list_open(&self, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let index_cf = self.cf(CF_OPEN_INDEX)?;

        let mut entries = Vec::new();
        for item in self.db.iterator_cf(index_cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let id =
                Uuid::from_slice(&value).map_err(|e| LedgerError::Internal(Box::new(e)))?;
            if let Some(entry) = self.get_entry(id)?
                && filter.matches(&entry)
            {
                entries.push(entry);
            }
        }
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

#[async_trait]
impl SaleLog for RocksDBStore {
    async fn record(&self, sale: RecordedSale) -> Result<()> {
        let cf = self.cf(CF_SALES)?;
        self.db
            .put_cf(cf, sale.id.as_bytes(), Self::encode(&sale)?)?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<RecordedSale>> {
        let cf = self.cf(CF_SALES)?;

        let mut sales = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            sales.push(Self::decode::<RecordedSale>(&value)?);
        }
        // Iteration order is by key bytes; return chronological order.
        sales.sort_by_key(|sale| sale.recorded_at);
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CustomerSnapshot;
    use crate::domain::money::Money;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn entry_for(customer_id: &str) -> LedgerEntry {
        LedgerEntry::open(
            customer_id,
            CustomerSnapshot {
                name: "Asha".to_string(),
                contact: "555-0101".to_string(),
                address: "12 Main St".to_string(),
            },
            BTreeSet::from(["Bread".to_string()]),
            Money::new(dec!(100.0)).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_ENTRIES).is_some());
        assert!(store.db.cf_handle(CF_OPEN_INDEX).is_some());
        assert!(store.db.cf_handle(CF_SALES).is_some());
    }

    #[tokio::test]
    async fn test_insert_find_and_version_check() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let entry = store.insert_open(entry_for("c1")).await.unwrap();
        let found = store.find_open("c1").await.unwrap().unwrap();
        assert_eq!(found, entry);

        assert!(matches!(
            store.insert_open(entry_for("c1")).await,
            Err(LedgerError::Conflict(_))
        ));

        let updated = store.update(entry.clone()).await.unwrap();
        assert_eq!(updated.version, entry.version + 1);
        assert!(matches!(
            store.update(entry).await,
            Err(LedgerError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_settlement_clears_open_index() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut entry = store.insert_open(entry_for("c1")).await.unwrap();
        entry.settle(Utc::now());
        store.update(entry.clone()).await.unwrap();

        assert!(store.find_open("c1").await.unwrap().is_none());
        assert!(LedgerStore::get(&store, entry.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sale_log_roundtrip() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let sale = RecordedSale::new("c1", vec![], Money::new(dec!(10.0)).unwrap(), Utc::now());
        store.record(sale.clone()).await.unwrap();

        let all = SaleLog::all(&store).await.unwrap();
        assert_eq!(all, vec![sale]);
    }
}
