use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as known to the catalog master store.
///
/// The unit price is resolved at the moment of sale and never re-resolved,
/// so historical ledger totals are immune to later price changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

/// A customer as known to the customer master store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub address: String,
}

/// The display fields of a customer, denormalized onto a ledger entry at
/// write time so the balance view needs no join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub contact: String,
    pub address: String,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            contact: customer.contact.clone(),
            address: customer.address.clone(),
        }
    }
}

/// Read-only lookup into the product and customer master stores.
///
/// The masters themselves are external collaborators; the engine only ever
/// reads from them.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn product(&self, product_id: &str) -> Result<Option<Product>>;
    async fn customer(&self, customer_id: &str) -> Result<Option<Customer>>;
}

pub type CatalogBox = Box<dyn CatalogLookup>;
