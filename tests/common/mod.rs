use khata::application::engine::LedgerEngine;
use khata::domain::catalog::{Customer, Product};
use khata::domain::sale::SaleLine;
use khata::infrastructure::in_memory::{InMemoryCatalog, InMemoryLedgerStore, InMemorySaleLog};
use rust_decimal_macros::dec;

/// An engine over in-memory stores, seeded with a small bakery catalog.
pub fn engine() -> LedgerEngine {
    let catalog = InMemoryCatalog::with_data(
        vec![
            Product {
                id: "p1".to_string(),
                name: "Bread".to_string(),
                price: dec!(100.0),
            },
            Product {
                id: "p2".to_string(),
                name: "Cake".to_string(),
                price: dec!(50.0),
            },
            Product {
                id: "p3".to_string(),
                name: "Milk".to_string(),
                price: dec!(30.0),
            },
            // Free sample item: priced at zero in the catalog.
            Product {
                id: "p0".to_string(),
                name: "Sample".to_string(),
                price: dec!(0.0),
            },
        ],
        vec![
            Customer {
                id: "c1".to_string(),
                name: "Asha".to_string(),
                contact: "555-0101".to_string(),
                address: "12 Main St".to_string(),
            },
            Customer {
                id: "c2".to_string(),
                name: "Bina".to_string(),
                contact: "555-0102".to_string(),
                address: "7 Lake Rd".to_string(),
            },
        ],
    );

    LedgerEngine::new(
        Box::new(catalog),
        Box::new(InMemoryLedgerStore::new()),
        Box::new(InMemorySaleLog::new()),
    )
}

pub fn line(product_id: &str, quantity: u32) -> SaleLine {
    SaleLine::new(product_id, quantity)
}
