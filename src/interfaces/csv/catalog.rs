use crate::domain::catalog::{Customer, Product};
use crate::error::Result;
use std::io::Read;

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source)
}

/// Loads the product catalog from a CSV source (`id,name,price`).
pub fn load_products<R: Read>(source: R) -> Result<Vec<Product>> {
    reader(source)
        .into_deserialize()
        .map(|row| row.map_err(Into::into))
        .collect()
}

/// Loads the customer master from a CSV source (`id,name,contact,address`).
pub fn load_customers<R: Read>(source: R) -> Result<Vec<Customer>> {
    reader(source)
        .into_deserialize()
        .map(|row| row.map_err(Into::into))
        .collect()
}
