use crate::domain::entry::LedgerEntry;
use crate::error::Result;
use std::io::Write;

/// Writes the open-balance view as CSV.
///
/// One row per customer with an outstanding balance; products are joined
/// with `|` (the set is already sorted and deduplicated).
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_entries(&mut self, entries: &[LedgerEntry]) -> Result<()> {
        self.writer
            .write_record(["customer", "name", "products", "total", "status"])?;
        for entry in entries {
            let products: Vec<&str> = entry.products.iter().map(String::as_str).collect();
            let products = products.join("|");
            let total = entry.total.to_string();
            let status = entry.status.to_string();
            self.writer.write_record([
                entry.customer_id.as_str(),
                entry.customer.name.as_str(),
                products.as_str(),
                total.as_str(),
                status.as_str(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
