use crate::domain::sale::SaleLine;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Sale,
    Pay,
    Partial,
}

/// One row of the events CSV.
///
/// `lines` carries `product:qty` pairs joined by `;` and applies to sales
/// only; `amount` applies to partial payments only. Payment events address
/// the customer: the caller resolves the single open entry from it.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerEvent {
    pub r#type: EventKind,
    pub customer: String,
    #[serde(default)]
    pub lines: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl LedgerEvent {
    /// Parses the `lines` field of a sale event into sale lines.
    pub fn sale_lines(&self) -> Result<Vec<SaleLine>> {
        let raw = self.lines.as_deref().unwrap_or_default();
        let mut lines = Vec::new();
        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (product_id, quantity) = part.split_once(':').ok_or_else(|| {
                LedgerError::Validation(format!(
                    "malformed sale line {part:?}, expected product:qty"
                ))
            })?;
            let quantity: u32 = quantity.trim().parse().map_err(|_| {
                LedgerError::Validation(format!("invalid quantity in sale line {part:?}"))
            })?;
            lines.push(SaleLine::new(product_id.trim(), quantity));
        }
        Ok(lines)
    }
}

/// Reads ledger events from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<LedgerEvent>`,
/// trimming whitespace and tolerating short records so payment rows can omit
/// trailing columns.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g. File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes events, so
    /// large files stream without loading everything into memory.
    pub fn events(self) -> impl Iterator<Item = Result<LedgerEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "type, customer, lines, amount\n\
                    sale, c1, bread:2;cake:1,\n\
                    partial, c1, , 50.0\n\
                    pay, c1, ,";
        let reader = EventReader::new(data.as_bytes());
        let events: Vec<Result<LedgerEvent>> = reader.events().collect();

        assert_eq!(events.len(), 3);

        let sale = events[0].as_ref().unwrap();
        assert_eq!(sale.r#type, EventKind::Sale);
        assert_eq!(
            sale.sale_lines().unwrap(),
            vec![SaleLine::new("bread", 2), SaleLine::new("cake", 1)]
        );

        let partial = events[1].as_ref().unwrap();
        assert_eq!(partial.r#type, EventKind::Partial);
        assert_eq!(partial.amount, Some(dec!(50.0)));

        let pay = events[2].as_ref().unwrap();
        assert_eq!(pay.r#type, EventKind::Pay);
        assert_eq!(pay.amount, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "type, customer, lines, amount\ninvalid, c1, ,";
        let reader = EventReader::new(data.as_bytes());
        let events: Vec<Result<LedgerEvent>> = reader.events().collect();

        assert!(events[0].is_err());
    }

    #[test]
    fn test_malformed_sale_lines_rejected() {
        let event = LedgerEvent {
            r#type: EventKind::Sale,
            customer: "c1".to_string(),
            lines: Some("bread".to_string()),
            amount: None,
        };
        assert!(matches!(
            event.sale_lines(),
            Err(LedgerError::Validation(_))
        ));

        let event = LedgerEvent {
            r#type: EventKind::Sale,
            customer: "c1".to_string(),
            lines: Some("bread:two".to_string()),
            amount: None,
        };
        assert!(matches!(
            event.sale_lines(),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_lines_field_parses_to_no_lines() {
        let event = LedgerEvent {
            r#type: EventKind::Sale,
            customer: "c1".to_string(),
            lines: None,
            amount: None,
        };
        assert!(event.sale_lines().unwrap().is_empty());
    }
}
