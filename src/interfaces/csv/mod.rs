pub mod balance_writer;
pub mod catalog;
pub mod event_reader;
