//! SIRENE établissement harvester: config, API client, wire records, output.

pub mod client;
pub mod config;
pub mod records;
pub mod writer;

pub use client::SireneClient;
pub use config::HarvestConfig;
pub use records::{EstablishmentRow, SiretResponse};
pub use writer::DumpWriter;
