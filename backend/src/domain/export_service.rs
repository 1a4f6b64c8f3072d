use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::export::LedgerExport;
use crate::domain::errors::DomainError;
use crate::domain::ledger::{from_units, signed_units};
use crate::mappers::{format_date, format_time};
use crate::storage::{KeyValueStore, PersonRepository, PersonStorage, TransactionRepository, TransactionStorage};

const CSV_HEADERS: [&str; 9] = [
    "date",
    "time",
    "type",
    "description",
    "category",
    "amount",
    "currency",
    "signed_amount",
    "running_balance",
];

/// Service for exporting a person's ledger
#[derive(Clone)]
pub struct ExportService {
    people: PersonRepository,
    transactions: TransactionRepository,
    clock: Arc<dyn Clock>,
}

impl ExportService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            people: PersonRepository::new(store.clone()),
            transactions: TransactionRepository::new(store),
            clock,
        }
    }

    /// Render the person's transactions, oldest first, with a running balance
    pub fn export_ledger_csv(&self, person_id: &str) -> Result<LedgerExport> {
        info!("Exporting ledger as CSV for person: {}", person_id);

        let person = self
            .people
            .get_person(person_id)?
            .ok_or_else(|| DomainError::not_found("Person", person_id))?;

        let mut transactions = self.transactions.list_transactions_for_person(person_id)?;
        transactions.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.time.cmp(&b.time))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;

        let mut running = 0_i64;
        for transaction in &transactions {
            let signed = signed_units(transaction);
            running = running.saturating_add(signed);
            writer.write_record([
                format_date(transaction.date),
                transaction.time.map(format_time).unwrap_or_default(),
                transaction.kind.label().to_string(),
                transaction.description.clone().unwrap_or_default(),
                transaction.category.clone().unwrap_or_default(),
                format!("{:.2}", transaction.amount),
                transaction.currency.clone(),
                format!("{:.2}", from_units(signed)),
                format!("{:.2}", from_units(running)),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|error| anyhow!("Failed to finish CSV export: {}", error))?;
        let csv_content = String::from_utf8(bytes)?;

        let filename = format!(
            "{}_ledger_{}.csv",
            safe_file_stem(&person.name),
            self.clock.today().format("%Y%m%d")
        );

        info!(
            "Exported {} transactions for {} ({} bytes) as {}",
            transactions.len(),
            person.name,
            csv_content.len(),
            filename
        );
        Ok(LedgerExport {
            filename,
            csv_content,
            transaction_count: transactions.len(),
        })
    }
}

/// Lowercase name with anything but letters and digits collapsed to `_`
fn safe_file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            stem.extend(c.to_lowercase());
        } else if !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "ledger".to_string()
    } else {
        stem.to_string()
    }
}
