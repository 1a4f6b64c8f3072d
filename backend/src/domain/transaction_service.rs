//! Ledger transactions and the balances derived from them.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::transactions::{CreateTransactionCommand, UpdateTransactionCommand};
use crate::domain::errors::DomainError;
use crate::domain::ledger::{self, LedgerOverview, LedgerSummary};
use crate::domain::models::person::Person;
use crate::domain::models::transaction::Transaction;
use crate::domain::validation::{currency_code, optional_text, positive_amount};
use crate::storage::{KeyValueStore, PersonRepository, PersonStorage, TransactionRepository, TransactionStorage};

const MAX_DESCRIPTION_LENGTH: usize = 500;
const MAX_CATEGORY_LENGTH: usize = 100;

/// Service for recording transactions and computing balances
#[derive(Clone)]
pub struct TransactionService {
    people: PersonRepository,
    transactions: TransactionRepository,
    clock: Arc<dyn Clock>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            people: PersonRepository::new(store.clone()),
            transactions: TransactionRepository::new(store),
            clock,
        }
    }

    /// A person's transactions, most recent first
    pub fn list_for_person(&self, person_id: &str) -> Result<Vec<Transaction>> {
        info!("Listing transactions for person: {}", person_id);

        self.require_person(person_id)?;
        let mut transactions = self.transactions.list_transactions_for_person(person_id)?;
        ledger::sort_most_recent_first(&mut transactions);

        info!("Found {} transactions", transactions.len());
        Ok(transactions)
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.transactions
            .get_transaction(transaction_id)?
            .ok_or_else(|| DomainError::not_found("Transaction", transaction_id).into())
    }

    /// Record a new transaction and mark the person as recently active
    pub fn create_transaction(&self, command: CreateTransactionCommand) -> Result<Transaction> {
        info!(
            "Creating transaction: person={}, kind={:?}, amount={}",
            command.person_id, command.kind, command.amount
        );

        let mut person = self.require_person(&command.person_id)?;
        let amount = positive_amount(command.amount)?;
        let currency = match command.currency {
            Some(currency) => currency_code(&currency)?,
            None => person.currency.clone(),
        };
        let now = self.clock.now();

        let transaction = Transaction {
            id: Transaction::generate_id(),
            person_id: person.id.clone(),
            kind: command.kind,
            amount,
            currency,
            date: command.date.unwrap_or_else(|| self.clock.today()),
            time: command.time,
            description: optional_text("description", command.description, MAX_DESCRIPTION_LENGTH)?,
            category: optional_text("category", command.category, MAX_CATEGORY_LENGTH)?,
            created_at: now,
        };

        self.transactions.store_transaction(&transaction)?;
        person.last_transaction_at = Some(now);
        self.people.store_person(&person)?;

        info!("Created transaction: {} for {}", transaction.id, person.name);
        Ok(transaction)
    }

    pub fn update_transaction(&self, transaction_id: &str, command: UpdateTransactionCommand) -> Result<Transaction> {
        info!("Updating transaction: {} - {:?}", transaction_id, command);

        let mut transaction = self.get_transaction(transaction_id)?;
        if let Some(kind) = command.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = command.amount {
            transaction.amount = positive_amount(amount)?;
        }
        if let Some(currency) = command.currency {
            transaction.currency = currency_code(&currency)?;
        }
        if let Some(date) = command.date {
            transaction.date = date;
        }
        if let Some(time) = command.time {
            transaction.time = time;
        }
        if let Some(description) = command.description {
            transaction.description = optional_text("description", description, MAX_DESCRIPTION_LENGTH)?;
        }
        if let Some(category) = command.category {
            transaction.category = optional_text("category", category, MAX_CATEGORY_LENGTH)?;
        }

        self.transactions.store_transaction(&transaction)?;
        Ok(transaction)
    }

    pub fn delete_transaction(&self, transaction_id: &str) -> Result<()> {
        info!("Deleting transaction: {}", transaction_id);

        let deleted = self
            .transactions
            .delete_transactions_where(&|transaction| transaction.id == transaction_id)?;
        if deleted.is_empty() {
            return Err(DomainError::not_found("Transaction", transaction_id).into());
        }
        Ok(())
    }

    /// Balance, totals and sorted history for one person
    pub fn ledger_for_person(&self, person_id: &str) -> Result<LedgerSummary> {
        info!("Computing ledger for person: {}", person_id);

        let person = self.require_person(person_id)?;
        let transactions = self.transactions.list_transactions_for_person(person_id)?;
        let summary = ledger::compute_ledger(&person, &transactions);

        info!("Balance for {}: {}", person.name, summary.balance);
        Ok(summary)
    }

    /// Balances for everyone
    pub fn overview(&self) -> Result<LedgerOverview> {
        info!("Computing ledger overview");

        let people = self.people.list_people()?;
        let transactions = self.transactions.list_transactions()?;
        Ok(ledger::compute_overview(&people, &transactions))
    }

    fn require_person(&self, person_id: &str) -> Result<Person> {
        self.people
            .get_person(person_id)?
            .ok_or_else(|| DomainError::not_found("Person", person_id).into())
    }
}
