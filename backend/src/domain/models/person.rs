//! Domain model for a ledger counterparty.
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    /// Preferred ISO 4217 currency code
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

impl Person {
    pub fn generate_id() -> String {
        format!("person::{}", Uuid::new_v4())
    }
}
