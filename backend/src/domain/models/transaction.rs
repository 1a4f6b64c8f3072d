//! Domain model for a ledger transaction.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    LoanGiven,
    PaymentReceived,
    LoanTaken,
    PaymentMade,
    Other,
}

impl TransactionKind {
    /// Sign applied to the stored (always positive) amount.
    pub fn balance_sign(&self) -> i64 {
        match self {
            TransactionKind::LoanGiven | TransactionKind::PaymentMade => 1,
            TransactionKind::PaymentReceived | TransactionKind::LoanTaken => -1,
            TransactionKind::Other => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::LoanGiven => "Loan given",
            TransactionKind::PaymentReceived => "Payment received",
            TransactionKind::LoanTaken => "Loan taken",
            TransactionKind::PaymentMade => "Payment made",
            TransactionKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub person_id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn generate_id() -> String {
        format!("transaction::{}", Uuid::new_v4())
    }
}
