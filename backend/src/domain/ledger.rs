//! Balance computation for the personal ledger.
//!
//! A person's balance is a fold over their transactions where each kind
//! contributes its amount with a fixed sign (see
//! [`TransactionKind::balance_sign`]). Amounts are accumulated in fixed-point
//! units so the result does not depend on transaction order.

use std::cmp::Ordering;

use crate::domain::models::person::Person;
use crate::domain::models::transaction::{Transaction, TransactionKind};

/// Fixed-point scale: four decimal places covers every ISO 4217 minor unit.
const AMOUNT_SCALE: f64 = 10_000.0;

/// Saturates at the `i64` range; validated amounts never get near it.
fn to_units(amount: f64) -> i64 {
    (amount * AMOUNT_SCALE).round() as i64
}

/// Signed contribution of one transaction to the balance.
pub(crate) fn signed_units(transaction: &Transaction) -> i64 {
    to_units(transaction.amount).saturating_mul(transaction.kind.balance_sign())
}

pub(crate) fn from_units(units: i64) -> f64 {
    units as f64 / AMOUNT_SCALE
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub person_id: String,
    /// Positive: they owe you. Negative: you owe them.
    pub balance: f64,
    pub total_given: f64,
    pub total_received: f64,
    pub total_lent: f64,
    pub total_paid: f64,
    /// Most recent first
    pub sorted_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonBalance {
    pub person: Person,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerOverview {
    pub people: Vec<PersonBalance>,
    pub total_owed_to_you: f64,
    pub total_you_owe: f64,
}

#[derive(Debug, Default)]
struct Totals {
    balance: i64,
    given: i64,
    received: i64,
    lent: i64,
    paid: i64,
}

impl Totals {
    fn apply(mut self, transaction: &Transaction) -> Self {
        let units = to_units(transaction.amount);
        self.balance = self.balance.saturating_add(signed_units(transaction));
        let total = match transaction.kind {
            TransactionKind::LoanGiven => &mut self.given,
            TransactionKind::PaymentReceived => &mut self.received,
            TransactionKind::LoanTaken => &mut self.lent,
            TransactionKind::PaymentMade => &mut self.paid,
            TransactionKind::Other => return self,
        };
        *total = total.saturating_add(units);
        self
    }
}

/// Fold the transactions belonging to `person` into a balance and totals.
/// Transactions for other people are ignored.
pub fn compute_ledger(person: &Person, transactions: &[Transaction]) -> LedgerSummary {
    let mut own: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| transaction.person_id == person.id)
        .cloned()
        .collect();

    let totals = own.iter().fold(Totals::default(), Totals::apply);
    sort_most_recent_first(&mut own);

    LedgerSummary {
        person_id: person.id.clone(),
        balance: from_units(totals.balance),
        total_given: from_units(totals.given),
        total_received: from_units(totals.received),
        total_lent: from_units(totals.lent),
        total_paid: from_units(totals.paid),
        sorted_transactions: own,
    }
}

/// Balances for everyone plus what is owed in each direction.
///
/// People are listed by most recent activity; people who never had a
/// transaction come last, by name.
pub fn compute_overview(people: &[Person], transactions: &[Transaction]) -> LedgerOverview {
    let mut owed_to_you = 0_i64;
    let mut you_owe = 0_i64;

    let mut balances: Vec<PersonBalance> = people
        .iter()
        .map(|person| {
            let units = transactions
                .iter()
                .filter(|transaction| transaction.person_id == person.id)
                .fold(Totals::default(), Totals::apply)
                .balance;
            if units > 0 {
                owed_to_you = owed_to_you.saturating_add(units);
            } else {
                you_owe = you_owe.saturating_add(units.saturating_neg());
            }
            PersonBalance {
                person: person.clone(),
                balance: from_units(units),
            }
        })
        .collect();

    balances.sort_by(|a, b| {
        match (a.person.last_transaction_at, b.person.last_transaction_at) {
            (Some(left), Some(right)) => right.cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.person.name.cmp(&b.person.name))
    });

    LedgerOverview {
        people: balances,
        total_owed_to_you: from_units(owed_to_you),
        total_you_owe: from_units(you_owe),
    }
}

/// Display order: date then time descending, most recently recorded first
/// on ties. Transactions without a time sort after timed ones on the same day.
pub fn sort_most_recent_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.time.cmp(&a.time))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
