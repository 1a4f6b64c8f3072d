use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::models::transaction::Transaction;
use crate::mappers::TransactionMapper;
use crate::storage::records::{Record, RecordError, RecordSet};
use crate::storage::traits::{KeyValueStore, TransactionStorage};

impl Record for Transaction {
    const KEY: &'static str = "transactions";

    fn decode(value: Value) -> Result<Self, RecordError> {
        let dto: shared::Transaction = serde_json::from_value(value)?;
        Ok(TransactionMapper::to_domain(dto)?)
    }

    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(TransactionMapper::to_dto(self))?)
    }
}

#[derive(Clone)]
pub struct TransactionRepository {
    records: RecordSet<Transaction>,
}

impl TransactionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records: RecordSet::new(store),
        }
    }
}

impl TransactionStorage for TransactionRepository {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.records.load_all()
    }

    fn list_transactions_for_person(&self, person_id: &str) -> Result<Vec<Transaction>> {
        Ok(self
            .records
            .load_all()?
            .into_iter()
            .filter(|transaction| transaction.person_id == person_id)
            .collect())
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        Ok(self
            .records
            .load_all()?
            .into_iter()
            .find(|transaction| transaction.id == transaction_id))
    }

    fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.records.modify(|records| {
            match records.iter_mut().find(|existing| existing.id == transaction.id) {
                Some(existing) => *existing = transaction.clone(),
                None => records.push(transaction.clone()),
            }
            Ok(())
        })
    }

    fn delete_transactions_where(&self, predicate: &dyn Fn(&Transaction) -> bool) -> Result<Vec<String>> {
        self.records.modify(|records| {
            let mut deleted = Vec::new();
            records.retain(|transaction| {
                if predicate(transaction) {
                    deleted.push(transaction.id.clone());
                    false
                } else {
                    true
                }
            });
            Ok(deleted)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::transaction::TransactionKind;
    use crate::storage::test_utils::TestEnvironment;
    use chrono::{NaiveDate, Utc};

    fn transaction(id: &str, person_id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            person_id: person_id.to_string(),
            kind: TransactionKind::LoanGiven,
            amount: 10.0,
            currency: "USD".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time: None,
            description: None,
            category: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_and_delete_by_person() -> Result<()> {
        let env = TestEnvironment::new()?;
        let repo = TransactionRepository::new(env.store());
        repo.store_transaction(&transaction("t1", "alice"))?;
        repo.store_transaction(&transaction("t2", "bob"))?;
        repo.store_transaction(&transaction("t3", "alice"))?;

        assert_eq!(repo.list_transactions_for_person("alice")?.len(), 2);

        let deleted = repo.delete_transactions_where(&|t| t.person_id == "alice")?;
        assert_eq!(deleted, vec!["t1".to_string(), "t3".to_string()]);
        assert_eq!(repo.list_transactions()?.len(), 1);
        assert!(repo.get_transaction("t2")?.is_some());
        Ok(())
    }
}
