use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::models::person::Person;
use crate::mappers::PersonMapper;
use crate::storage::records::{Record, RecordError, RecordSet};
use crate::storage::traits::{KeyValueStore, PersonStorage};

impl Record for Person {
    const KEY: &'static str = "people";

    fn decode(value: Value) -> Result<Self, RecordError> {
        let dto: shared::Person = serde_json::from_value(value)?;
        Ok(PersonMapper::to_domain(dto)?)
    }

    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(PersonMapper::to_dto(self))?)
    }
}

#[derive(Clone)]
pub struct PersonRepository {
    records: RecordSet<Person>,
}

impl PersonRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records: RecordSet::new(store),
        }
    }
}

impl PersonStorage for PersonRepository {
    fn list_people(&self) -> Result<Vec<Person>> {
        self.records.load_all()
    }

    fn get_person(&self, person_id: &str) -> Result<Option<Person>> {
        Ok(self.records.load_all()?.into_iter().find(|person| person.id == person_id))
    }

    fn store_person(&self, person: &Person) -> Result<()> {
        self.records.modify(|records| {
            match records.iter_mut().find(|existing| existing.id == person.id) {
                Some(existing) => *existing = person.clone(),
                None => records.push(person.clone()),
            }
            Ok(())
        })
    }

    fn delete_person(&self, person_id: &str) -> Result<bool> {
        self.records.modify(|records| {
            let before = records.len();
            records.retain(|person| person.id != person_id);
            Ok(records.len() != before)
        })
    }
}
