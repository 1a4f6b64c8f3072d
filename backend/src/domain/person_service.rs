use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::people::{CreatePersonCommand, DeletePersonResult, UpdatePersonCommand};
use crate::domain::errors::DomainError;
use crate::domain::models::person::Person;
use crate::domain::settings_service::SettingsService;
use crate::domain::validation::{currency_code, optional_text, required_text};
use crate::storage::{KeyValueStore, PersonRepository, PersonStorage, TransactionRepository, TransactionStorage};

const MAX_NAME_LENGTH: usize = 100;
const MAX_CONTACT_LENGTH: usize = 100;
const MAX_NOTES_LENGTH: usize = 1000;

/// Service for managing ledger counterparties
#[derive(Clone)]
pub struct PersonService {
    people: PersonRepository,
    transactions: TransactionRepository,
    settings_service: SettingsService,
    clock: Arc<dyn Clock>,
}

impl PersonService {
    pub fn new(store: Arc<dyn KeyValueStore>, settings_service: SettingsService, clock: Arc<dyn Clock>) -> Self {
        Self {
            people: PersonRepository::new(store.clone()),
            transactions: TransactionRepository::new(store),
            settings_service,
            clock,
        }
    }

    /// List people alphabetically, ignoring case
    pub fn list_people(&self) -> Result<Vec<Person>> {
        info!("Listing people");

        let mut people = self.people.list_people()?;
        people.sort_by_key(|person| person.name.to_lowercase());

        info!("Found {} people", people.len());
        Ok(people)
    }

    pub fn get_person(&self, person_id: &str) -> Result<Person> {
        self.people
            .get_person(person_id)?
            .ok_or_else(|| DomainError::not_found("Person", person_id).into())
    }

    /// Create a new person
    pub fn create_person(&self, command: CreatePersonCommand) -> Result<Person> {
        info!("Creating person: {}", command.name);

        let currency = match command.currency {
            Some(currency) => currency_code(&currency)?,
            None => self.settings_service.get_settings()?.default_currency,
        };
        let person = Person {
            id: Person::generate_id(),
            name: required_text("name", &command.name, MAX_NAME_LENGTH)?,
            phone: optional_text("phone", command.phone, MAX_CONTACT_LENGTH)?,
            email: optional_text("email", command.email, MAX_CONTACT_LENGTH)?,
            notes: optional_text("notes", command.notes, MAX_NOTES_LENGTH)?,
            currency,
            created_at: self.clock.now(),
            last_transaction_at: None,
        };

        self.people.store_person(&person)?;

        info!("Created person: {} with ID: {}", person.name, person.id);
        Ok(person)
    }

    pub fn update_person(&self, person_id: &str, command: UpdatePersonCommand) -> Result<Person> {
        info!("Updating person: {} - {:?}", person_id, command);

        let mut person = self.get_person(person_id)?;
        if let Some(name) = command.name {
            person.name = required_text("name", &name, MAX_NAME_LENGTH)?;
        }
        if let Some(phone) = command.phone {
            person.phone = optional_text("phone", phone, MAX_CONTACT_LENGTH)?;
        }
        if let Some(email) = command.email {
            person.email = optional_text("email", email, MAX_CONTACT_LENGTH)?;
        }
        if let Some(notes) = command.notes {
            person.notes = optional_text("notes", notes, MAX_NOTES_LENGTH)?;
        }
        if let Some(currency) = command.currency {
            person.currency = currency_code(&currency)?;
        }

        self.people.store_person(&person)?;
        Ok(person)
    }

    /// Delete a person together with all of their transactions
    pub fn delete_person(&self, person_id: &str) -> Result<DeletePersonResult> {
        info!("Deleting person: {}", person_id);

        self.get_person(person_id)?;
        let deleted_transaction_ids = self
            .transactions
            .delete_transactions_where(&|transaction| transaction.person_id == person_id)?;
        self.people.delete_person(person_id)?;

        info!(
            "Deleted person {} and {} transactions",
            person_id,
            deleted_transaction_ids.len()
        );
        Ok(DeletePersonResult {
            person_id: person_id.to_string(),
            deleted_transaction_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::settings::UpdateSettingsCommand;
    use crate::domain::errors::{as_validation, is_not_found, ValidationError};
    use crate::domain::models::transaction::{Transaction, TransactionKind};
    use crate::domain::test_support::{date, fixed_clock, memory_store};

    fn setup() -> (PersonService, Arc<dyn KeyValueStore>) {
        let store = memory_store();
        let settings = SettingsService::new(store.clone(), "USD");
        (PersonService::new(store.clone(), settings, fixed_clock()), store)
    }

    fn create(service: &PersonService, name: &str) -> Person {
        service
            .create_person(CreatePersonCommand {
                name: name.to_string(),
                phone: None,
                email: None,
                notes: None,
                currency: None,
            })
            .unwrap()
    }

    #[test]
    fn test_currency_follows_settings() -> Result<()> {
        let (service, _) = setup();
        assert_eq!(create(&service, "Amira").currency, "USD");

        service.settings_service.update_settings(UpdateSettingsCommand {
            default_currency: Some("EUR".to_string()),
            ..Default::default()
        })?;
        assert_eq!(create(&service, "Bo").currency, "EUR");

        let explicit = service.create_person(CreatePersonCommand {
            name: "Chen".to_string(),
            phone: Some(" ".to_string()),
            email: Some("chen@example.com".to_string()),
            notes: None,
            currency: Some("jpy".to_string()),
        })?;
        assert_eq!(explicit.currency, "JPY");
        assert!(explicit.phone.is_none());
        Ok(())
    }

    #[test]
    fn test_list_sorted_case_insensitively() -> Result<()> {
        let (service, _) = setup();
        create(&service, "zoe");
        create(&service, "Adam");
        create(&service, "bella");

        let names: Vec<String> = service.list_people()?.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Adam", "bella", "zoe"]);
        Ok(())
    }

    #[test]
    fn test_update_validates() {
        let (service, _) = setup();
        let person = create(&service, "Dana");

        let error = service
            .update_person(
                &person.id,
                UpdatePersonCommand {
                    currency: Some("euro".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(as_validation(&error), Some(ValidationError::InvalidCurrency(_))));

        let missing = service.update_person("person::missing", UpdatePersonCommand::default());
        assert!(is_not_found(&missing.unwrap_err()));
    }

    #[test]
    fn test_delete_cascades_to_transactions() -> Result<()> {
        let (service, store) = setup();
        let person = create(&service, "Eli");
        let other = create(&service, "Fay");
        let transactions = TransactionRepository::new(store);
        for (id, person_id) in [("t1", &person.id), ("t2", &other.id), ("t3", &person.id)] {
            transactions.store_transaction(&Transaction {
                id: id.to_string(),
                person_id: person_id.clone(),
                kind: TransactionKind::LoanGiven,
                amount: 10.0,
                currency: "USD".to_string(),
                date: date("2024-01-10"),
                time: None,
                description: None,
                category: None,
                created_at: chrono::Utc::now(),
            })?;
        }

        let result = service.delete_person(&person.id)?;

        assert_eq!(result.deleted_transaction_ids, vec!["t1", "t3"]);
        assert_eq!(transactions.list_transactions()?.len(), 1);
        assert!(is_not_found(&service.get_person(&person.id).unwrap_err()));
        Ok(())
    }
}
