use shared::{
    CreatePersonRequest, Person as SharedPerson, PersonListResponse, UpdatePersonRequest,
};

use super::{format_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::domain::commands::people::{CreatePersonCommand, UpdatePersonCommand};
use crate::domain::errors::ValidationError;
use crate::domain::models::person::Person as DomainPerson;

/// Mapper to convert between shared Person DTOs and domain Person models.
pub struct PersonMapper;

impl PersonMapper {
    pub fn to_domain(dto: SharedPerson) -> Result<DomainPerson, ValidationError> {
        if dto.id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        if dto.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        Ok(DomainPerson {
            created_at: parse_timestamp("createdAt", &dto.created_at)?,
            last_transaction_at: parse_optional_timestamp(
                "lastTransactionAt",
                dto.last_transaction_at.as_deref(),
            )?,
            id: dto.id,
            name: dto.name,
            phone: dto.phone,
            email: dto.email,
            notes: dto.notes,
            currency: dto.currency,
        })
    }

    pub fn to_dto(domain: &DomainPerson) -> SharedPerson {
        SharedPerson {
            id: domain.id.clone(),
            name: domain.name.clone(),
            phone: domain.phone.clone(),
            email: domain.email.clone(),
            notes: domain.notes.clone(),
            currency: domain.currency.clone(),
            created_at: format_timestamp(domain.created_at),
            last_transaction_at: domain.last_transaction_at.map(format_timestamp),
        }
    }

    pub fn to_person_list_dto(people: &[DomainPerson]) -> PersonListResponse {
        PersonListResponse {
            people: people.iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreatePersonRequest) -> CreatePersonCommand {
        CreatePersonCommand {
            name: request.name,
            phone: request.phone,
            email: request.email,
            notes: request.notes,
            currency: request.currency,
        }
    }

    pub fn to_update_command(request: UpdatePersonRequest) -> UpdatePersonCommand {
        UpdatePersonCommand {
            name: request.name,
            phone: request.phone,
            email: request.email,
            notes: request.notes,
            currency: request.currency,
        }
    }
}
