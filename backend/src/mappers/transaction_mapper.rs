use shared::{
    CreateTransactionRequest, ExportLedgerResponse, LedgerOverview as SharedLedgerOverview,
    LedgerSummary as SharedLedgerSummary, PersonBalance as SharedPersonBalance,
    Transaction as SharedTransaction, TransactionKind as SharedTransactionKind,
    UpdateTransactionRequest,
};

use super::{
    format_date, format_time, format_timestamp, parse_date, parse_optional_date,
    parse_optional_time, parse_timestamp, parse_time, PersonMapper,
};
use crate::domain::commands::export::LedgerExport;
use crate::domain::commands::transactions::{CreateTransactionCommand, UpdateTransactionCommand};
use crate::domain::errors::ValidationError;
use crate::domain::ledger::{LedgerOverview, LedgerSummary};
use crate::domain::models::transaction::{Transaction as DomainTransaction, TransactionKind};
use crate::domain::validation::positive_amount;

/// Mapper to convert between shared Transaction DTOs and domain Transaction models.
pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_domain(dto: SharedTransaction) -> Result<DomainTransaction, ValidationError> {
        if dto.id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        if dto.person_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "personId" });
        }
        positive_amount(dto.amount)?;
        Ok(DomainTransaction {
            kind: Self::kind_to_domain(dto.kind),
            date: parse_date("date", &dto.date)?,
            time: dto.time.as_deref().map(|time| parse_time("time", time)).transpose()?,
            created_at: parse_timestamp("createdAt", &dto.created_at)?,
            id: dto.id,
            person_id: dto.person_id,
            amount: dto.amount,
            currency: dto.currency,
            description: dto.description,
            category: dto.category,
        })
    }

    pub fn to_dto(domain: &DomainTransaction) -> SharedTransaction {
        SharedTransaction {
            id: domain.id.clone(),
            person_id: domain.person_id.clone(),
            kind: Self::kind_to_dto(domain.kind),
            amount: domain.amount,
            currency: domain.currency.clone(),
            date: format_date(domain.date),
            time: domain.time.map(format_time),
            description: domain.description.clone(),
            category: domain.category.clone(),
            created_at: format_timestamp(domain.created_at),
        }
    }

    pub fn kind_to_domain(kind: SharedTransactionKind) -> TransactionKind {
        match kind {
            SharedTransactionKind::LoanGiven => TransactionKind::LoanGiven,
            SharedTransactionKind::PaymentReceived => TransactionKind::PaymentReceived,
            SharedTransactionKind::LoanTaken => TransactionKind::LoanTaken,
            SharedTransactionKind::PaymentMade => TransactionKind::PaymentMade,
            SharedTransactionKind::Other => TransactionKind::Other,
        }
    }

    pub fn kind_to_dto(kind: TransactionKind) -> SharedTransactionKind {
        match kind {
            TransactionKind::LoanGiven => SharedTransactionKind::LoanGiven,
            TransactionKind::PaymentReceived => SharedTransactionKind::PaymentReceived,
            TransactionKind::LoanTaken => SharedTransactionKind::LoanTaken,
            TransactionKind::PaymentMade => SharedTransactionKind::PaymentMade,
            TransactionKind::Other => SharedTransactionKind::Other,
        }
    }

    pub fn to_create_command(
        request: CreateTransactionRequest,
    ) -> Result<CreateTransactionCommand, ValidationError> {
        Ok(CreateTransactionCommand {
            kind: Self::kind_to_domain(request.kind),
            date: parse_optional_date("date", request.date.as_deref())?,
            time: parse_optional_time("time", request.time.as_deref())?,
            person_id: request.person_id,
            amount: request.amount,
            currency: request.currency,
            description: request.description,
            category: request.category,
        })
    }

    pub fn to_update_command(
        request: UpdateTransactionRequest,
    ) -> Result<UpdateTransactionCommand, ValidationError> {
        let time = match request.time {
            Some(value) => Some(parse_optional_time("time", value.as_deref())?),
            None => None,
        };
        Ok(UpdateTransactionCommand {
            kind: request.kind.map(Self::kind_to_domain),
            amount: request.amount,
            currency: request.currency,
            date: parse_optional_date("date", request.date.as_deref())?,
            time,
            description: request.description,
            category: request.category,
        })
    }

    pub fn to_ledger_summary_dto(summary: LedgerSummary) -> SharedLedgerSummary {
        SharedLedgerSummary {
            person_id: summary.person_id,
            balance: summary.balance,
            total_given: summary.total_given,
            total_received: summary.total_received,
            total_lent: summary.total_lent,
            total_paid: summary.total_paid,
            transactions: summary.sorted_transactions.iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_ledger_overview_dto(overview: LedgerOverview) -> SharedLedgerOverview {
        SharedLedgerOverview {
            people: overview
                .people
                .iter()
                .map(|entry| SharedPersonBalance {
                    person: PersonMapper::to_dto(&entry.person),
                    balance: entry.balance,
                })
                .collect(),
            total_owed_to_you: overview.total_owed_to_you,
            total_you_owe: overview.total_you_owe,
        }
    }

    pub fn to_export_dto(export: LedgerExport) -> ExportLedgerResponse {
        ExportLedgerResponse {
            filename: export.filename,
            csv_content: export.csv_content,
            transaction_count: export.transaction_count,
        }
    }
}
