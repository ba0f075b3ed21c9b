//! Invoice issuing and lifecycle.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Permission, ResultEngine, Role, events,
    events::EventStatus,
    invoices,
    invoices::{Invoice, InvoiceStatus},
};

use super::{Engine, with_tx};

/// Issues an invoice for a booked event; the total is the event's stored
/// quote.
#[derive(Clone, Debug)]
pub struct IssueInvoiceCmd {
    pub event_id: Uuid,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub user_id: String,
}

impl Engine {
    async fn require_invoice(
        &self,
        db: &DatabaseTransaction,
        invoice_id: Uuid,
        user_id: &str,
        role: Role,
    ) -> ResultEngine<Invoice> {
        let model = invoices::Entity::find_by_id(invoice_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("invoice not exists".to_string()))?;
        let invoice = Invoice::try_from(model)?;
        if role == Role::Client && !self.event_booked_by(db, invoice.event_id, user_id).await? {
            return Err(EngineError::KeyNotFound("invoice not exists".to_string()));
        }
        Ok(invoice)
    }

    async fn event_booked_by(
        &self,
        db: &DatabaseTransaction,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bool> {
        let model = events::Entity::find_by_id(event_id.to_string()).one(db).await?;
        Ok(model.is_some_and(|m| m.created_by == user_id))
    }

    /// Allocates the next sequential number for the year, `INV-YYYY-NNNN`.
    ///
    /// Invoices are never hard-deleted, so counting rows per year prefix is
    /// stable; the unique index on `number` backs this up.
    async fn next_invoice_number(
        &self,
        db: &DatabaseTransaction,
        issued_on: NaiveDate,
    ) -> ResultEngine<String> {
        let prefix = format!("INV-{}-", issued_on.year());
        let issued = invoices::Entity::find()
            .filter(invoices::Column::Number.starts_with(prefix.as_str()))
            .count(db)
            .await?;
        Ok(format!("{prefix}{:04}", issued + 1))
    }

    /// Issues an invoice for an event.
    ///
    /// Rejected when the event is canceled or when a non-void invoice for it
    /// already exists.
    pub async fn issue_invoice(&self, cmd: IssueInvoiceCmd) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, &cmd.user_id, Permission::InvoicesIssue)
                .await?;
            if cmd.due_on < cmd.issued_on {
                return Err(EngineError::InvalidDate(
                    "due_on must not precede issued_on".to_string(),
                ));
            }

            let model = events::Entity::find_by_id(cmd.event_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))?;
            let event = crate::events::Event::try_from(model)?;
            if event.status == EventStatus::Canceled {
                return Err(EngineError::InvalidStatus(
                    "cannot invoice a canceled event".to_string(),
                ));
            }

            let existing = invoices::Entity::find()
                .filter(invoices::Column::EventId.eq(cmd.event_id.to_string()))
                .filter(invoices::Column::Status.ne(InvoiceStatus::Void.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "invoice for event {}",
                    cmd.event_id
                )));
            }

            let invoice = Invoice {
                id: Uuid::new_v4(),
                event_id: cmd.event_id,
                client_id: event.client_id,
                number: self.next_invoice_number(&db_tx, cmd.issued_on).await?,
                issued_on: cmd.issued_on,
                due_on: cmd.due_on,
                total: event.total,
                currency: event.currency,
                status: InvoiceStatus::Issued,
                paid_at: None,
                voided_at: None,
                voided_by: None,
                created_by: cmd.user_id.clone(),
            };
            invoices::ActiveModel::from(&invoice).insert(&db_tx).await?;
            Ok(invoice)
        })
    }

    /// Marks an issued invoice as paid.
    pub async fn mark_invoice_paid(
        &self,
        invoice_id: Uuid,
        paid_at: DateTime<Utc>,
        user_id: &str,
    ) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::InvoicesIssue)
                .await?;
            let mut invoice = self
                .require_invoice(&db_tx, invoice_id, user_id, role)
                .await?;

            match invoice.status {
                InvoiceStatus::Issued => {}
                InvoiceStatus::Paid => {
                    return Err(EngineError::InvalidStatus(
                        "invoice already paid".to_string(),
                    ));
                }
                InvoiceStatus::Void => {
                    return Err(EngineError::InvalidStatus(
                        "cannot pay a voided invoice".to_string(),
                    ));
                }
            }
            invoice.status = InvoiceStatus::Paid;
            invoice.paid_at = Some(paid_at);

            let model = invoices::ActiveModel {
                id: ActiveValue::Set(invoice_id.to_string()),
                status: ActiveValue::Set(InvoiceStatus::Paid.as_str().to_string()),
                paid_at: ActiveValue::Set(Some(paid_at)),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(invoice)
        })
    }

    /// Voids an invoice (soft: status + voided_at/by). Paid invoices can
    /// never be voided.
    pub async fn void_invoice(
        &self,
        invoice_id: Uuid,
        user_id: &str,
        voided_at: DateTime<Utc>,
    ) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::InvoicesVoid)
                .await?;
            let mut invoice = self
                .require_invoice(&db_tx, invoice_id, user_id, role)
                .await?;

            match invoice.status {
                InvoiceStatus::Issued => {}
                InvoiceStatus::Paid => {
                    return Err(EngineError::InvalidStatus(
                        "cannot void a paid invoice".to_string(),
                    ));
                }
                InvoiceStatus::Void => {
                    return Err(EngineError::InvalidStatus(
                        "invoice already voided".to_string(),
                    ));
                }
            }
            invoice.status = InvoiceStatus::Void;
            invoice.voided_at = Some(voided_at);
            invoice.voided_by = Some(user_id.to_string());

            let model = invoices::ActiveModel {
                id: ActiveValue::Set(invoice_id.to_string()),
                status: ActiveValue::Set(InvoiceStatus::Void.as_str().to_string()),
                voided_at: ActiveValue::Set(Some(voided_at)),
                voided_by: ActiveValue::Set(Some(user_id.to_string())),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(invoice)
        })
    }

    pub async fn invoice(&self, invoice_id: Uuid, user_id: &str) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::InvoicesView)
                .await?;
            self.require_invoice(&db_tx, invoice_id, user_id, role).await
        })
    }

    /// Lists invoices newest-first. Voided ones are hidden by default;
    /// clients only see invoices for their own bookings.
    pub async fn list_invoices(
        &self,
        include_void: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Invoice>> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::InvoicesView)
                .await?;

            let mut query = invoices::Entity::find()
                .order_by_desc(invoices::Column::IssuedOn)
                .order_by_desc(invoices::Column::Number);
            if !include_void {
                query = query.filter(invoices::Column::Status.ne(InvoiceStatus::Void.as_str()));
            }
            if role == Role::Client {
                let own_events: Vec<String> = events::Entity::find()
                    .filter(events::Column::CreatedBy.eq(user_id.to_string()))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|m| m.id)
                    .collect();
                query = query.filter(invoices::Column::EventId.is_in(own_events));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Invoice::try_from).collect()
        })
    }
}
