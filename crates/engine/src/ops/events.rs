//! Event booking, quoting and listing.

use base64::Engine as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Permission, ResultEngine, Role, event_upcharges, events,
    events::{Event, EventStatus},
    packages::MenuPackage,
    pricing::{self, Quote, QuoteInput},
    util,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

/// Prices a prospective selection without persisting anything.
#[derive(Clone, Debug)]
pub struct QuoteCmd {
    pub package_id: Uuid,
    pub adult_count: u32,
    pub child_count: u32,
    pub upcharge_ids: Vec<Uuid>,
    pub gratuity_percent: u8,
    pub user_id: String,
}

/// Books an event; the computed quote is snapshotted on the row.
#[derive(Clone, Debug)]
pub struct BookEventCmd {
    pub client_id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub package_id: Uuid,
    pub adult_count: u32,
    pub child_count: u32,
    pub upcharge_ids: Vec<Uuid>,
    pub gratuity_percent: u8,
    pub note: Option<String>,
    pub user_id: String,
}

/// Updates an event; `None` fields stay unchanged. Any change re-quotes.
#[derive(Clone, Debug, Default)]
pub struct UpdateEventCmd {
    pub name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub package_id: Option<Uuid>,
    pub adult_count: Option<u32>,
    pub child_count: Option<u32>,
    pub upcharge_ids: Option<Vec<Uuid>>,
    pub gratuity_percent: Option<u8>,
    pub note: Option<String>,
}

/// Filters for listing events.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`).
#[derive(Clone, Debug, Default)]
pub struct EventListFilter {
    pub status: Option<EventStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn validate_list_filter(filter: &EventListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidDate(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EventsCursor {
    event_date: NaiveDate,
    event_id: String,
}

impl EventsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid events cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid events cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid events cursor".to_string()))
    }
}

/// Set semantics for the selected upcharges: duplicates collapse, first
/// occurrence keeps its position.
fn dedupe_upcharges(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

impl Engine {
    async fn quote_for(
        &self,
        db: &DatabaseTransaction,
        package: &MenuPackage,
        upcharge_ids: &[Uuid],
        adult_count: u32,
        child_count: u32,
        gratuity_percent: u8,
    ) -> ResultEngine<(Quote, Vec<Uuid>)> {
        let upcharge_ids = dedupe_upcharges(upcharge_ids);

        let mut upcharge_amounts = Vec::with_capacity(upcharge_ids.len());
        for id in &upcharge_ids {
            let upcharge = self.require_upcharge(db, *id).await?;
            if upcharge.archived {
                return Err(EngineError::InvalidAmount(format!(
                    "upcharge \"{}\" is archived",
                    upcharge.name
                )));
            }
            upcharge_amounts.push(upcharge.amount);
        }

        let quote = pricing::compute_quote(&QuoteInput {
            adult_count,
            child_count,
            adult_price: package.adult_price,
            child_price: package.child_price,
            upcharges: upcharge_amounts,
            gratuity_percent,
        })?;

        Ok((quote, upcharge_ids))
    }

    async fn load_event_upcharges(
        &self,
        db: &DatabaseTransaction,
        event_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let rows = event_upcharges::Entity::find()
            .filter(event_upcharges::Column::EventId.eq(event_id.to_string()))
            .all(db)
            .await?;
        rows.iter()
            .map(|row| util::parse_uuid(&row.upcharge_id, "upcharge"))
            .collect()
    }

    async fn require_event(
        &self,
        db: &DatabaseTransaction,
        event_id: Uuid,
        user_id: &str,
        role: Role,
    ) -> ResultEngine<Event> {
        let model = events::Entity::find_by_id(event_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))?;
        let mut event = Event::try_from(model)?;
        // Clients only see their own bookings; hide the rest entirely.
        if role == Role::Client && event.created_by != user_id {
            return Err(EngineError::KeyNotFound("event not exists".to_string()));
        }
        event.upcharge_ids = self.load_event_upcharges(db, event_id).await?;
        Ok(event)
    }

    /// Prices a selection against the catalog without creating anything.
    pub async fn price_quote(&self, cmd: QuoteCmd) -> ResultEngine<Quote> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, &cmd.user_id, Permission::EventsView)
                .await?;
            let package = self.require_package(&db_tx, cmd.package_id).await?;
            if package.archived {
                return Err(EngineError::InvalidAmount(format!(
                    "package \"{}\" is archived",
                    package.name
                )));
            }
            let (quote, _) = self
                .quote_for(
                    &db_tx,
                    &package,
                    &cmd.upcharge_ids,
                    cmd.adult_count,
                    cmd.child_count,
                    cmd.gratuity_percent,
                )
                .await?;
            Ok(quote)
        })
    }

    /// Books an event for a client.
    ///
    /// Validates the client and package, enforces the package guest minimum,
    /// computes the quote and snapshots it on the event row.
    pub async fn book_event(&self, cmd: BookEventCmd) -> ResultEngine<Event> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, &cmd.user_id, Permission::EventsCreate)
                .await?;
            let name = normalize_required_name(&cmd.name, "event")?;

            let client = self.require_client(&db_tx, cmd.client_id).await?;
            if client.archived {
                return Err(EngineError::InvalidAmount(format!(
                    "client \"{}\" is archived",
                    client.name
                )));
            }

            let package = self.require_package(&db_tx, cmd.package_id).await?;
            if package.archived {
                return Err(EngineError::InvalidAmount(format!(
                    "package \"{}\" is archived",
                    package.name
                )));
            }
            let guests = cmd.adult_count + cmd.child_count;
            if guests < package.min_guests {
                return Err(EngineError::InvalidAmount(format!(
                    "package \"{}\" requires at least {} guests",
                    package.name, package.min_guests
                )));
            }

            let (quote, upcharge_ids) = self
                .quote_for(
                    &db_tx,
                    &package,
                    &cmd.upcharge_ids,
                    cmd.adult_count,
                    cmd.child_count,
                    cmd.gratuity_percent,
                )
                .await?;

            let event = Event {
                id: Uuid::new_v4(),
                client_id: cmd.client_id,
                name,
                event_date: cmd.event_date,
                package_id: cmd.package_id,
                adult_count: cmd.adult_count,
                child_count: cmd.child_count,
                upcharge_ids: upcharge_ids.clone(),
                gratuity_percent: cmd.gratuity_percent,
                subtotal: quote.subtotal,
                gratuity: quote.gratuity,
                total: quote.total,
                currency: package.currency,
                status: EventStatus::Booked,
                note: normalize_optional_text(cmd.note.as_deref()),
                created_by: cmd.user_id.clone(),
                canceled_at: None,
                canceled_by: None,
            };

            events::ActiveModel::from(&event).insert(&db_tx).await?;
            for upcharge_id in &upcharge_ids {
                let row = event_upcharges::ActiveModel {
                    event_id: ActiveValue::Set(event.id.to_string()),
                    upcharge_id: ActiveValue::Set(upcharge_id.to_string()),
                };
                row.insert(&db_tx).await?;
            }

            Ok(event)
        })
    }

    /// Updates a booked/confirmed event and re-quotes it.
    pub async fn update_event(
        &self,
        event_id: Uuid,
        cmd: UpdateEventCmd,
        user_id: &str,
    ) -> ResultEngine<Event> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::EventsEdit)
                .await?;
            let mut event = self.require_event(&db_tx, event_id, user_id, role).await?;

            match event.status {
                EventStatus::Booked | EventStatus::Confirmed => {}
                EventStatus::Completed => {
                    return Err(EngineError::InvalidStatus(
                        "cannot update a completed event".to_string(),
                    ));
                }
                EventStatus::Canceled => {
                    return Err(EngineError::InvalidStatus(
                        "cannot update a canceled event".to_string(),
                    ));
                }
            }

            if let Some(name) = &cmd.name {
                event.name = normalize_required_name(name, "event")?;
            }
            if let Some(event_date) = cmd.event_date {
                event.event_date = event_date;
            }
            if let Some(package_id) = cmd.package_id {
                event.package_id = package_id;
            }
            if let Some(adult_count) = cmd.adult_count {
                event.adult_count = adult_count;
            }
            if let Some(child_count) = cmd.child_count {
                event.child_count = child_count;
            }
            if let Some(upcharge_ids) = &cmd.upcharge_ids {
                event.upcharge_ids = upcharge_ids.clone();
            }
            if let Some(gratuity_percent) = cmd.gratuity_percent {
                event.gratuity_percent = gratuity_percent;
            }
            if let Some(note) = normalize_optional_text(cmd.note.as_deref()) {
                event.note = Some(note);
            }

            let package = self.require_package(&db_tx, event.package_id).await?;
            if package.archived {
                return Err(EngineError::InvalidAmount(format!(
                    "package \"{}\" is archived",
                    package.name
                )));
            }
            let guests = event.adult_count + event.child_count;
            if guests < package.min_guests {
                return Err(EngineError::InvalidAmount(format!(
                    "package \"{}\" requires at least {} guests",
                    package.name, package.min_guests
                )));
            }

            let (quote, upcharge_ids) = self
                .quote_for(
                    &db_tx,
                    &package,
                    &event.upcharge_ids,
                    event.adult_count,
                    event.child_count,
                    event.gratuity_percent,
                )
                .await?;
            event.upcharge_ids = upcharge_ids;
            event.subtotal = quote.subtotal;
            event.gratuity = quote.gratuity;
            event.total = quote.total;
            event.currency = package.currency;

            let mut model = events::ActiveModel::from(&event);
            model.id = ActiveValue::Unchanged(event_id.to_string());
            model.update(&db_tx).await?;

            event_upcharges::Entity::delete_many()
                .filter(event_upcharges::Column::EventId.eq(event_id.to_string()))
                .exec(&db_tx)
                .await?;
            for upcharge_id in &event.upcharge_ids {
                let row = event_upcharges::ActiveModel {
                    event_id: ActiveValue::Set(event_id.to_string()),
                    upcharge_id: ActiveValue::Set(upcharge_id.to_string()),
                };
                row.insert(&db_tx).await?;
            }

            Ok(event)
        })
    }

    /// Moves an event forward: booked → confirmed → completed.
    pub async fn update_event_status(
        &self,
        event_id: Uuid,
        status: EventStatus,
        user_id: &str,
    ) -> ResultEngine<Event> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::EventsEdit)
                .await?;
            let mut event = self.require_event(&db_tx, event_id, user_id, role).await?;

            let allowed = matches!(
                (event.status, status),
                (EventStatus::Booked, EventStatus::Confirmed)
                    | (EventStatus::Confirmed, EventStatus::Completed)
            );
            if !allowed {
                return Err(EngineError::InvalidStatus(format!(
                    "cannot move event from {} to {}",
                    event.status.as_str(),
                    status.as_str()
                )));
            }
            event.status = status;

            let model = events::ActiveModel {
                id: ActiveValue::Set(event_id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(event)
        })
    }

    /// Cancels an event (soft: status + canceled_at/by). Completed and
    /// already-canceled events cannot be canceled.
    pub async fn cancel_event(
        &self,
        event_id: Uuid,
        user_id: &str,
        canceled_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::EventsCancel)
                .await?;
            let event = self.require_event(&db_tx, event_id, user_id, role).await?;

            match event.status {
                EventStatus::Canceled => {
                    return Err(EngineError::InvalidStatus(
                        "event already canceled".to_string(),
                    ));
                }
                EventStatus::Completed => {
                    return Err(EngineError::InvalidStatus(
                        "cannot cancel a completed event".to_string(),
                    ));
                }
                EventStatus::Booked | EventStatus::Confirmed => {}
            }

            let model = events::ActiveModel {
                id: ActiveValue::Set(event_id.to_string()),
                status: ActiveValue::Set(EventStatus::Canceled.as_str().to_string()),
                canceled_at: ActiveValue::Set(Some(canceled_at)),
                canceled_by: ActiveValue::Set(Some(user_id.to_string())),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Returns one event with its selected upcharges.
    pub async fn event(&self, event_id: Uuid, user_id: &str) -> ResultEngine<Event> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::EventsView)
                .await?;
            self.require_event(&db_tx, event_id, user_id, role).await
        })
    }

    /// Lists events with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(event_date DESC, id DESC)`. Clients
    /// only see their own bookings. Upcharge selections are not loaded here;
    /// use [`Engine::event`] for the detail view.
    pub async fn list_events_page(
        &self,
        limit: u64,
        cursor: Option<&str>,
        filter: &EventListFilter,
        user_id: &str,
    ) -> ResultEngine<(Vec<Event>, Option<String>)> {
        with_tx!(self, |db_tx| {
            let role = self
                .require_permission(&db_tx, user_id, Permission::EventsView)
                .await?;
            validate_list_filter(filter)?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = events::Entity::find()
                .order_by_desc(events::Column::EventDate)
                .order_by_desc(events::Column::Id)
                .limit(limit_plus_one);

            if role == Role::Client {
                query = query.filter(events::Column::CreatedBy.eq(user_id.to_string()));
            }
            if let Some(status) = filter.status {
                query = query.filter(events::Column::Status.eq(status.as_str()));
            }
            if let Some(from) = filter.from {
                query = query.filter(events::Column::EventDate.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(events::Column::EventDate.lt(to));
            }

            if let Some(cursor) = cursor {
                let cursor = EventsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(events::Column::EventDate.lt(cursor.event_date))
                        .add(
                            Condition::all()
                                .add(events::Column::EventDate.eq(cursor.event_date))
                                .add(events::Column::Id.lt(cursor.event_id)),
                        ),
                );
            }

            let rows: Vec<events::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Event> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(Event::try_from(model)?);
            }

            let next_cursor = out.last().map(|event| EventsCursor {
                event_date: event.event_date,
                event_id: event.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
