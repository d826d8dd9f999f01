//! Organization events and RSVPs.
//!
//! Each member has at most one attendance row per event (unique index on
//! `event_id, username`). Answering again overwrites the stored value.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use entity::event_attendance::{self, Rsvp};
use entity::{event, event::Entity as EventEntity, event_attendance::Entity as AttendanceEntity};

use crate::error::{ServiceError, ServiceResult};
use crate::service::organizations::{find_organization, require_member};
use crate::service::validate;
use crate::util::{now_ts, parse_rfc3339, ts_to_rfc3339, uuid_v4};

#[derive(Debug, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 timestamp.
    pub starts_at: String,
}

/// Body of an RSVP update. Both `{}` and an empty body leave the answer unset.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RsvpUpdate {
    #[serde(default)]
    pub rsvp: Option<Rsvp>,
}

impl RsvpUpdate {
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AttendanceView {
    pub username: String,
    pub rsvp: Rsvp,
}

#[derive(Debug, Serialize)]
pub struct EventView {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: String,
    pub starts_at: String,
    pub creator_username: String,
    pub attendance: Vec<AttendanceView>,
}

async fn views<C: ConnectionTrait>(db: &C, events: Vec<event::Model>) -> ServiceResult<Vec<EventView>> {
    let mut attendance: HashMap<String, Vec<AttendanceView>> = HashMap::new();
    if !events.is_empty() {
        let rows = AttendanceEntity::find()
            .filter(event_attendance::Column::EventId.is_in(events.iter().map(|e| e.id.clone())))
            .order_by_asc(event_attendance::Column::Username)
            .all(db)
            .await?;
        for row in rows {
            attendance.entry(row.event_id).or_default().push(AttendanceView {
                username: row.username,
                rsvp: row.rsvp,
            });
        }
    }

    Ok(events
        .into_iter()
        .map(|e| EventView {
            attendance: attendance.remove(&e.id).unwrap_or_default(),
            id: e.id,
            organization_id: e.organization_id,
            title: e.title,
            description: e.description,
            starts_at: ts_to_rfc3339(e.starts_at),
            creator_username: e.creator,
        })
        .collect())
}

async fn find_event<C: ConnectionTrait>(db: &C, event_id: &str) -> ServiceResult<event::Model> {
    EventEntity::find_by_id(event_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Event not found"))
}

/// Schedule an event. Only the organization owner may do this.
pub async fn create_event(db: &DatabaseConnection, actor: &str, org_id: &str, new: NewEvent) -> ServiceResult<EventView> {
    let org = find_organization(db, org_id).await?;
    if org.owner != actor {
        return Err(ServiceError::forbidden("Only the organization owner can create events"));
    }

    let title = validate::required("title", &new.title, validate::EVENT_TITLE_MAX)?;
    let starts_at = parse_rfc3339(&new.starts_at)
        .ok_or_else(|| ServiceError::validation("starts_at: Datetime has wrong format. Use RFC 3339."))?;

    let event = event::ActiveModel {
        id: Set(uuid_v4()),
        organization_id: Set(org.id),
        creator: Set(actor.to_string()),
        title: Set(title),
        description: Set(new.description),
        starts_at: Set(starts_at),
        created_at: Set(now_ts()),
    }
    .insert(db)
    .await?;

    tracing::debug!(event_id = %event.id, org_id, "event created");
    Ok(EventView {
        id: event.id,
        organization_id: event.organization_id,
        title: event.title,
        description: event.description,
        starts_at: ts_to_rfc3339(event.starts_at),
        creator_username: event.creator,
        attendance: Vec::new(),
    })
}

/// Events of one organization ordered by start time. Members only.
pub async fn org_events(db: &DatabaseConnection, actor: &str, org_id: &str) -> ServiceResult<Vec<EventView>> {
    require_member(db, org_id, actor).await?;

    let events = EventEntity::find()
        .filter(event::Column::OrganizationId.eq(org_id))
        .order_by_asc(event::Column::StartsAt)
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?;
    views(db, events).await
}

pub async fn get_event(db: &DatabaseConnection, actor: &str, event_id: &str) -> ServiceResult<EventView> {
    let event = find_event(db, event_id).await?;
    require_member(db, &event.organization_id, actor).await?;

    let mut out = views(db, vec![event]).await?;
    out.pop().ok_or_else(|| ServiceError::not_found("Event not found"))
}

/// Record `actor`'s answer for an event, creating the attendance row on first use.
///
/// A missing answer means undecided. Members of the event's organization only.
pub async fn rsvp(db: &DatabaseConnection, actor: &str, event_id: &str, answer: Option<Rsvp>) -> ServiceResult<Rsvp> {
    let answer = answer.unwrap_or_default();
    let txn = db.begin().await?;

    let event = find_event(&txn, event_id).await?;
    if let Err(e) = require_member(&txn, &event.organization_id, actor).await {
        return Err(match e {
            ServiceError::Forbidden(_) => {
                ServiceError::forbidden("You must be a member of the organization to RSVP")
            }
            other => other,
        });
    }

    let now = now_ts();
    let existing = AttendanceEntity::find()
        .filter(event_attendance::Column::EventId.eq(event_id))
        .filter(event_attendance::Column::Username.eq(actor))
        .one(&txn)
        .await?;

    match existing {
        Some(row) => {
            let mut active: event_attendance::ActiveModel = row.into();
            active.rsvp = Set(answer);
            active.updated_at = Set(now);
            active.update(&txn).await?;
        }
        None => {
            event_attendance::ActiveModel {
                id: Set(uuid_v4()),
                event_id: Set(event_id.to_string()),
                username: Set(actor.to_string()),
                rsvp: Set(answer),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    tracing::debug!(event_id, username = actor, rsvp = answer.label(), "rsvp recorded");
    Ok(answer)
}
