// Event catalog: admin maintenance and user-facing listings
// Decision: Admin forms send free-form values; numbers that do not parse fall
// back (create: defaults, update: previous value), malformed dates are rejected
// Decision: Negative points are treated like unparsable input
// Decision: Only practice events keep a parent. The parent must exist and must
// not be a practice event or the event itself; an event that is a parent
// cannot become a practice event

use stamprally_core::{
    parse_optional_date, parse_optional_time, Actor, Entity, Event, EventDetail, EventSummary,
    EventType, NumericInput, PortalError, Result, DEFAULT_EVENT_POINTS,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::api::events::{CreateEventRequest, UpdateEventRequest};
use crate::storage::{EventFields, StorageBackend};

pub struct EventCatalogService {
    db: StorageBackend,
}

impl EventCatalogService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn create(&self, actor: &Actor, req: CreateEventRequest) -> Result<Event> {
        actor.require_admin()?;

        let title = req.title.trim();
        if title.is_empty() {
            return Err(PortalError::invalid_input("title is required"));
        }
        let event_type = match req.event_type.as_deref() {
            Some(value) if !value.trim().is_empty() => value.parse::<EventType>()?,
            _ => EventType::default(),
        };

        let mut fields = EventFields {
            title: title.to_string(),
            description: non_blank(req.description),
            date: parse_date_field(req.date.as_deref())?,
            location: non_blank(req.location),
            start_time: parse_time_field(req.start_time.as_deref())?,
            end_time: parse_time_field(req.end_time.as_deref())?,
            capacity: NumericInput::parse_or_keep(req.capacity.as_ref(), None),
            contact_name: non_blank(req.contact_name),
            notes: non_blank(req.notes),
            event_type: event_type.to_string(),
            points: NumericInput::parse_count_or(req.points.as_ref(), DEFAULT_EVENT_POINTS),
            parent_event_id: None,
        };
        fields.parent_event_id = self
            .resolve_parent(None, event_type, parse_parent(req.parent_event_id.as_deref())?)
            .await?;

        let row = self.db.create_event(fields).await?;
        tracing::info!(event_id = %row.id, title = %row.title, event_type = %row.event_type, "event created");
        Ok(row.into())
    }

    /// Partial update. Absent fields keep their value; empty text clears it.
    pub async fn update(&self, actor: &Actor, id: Uuid, req: UpdateEventRequest) -> Result<Event> {
        actor.require_admin()?;

        let existing = self
            .db
            .get_event(id)
            .await?
            .ok_or(PortalError::NotFound(Entity::Event))?;
        let mut fields = EventFields::from_row(&existing);

        if let Some(title) = req.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                fields.title = title.to_string();
            }
        }
        apply_text(&mut fields.description, req.description);
        apply_text(&mut fields.location, req.location);
        apply_text(&mut fields.contact_name, req.contact_name);
        apply_text(&mut fields.notes, req.notes);
        if let Some(date) = req.date.as_deref() {
            fields.date = parse_optional_date(date)?;
        }
        if let Some(start_time) = req.start_time.as_deref() {
            fields.start_time = parse_optional_time(start_time)?;
        }
        if let Some(end_time) = req.end_time.as_deref() {
            fields.end_time = parse_optional_time(end_time)?;
        }
        fields.capacity = NumericInput::parse_or_keep(req.capacity.as_ref(), fields.capacity);
        fields.points = NumericInput::parse_count_or(req.points.as_ref(), fields.points);

        let event_type = match req.event_type.as_deref() {
            Some(value) if !value.trim().is_empty() => value.parse::<EventType>()?,
            _ => EventType::from(existing.event_type.as_str()),
        };
        fields.event_type = event_type.to_string();

        if event_type == EventType::Practice
            && EventType::from(existing.event_type.as_str()) != EventType::Practice
            && self.db.has_child_events(id).await?
        {
            return Err(PortalError::invalid_input(
                "an event with practice sessions cannot become a practice event",
            ));
        }

        let requested_parent = match req.parent_event_id.as_deref() {
            None => existing.parent_event_id,
            Some(value) => parse_parent(Some(value))?,
        };
        fields.parent_event_id = self
            .resolve_parent(Some(id), event_type, requested_parent)
            .await?;

        let row = self
            .db
            .update_event(id, fields)
            .await?
            .ok_or(PortalError::NotFound(Entity::Event))?;
        tracing::info!(event_id = %id, "event updated");
        Ok(row.into())
    }

    /// Delete an event with its participations. Stamp history is kept and
    /// practice events pointing at it lose their parent.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        actor.require_admin()?;
        if !self.db.delete_event(id).await? {
            return Err(PortalError::NotFound(Entity::Event));
        }
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }

    /// Flip `is_active`. Existing participations are untouched.
    pub async fn toggle(&self, actor: &Actor, id: Uuid) -> Result<Event> {
        actor.require_admin()?;
        let row = self
            .db
            .toggle_event(id)
            .await?
            .ok_or(PortalError::NotFound(Entity::Event))?;
        tracing::info!(event_id = %id, is_active = row.is_active, "event toggled");
        Ok(row.into())
    }

    /// All events by date with the actor's join state.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<EventSummary>> {
        let joined: HashSet<Uuid> = self
            .db
            .list_participations_for_user(actor.user_id)
            .await?
            .into_iter()
            .map(|p| p.event_id)
            .collect();

        let events = self.db.list_events().await?;
        Ok(events
            .into_iter()
            .map(|row| EventSummary {
                joined: joined.contains(&row.id),
                event: row.into(),
            })
            .collect())
    }

    pub async fn detail(&self, id: Uuid) -> Result<EventDetail> {
        let event = self
            .db
            .get_event(id)
            .await?
            .ok_or(PortalError::NotFound(Entity::Event))?;
        let participants: Vec<_> = self
            .db
            .list_event_participants(id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(EventDetail {
            event: event.into(),
            current_count: participants.len(),
            participants,
        })
    }

    async fn resolve_parent(
        &self,
        event_id: Option<Uuid>,
        event_type: EventType,
        parent_id: Option<Uuid>,
    ) -> Result<Option<Uuid>> {
        if event_type != EventType::Practice {
            return Ok(None);
        }
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        if Some(parent_id) == event_id {
            return Err(PortalError::invalid_input("an event cannot be its own parent"));
        }
        let parent = self
            .db
            .get_event(parent_id)
            .await?
            .ok_or_else(|| PortalError::invalid_input("parent event does not exist"))?;
        if EventType::from(parent.event_type.as_str()) == EventType::Practice {
            return Err(PortalError::invalid_input(
                "a practice event cannot be a parent",
            ));
        }
        Ok(Some(parent_id))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn apply_text(field: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *field = non_blank(Some(value));
    }
}

fn parse_date_field(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    value.map_or(Ok(None), parse_optional_date)
}

fn parse_time_field(value: Option<&str>) -> Result<Option<chrono::NaiveTime>> {
    value.map_or(Ok(None), parse_optional_time)
}

fn parse_parent(value: Option<&str>) -> Result<Option<Uuid>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| PortalError::invalid_input(format!("invalid parent event id: {value}"))),
    }
}
