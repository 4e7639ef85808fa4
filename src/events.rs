use crate::{
    error::{CountdownError, StorageError},
    storage::KeyValueStorage,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Storage key the event list is kept under
pub const DEFAULT_STORAGE_KEY: &str = "@countdowntimer_events";

/// A named point in time to count down to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(with = "event_date")]
    pub date: DateTime<Utc>,
}

impl Event {
    /// Creates an event with a freshly generated id
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            date,
        }
    }
}

/// Dates are written as ISO-8601 and read back from either ISO-8601 or epoch milliseconds
mod event_date {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let millis = match RawDate::deserialize(deserializer)? {
            RawDate::Millis(millis) => millis,
            RawDate::Text(text) => {
                if let Ok(date) = DateTime::parse_from_rfc3339(&text) {
                    return Ok(date.with_timezone(&Utc));
                }
                text.trim()
                    .parse::<i64>()
                    .map_err(|_| de::Error::custom(format!("invalid event date: {text}")))?
            }
        };

        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| de::Error::custom(format!("event date out of range: {millis}")))
    }
}

/// The persisted event list and the projection of it the UI reads from
pub struct EventStore<S> {
    storage: S,
    key: String,
    events: Vec<Event>,
}

impl<S: KeyValueStorage> EventStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            events: Vec::new(),
        }
    }

    /// Events as of the last successful read or write
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the persisted list and refreshes the in-memory projection
    #[instrument(level = "trace", skip(self))]
    pub async fn list(&mut self) -> Result<&[Event], CountdownError> {
        self.events = self.read().await?;
        Ok(&self.events)
    }

    #[instrument(level = "trace", skip(self), fields(id = %event.id))]
    pub async fn add(&mut self, event: Event) -> Result<(), CountdownError> {
        let mut events = self.read().await?;
        if events.iter().any(|existing| existing.id == event.id) {
            return Err(CountdownError::DuplicateEventId(event.id));
        }

        info!("Adding event '{}' at {}", event.name, event.date);
        events.push(event);
        self.write(&events).await?;
        self.events = events;

        Ok(())
    }

    /// Removes the event with `id`, doing nothing if there is none
    #[instrument(level = "trace", skip(self))]
    pub async fn delete(&mut self, id: &str) -> Result<(), CountdownError> {
        let mut events = self.read().await?;
        let before = events.len();
        events.retain(|event| event.id != id);

        if events.len() == before {
            debug!("No event with id {id}, writing the list back unchanged");
        } else {
            info!("Deleting event {id}");
        }

        self.write(&events).await?;
        self.events = events;

        Ok(())
    }

    async fn read(&self) -> Result<Vec<Event>, CountdownError> {
        let Some(raw) = self
            .storage
            .get_item(&self.key)
            .await
            .map_err(|error| CountdownError::StorageRead(error.into()))? else {
            debug!("No events stored yet");
            return Ok(Vec::new());
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|error| CountdownError::StorageRead(error.into()))
    }

    async fn write(&self, events: &[Event]) -> Result<(), CountdownError> {
        let raw = serde_json::to_string(events)
            .map_err(|error| CountdownError::StorageWrite(StorageError::from(error)))?;

        self.storage
            .set_item(&self.key, &raw)
            .await
            .map_err(|error| CountdownError::StorageWrite(error.into()))
    }
}
