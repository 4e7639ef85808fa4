use crate::{
    config::Config,
    error::CountdownError,
    events::{Event, EventStore},
    storage::KeyValueStorage,
    ticker::{Notice, Ticker},
    time::{validate_new_event, DateComposer},
    timers::{CountdownTimer, TimerBoard},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    Mutex,
};
use tracing::{debug, instrument};

/// Which picker, if any, is currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerMode {
    #[default]
    Hidden,
    Date,
    Time,
}

/// What the user chose in a picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerSelection {
    Date(NaiveDate),
    Time(NaiveTime),
}

/// Countdowns only tick while there are events and no picker is open
pub struct Session<S> {
    store: EventStore<S>,
    composer: DateComposer,
    picker: PickerMode,
    board: Arc<Mutex<TimerBoard>>,
    ticker: Option<Ticker>,
    tick_period: Duration,
    notices: UnboundedSender<Notice>,
}

impl<S: KeyValueStorage> Session<S> {
    /// Loads the stored events and starts ticking if there are any
    #[instrument(level = "trace", skip_all)]
    pub async fn open(
        storage: S,
        config: &Config,
    ) -> Result<(Self, UnboundedReceiver<Notice>), CountdownError> {
        config.validate()?;

        let (notices, receiver) = mpsc::unbounded_channel();
        let mut session = Self {
            store: EventStore::with_key(storage, config.storage_key.clone()),
            composer: DateComposer::now(),
            picker: PickerMode::Hidden,
            board: Arc::new(Mutex::new(TimerBoard::new())),
            ticker: None,
            tick_period: config.tick_period(),
            notices,
        };

        session.store.list().await?;
        debug!("Loaded {} events", session.store.events().len());
        session.sync_ticker().await;

        Ok((session, receiver))
    }

    /// Events in stored order
    pub fn events(&self) -> &[Event] {
        self.store.events()
    }

    /// Events ordered by date, soonest first
    pub fn events_by_date(&self) -> Vec<&Event> {
        let mut events: Vec<_> = self.store.events().iter().collect();
        events.sort_by_key(|event| event.date);
        events
    }

    /// Re-reads the events from storage
    pub async fn list_events(&mut self) -> Result<&[Event], CountdownError> {
        self.store.list().await?;
        self.sync_ticker().await;
        Ok(self.store.events())
    }

    /// Validates and stores a new event, nothing is written if validation fails
    pub async fn add_event(
        &mut self,
        name: &str,
        date: DateTime<Utc>,
    ) -> Result<Event, CountdownError> {
        validate_new_event(name, date, Utc::now())?;

        let event = Event::new(name.trim(), date);
        self.store.add(event.clone()).await?;
        // It was in the future a moment ago, so reaching zero before the first tick still counts.
        // The old ticker does not know the event and would drop the mark, so it goes first.
        self.stop_ticker().await;
        self.board.lock().await.expect_arrival(&event.id);
        self.sync_ticker().await;

        Ok(event)
    }

    /// Adds an event at the date currently held by the composer
    pub async fn add_composed_event(&mut self, name: &str) -> Result<Event, CountdownError> {
        let date = self.composer.compose()?;
        self.add_event(name, date).await
    }

    /// Confirming the deletion is up to the caller
    pub async fn delete_event(&mut self, id: &str) -> Result<(), CountdownError> {
        self.store.delete(id).await?;
        self.sync_ticker().await;
        Ok(())
    }

    /// `None` until the first tick after the event was added
    pub async fn get_timer(&self, event_id: &str) -> Option<CountdownTimer> {
        self.board.lock().await.get(event_id)
    }

    /// Recomputes every timer right away instead of waiting for the next tick
    pub async fn refresh_timers(&self, now: DateTime<Utc>) -> Vec<Event> {
        let reached = self.board.lock().await.tick(self.store.events(), now);
        self.store
            .events()
            .iter()
            .filter(|event| reached.contains(&event.id))
            .cloned()
            .collect()
    }

    pub fn composer(&self) -> &DateComposer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut DateComposer {
        &mut self.composer
    }

    pub fn picker(&self) -> PickerMode {
        self.picker
    }

    /// Shows a picker, which pauses the countdowns
    pub async fn open_picker(&mut self, mode: PickerMode) {
        self.picker = mode;
        self.sync_ticker().await;
    }

    /// Hides the picker and applies the selection, if the user made one
    pub async fn close_picker(&mut self, selection: Option<PickerSelection>) {
        match selection {
            Some(PickerSelection::Date(date)) => self.composer.pick_date(date),
            Some(PickerSelection::Time(time)) => self.composer.pick_time(time),
            None => {}
        }

        self.picker = PickerMode::Hidden;
        self.sync_ticker().await;
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_running)
    }

    /// Stops the ticker, call when the screen goes away
    pub async fn shutdown(mut self) {
        self.stop_ticker().await;
    }

    async fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop().await;
        }
    }

    /// Restarts the ticker on the current events, or leaves it stopped if it should not run
    async fn sync_ticker(&mut self) {
        self.stop_ticker().await;

        if self.store.events().is_empty() || self.picker != PickerMode::Hidden {
            debug!("Countdowns paused");
            return;
        }

        self.ticker = Some(Ticker::start(
            self.store.events().to_vec(),
            self.tick_period,
            self.board.clone(),
            self.notices.clone(),
        ));
    }
}
