use crate::{events::Event, timers::TimerBoard};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc::UnboundedSender, Mutex},
    task::{self, JoinHandle},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument};

/// Default tick period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What the ticker tells the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Every timer on the board was recomputed
    Ticked,
    /// An event's countdown just hit zero
    Reached(Event),
}

/// Owns the background task recomputing the timers, stopping it when dropped
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// First tick happens one `period` after starting
    #[instrument(level = "trace", skip_all, fields(events = events.len()))]
    pub fn start(
        events: Vec<Event>,
        period: Duration,
        board: Arc<Mutex<TimerBoard>>,
        notices: UnboundedSender<Notice>,
    ) -> Self {
        let handle = task::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let reached = board.lock().await.tick(&events, Utc::now());

                for id in reached {
                    let Some(event) = events.iter().find(|event| event.id == id) else {
                        continue;
                    };
                    info!("Event '{}' reached", event.name);
                    if notices.send(Notice::Reached(event.clone())).is_err() {
                        debug!("Notice receiver dropped, stopping ticker");
                        return;
                    }
                }

                if notices.send(Notice::Ticked).is_err() {
                    debug!("Notice receiver dropped, stopping ticker");
                    return;
                }
            }
        });

        debug!("Ticker started");
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops ticking and waits until the task is gone
    pub async fn stop(mut self) {
        self.handle.abort();
        // Drop runs abort again, which is a no-op on a finished task
        let _ = (&mut self.handle).await;
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
