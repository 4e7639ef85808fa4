use crate::events::Event;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Seconds in a day, hour, minute and second, largest first
const SECONDS_PER_UNIT: [u64; 4] = [86_400, 3_600, 60, 1];

/// Remaining time until an event, split into calendar-ish units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CountdownTimer {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CountdownTimer {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Splits a number of seconds into days, hours, minutes and seconds
    pub fn from_seconds(total: u64) -> Self {
        let mut rest = total;
        let [days, hours, minutes, seconds] = SECONDS_PER_UNIT.map(|unit| {
            let amount = rest / unit;
            rest -= amount * unit;
            amount
        });

        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Time left from `now` until `target`, zero once the target has passed
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if target <= now {
            return Self::ZERO;
        }

        let remaining = (target - now).num_seconds().max(0) as u64;
        Self::from_seconds(remaining)
    }

    pub fn total_seconds(&self) -> u64 {
        self.days * SECONDS_PER_UNIT[0]
            + self.hours * SECONDS_PER_UNIT[1]
            + self.minutes * SECONDS_PER_UNIT[2]
            + self.seconds
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// The result of recomputing every timer at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tick {
    pub timers: HashMap<String, CountdownTimer>,
    /// Ids of the events whose countdown hit zero on this tick
    pub reached: Vec<String>,
}

/// Computes countdowns and remembers which events were already at zero
#[derive(Debug, Default)]
pub struct CountdownEngine {
    /// Whether each event's timer was zero on the previous tick
    was_zero: HashMap<String, bool>,
}

impl CountdownEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts `event_id` as not yet reached, even if its first tick already sees zero
    pub fn expect_arrival(&mut self, event_id: &str) {
        self.was_zero.insert(event_id.to_owned(), false);
    }

    /// Events seen at zero on their first tick are treated as already reached
    pub fn tick(&mut self, events: &[Event], now: DateTime<Utc>) -> Tick {
        let mut timers = HashMap::with_capacity(events.len());
        let mut reached = Vec::new();
        let mut was_zero = HashMap::with_capacity(events.len());

        for event in events {
            let timer = CountdownTimer::until(event.date, now);
            let zero = timer.is_zero();

            if zero && self.was_zero.get(&event.id) == Some(&false) {
                debug!("Event {} reached", event.id);
                reached.push(event.id.clone());
            }

            was_zero.insert(event.id.clone(), zero);
            timers.insert(event.id.clone(), timer);
        }

        self.was_zero = was_zero;

        Tick { timers, reached }
    }
}

/// The latest timers, shared between the ticker and whoever displays them
#[derive(Debug, Default)]
pub struct TimerBoard {
    engine: CountdownEngine,
    timers: HashMap<String, CountdownTimer>,
}

impl TimerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every timer and returns the ids that just reached zero
    pub fn tick(&mut self, events: &[Event], now: DateTime<Utc>) -> Vec<String> {
        let Tick { timers, reached } = self.engine.tick(events, now);
        self.timers = timers;
        reached
    }

    pub fn expect_arrival(&mut self, event_id: &str) {
        self.engine.expect_arrival(event_id);
    }

    pub fn get(&self, event_id: &str) -> Option<CountdownTimer> {
        self.timers.get(event_id).copied()
    }

    pub fn timers(&self) -> &HashMap<String, CountdownTimer> {
        &self.timers
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn event(id: &str, date: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            name: format!("event {id}"),
            date,
        }
    }

    #[test]
    fn test_decomposition_example() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2024, 1, 2, 1, 2, 3).unwrap();

        let timer = CountdownTimer::until(target, now);

        assert_eq!(timer.total_seconds(), 90_123);
        assert_eq!(
            timer,
            CountdownTimer {
                days: 1,
                hours: 1,
                minutes: 2,
                seconds: 3
            }
        );
    }

    #[test]
    fn test_past_and_present_are_zero() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(CountdownTimer::until(now, now), CountdownTimer::ZERO);
        assert_eq!(
            CountdownTimer::until(now - Duration::days(3), now),
            CountdownTimer::ZERO
        );
        assert!(CountdownTimer::until(now + Duration::milliseconds(400), now).is_zero());
    }

    #[test]
    fn test_reached_fires_once() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = vec![event("a", now + Duration::seconds(2))];
        let mut engine = CountdownEngine::new();

        let ticks: Vec<_> = (0..5)
            .map(|i| engine.tick(&events, now + Duration::seconds(i)))
            .collect();

        assert!(ticks[0].reached.is_empty());
        assert!(ticks[1].reached.is_empty());
        assert_eq!(ticks[2].reached, vec!["a".to_string()]);
        assert!(ticks[3].reached.is_empty());
        assert!(ticks[4].reached.is_empty());
        assert_eq!(ticks[4].timers["a"], CountdownTimer::ZERO);
    }

    #[test]
    fn test_already_past_events_do_not_fire() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = vec![event("old", now - Duration::hours(1))];
        let mut engine = CountdownEngine::new();

        assert!(engine.tick(&events, now).reached.is_empty());
        assert!(engine.tick(&events, now + Duration::seconds(1)).reached.is_empty());
    }

    #[test]
    fn test_expected_arrival_fires_on_first_tick() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = vec![event("new", now + Duration::milliseconds(150))];
        let mut engine = CountdownEngine::new();
        engine.expect_arrival("new");

        let first = engine.tick(&events, now + Duration::milliseconds(300));
        let second = engine.tick(&events, now + Duration::milliseconds(600));

        assert_eq!(first.reached, vec!["new".to_string()]);
        assert!(second.reached.is_empty());
    }

    #[test]
    fn test_deleted_events_are_forgotten() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = event("a", now + Duration::seconds(10));
        let b = event("b", now + Duration::seconds(1));
        let mut engine = CountdownEngine::new();

        engine.tick(&[a.clone(), b.clone()], now);
        let tick = engine.tick(&[a], now + Duration::seconds(1));

        assert!(tick.reached.is_empty());
        assert!(!tick.timers.contains_key("b"));
    }

    #[test]
    fn test_board_replaces_all_timers() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut board = TimerBoard::new();

        board.tick(&[event("a", now + Duration::seconds(61))], now);
        assert_eq!(
            board.get("a"),
            Some(CountdownTimer {
                days: 0,
                hours: 0,
                minutes: 1,
                seconds: 1
            })
        );

        board.tick(&[event("b", now + Duration::seconds(5))], now);
        assert_eq!(board.get("a"), None);
        assert_eq!(board.timers().len(), 1);
    }

    proptest! {
        #[test]
        fn decomposition_is_exact(now in 0i64..4_000_000_000, delta in 1i64..4_000_000_000) {
            let now = Utc.timestamp_opt(now, 0).unwrap();
            let timer = CountdownTimer::until(now + Duration::seconds(delta), now);

            prop_assert_eq!(timer.total_seconds(), delta as u64);
            prop_assert!(timer.hours < 24);
            prop_assert!(timer.minutes < 60);
            prop_assert!(timer.seconds < 60);
        }
    }
}
