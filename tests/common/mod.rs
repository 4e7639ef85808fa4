#![allow(dead_code)]

use chrono::{Duration, Utc};
use countdown_timer::{events::Event, storage::KeyValueStorage};
use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

pub fn event_in(name: &str, offset: Duration) -> Event {
    Event::new(name, Utc::now() + offset)
}

/// In-memory storage whose reads and writes can be switched to fail
#[derive(Default)]
pub struct FlakyStorage {
    items: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStorage for FlakyStorage {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read refused"));
        }
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("write refused"));
        }
        self.items.lock().unwrap().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
