#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use console_chat::{Transport, TransportError};
use serde_json::Value;

/// Transport spy recording every frame; can be switched to reject sends.
#[derive(Default)]
pub struct RecordingTransport {
    frames: Mutex<Vec<String>>,
    failing: AtomicBool,
    closed: AtomicBool,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.set_failing(true);
        transport
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn frames(&self) -> Vec<String> {
        lock_unpoisoned(&self.frames).clone()
    }

    pub fn last_frame(&self) -> Value {
        let frames = self.frames();
        let frame = frames.last().expect("a frame should have been sent");
        serde_json::from_str(frame).expect("frames should be JSON")
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn send(&self, frame: &str) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::new("socket is not writable"));
        }
        lock_unpoisoned(&self.frames).push(frame.to_string());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
