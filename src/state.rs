use std::sync::Arc;
use std::time::{Instant, SystemTime};

use tokio::sync::Mutex;

use crate::services::trainer::Trainer;

/// Shared handler state. The trainer sits behind one async mutex so actions
/// run strictly one after another.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    trainer: Arc<Mutex<Trainer>>,
}

impl AppState {
    pub fn new(trainer: Trainer) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            trainer: Arc::new(Mutex::new(trainer)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn trainer(&self) -> Arc<Mutex<Trainer>> {
        Arc::clone(&self.trainer)
    }
}
