// In-process stand-in for plot widgets: bounded rolling copies of what a
// display would show, shared across threads behind a mutex.

pub mod charts;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    pub buffer_size: usize,
    pub record_profiles: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer_size: 5000,
            record_profiles: true,
        }
    }
}
