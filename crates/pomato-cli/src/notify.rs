//! Desktop-notification cue player.
//!
//! Stands in for the audio cues of a desktop build: a work-start or
//! rest-start trigger becomes a desktop notification. Delivery failures
//! (no notification daemon, headless session) are ignored.

use notify_rust::Notification;
use pomato_core::storage::NotificationsConfig;
use pomato_core::{Cue, CuePlayer};

pub struct NotifyCue {
    config: NotificationsConfig,
}

impl NotifyCue {
    pub fn new(config: NotificationsConfig) -> Self {
        Self { config }
    }
}

impl CuePlayer for NotifyCue {
    fn play(&self, cue: Cue) {
        if !self.config.enabled {
            return;
        }
        let body = match cue {
            Cue::WorkStart => &self.config.work_message,
            Cue::RestStart => &self.config.rest_message,
        };
        let _ = Notification::new().summary("pomato").body(body).show();
    }
}
