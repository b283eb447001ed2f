use chrono::{DateTime, Utc};
use shared::domain::CurrentSlide;

use crate::StoreError;

/// The single shared "what is on screen" pointer. No history is kept.
#[derive(Debug, Default)]
pub(crate) struct SlideState {
    current: CurrentSlide,
}

impl SlideState {
    pub(crate) fn set(&mut self, name: &str, now: DateTime<Utc>) -> Result<CurrentSlide, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::Validation("slideName is required".into()));
        }
        self.current = CurrentSlide {
            current_slide: name.to_string(),
            timestamp: now,
        };
        Ok(self.current.clone())
    }

    pub(crate) fn get(&self) -> CurrentSlide {
        self.current.clone()
    }
}
