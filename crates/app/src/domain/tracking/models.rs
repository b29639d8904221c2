//! Delivery Tracking Models

use crate::domain::tracking::records::{TrackingNote, TrackingRecord};

/// A tracking record with its log, newest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracking {
    pub record: TrackingRecord,
    pub notes: Vec<TrackingNote>,
}

impl Tracking {
    #[must_use]
    pub fn latest_note(&self) -> Option<&TrackingNote> {
        self.notes.first()
    }
}
