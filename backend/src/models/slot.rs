//! TimeSlot model: a half-open booking window on one resource.

use super::Id;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`TimeSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    InAuction,
    Booked,
}

/// A half-open time interval `[start, end)` on exactly one [`Resource`].
///
/// # Example
/// ```
/// use campus_market_core::models::{TimeSlot, SlotStatus};
/// use campus_market_core::models::Id;
///
/// let resource_id = campus_market_core::models::new_id();
/// let slot = TimeSlot::new(resource_id, 1_000, 1_900);
/// assert_eq!(slot.status(), SlotStatus::Available);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    id: Id,
    resource_id: Id,
    start: i64,
    end: i64,
    status: SlotStatus,
}

impl TimeSlot {
    /// Create a new `AVAILABLE` slot.
    ///
    /// # Panics
    /// Panics if `end <= start`.
    pub fn new(resource_id: Id, start: i64, end: i64) -> Self {
        assert!(end > start, "slot end must be strictly after start");
        Self {
            id: super::new_id(),
            resource_id,
            start,
            end,
            status: SlotStatus::Available,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn resource_id(&self) -> Id {
        self.resource_id
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SlotStatus) {
        self.status = status;
    }

    /// Weekday index (0 = Monday) for the slot's start time, treating `start`
    /// as seconds since the Unix epoch (1970-01-01 was a Thursday, index 3).
    pub fn weekday(&self) -> u32 {
        let days_since_epoch = self.start.div_euclid(86_400);
        ((days_since_epoch + 3).rem_euclid(7)) as u32
    }

    /// Hour of day (0-23) for the slot's start time (UTC).
    pub fn hour(&self) -> u32 {
        self.start.rem_euclid(86_400).div_euclid(3600) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "slot end must be strictly after start")]
    fn rejects_empty_interval() {
        TimeSlot::new(super::super::new_id(), 100, 100);
    }

    #[test]
    fn weekday_and_hour_of_epoch() {
        // 1970-01-01T00:00:00Z was a Thursday.
        let slot = TimeSlot::new(super::super::new_id(), 0, 3600);
        assert_eq!(slot.weekday(), 3);
        assert_eq!(slot.hour(), 0);
    }
}
