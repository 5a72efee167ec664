//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_changed`, `last_updated` and event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// The two clocks a device keeps for its snapshots.
///
/// `last_updated` moves on every write, `last_changed` only when the
/// reported state actually differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamps {
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Stamps {
    /// Both clocks set to now.
    #[must_use]
    pub fn new() -> Self {
        let ts = now();
        Self {
            last_changed: ts,
            last_updated: ts,
        }
    }

    /// Record a write; `changed` also moves `last_changed`.
    pub fn touch(&mut self, changed: bool) {
        let ts = now();
        self.last_updated = ts;
        if changed {
            self.last_changed = ts;
        }
    }
}

impl Default for Stamps {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_with_equal_clocks() {
        let stamps = Stamps::new();
        assert_eq!(stamps.last_changed, stamps.last_updated);
    }

    #[test]
    fn should_move_only_last_updated_when_unchanged() {
        let mut stamps = Stamps::new();
        let changed = stamps.last_changed;

        stamps.touch(false);

        assert_eq!(stamps.last_changed, changed);
        assert!(stamps.last_updated >= changed);
    }

    #[test]
    fn should_move_both_clocks_on_change() {
        let mut stamps = Stamps::new();

        stamps.touch(true);

        assert_eq!(stamps.last_changed, stamps.last_updated);
    }
}
