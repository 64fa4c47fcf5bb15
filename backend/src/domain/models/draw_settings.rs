//! Versioned draw schedule settings.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ethiopian_calendar::{self, EthiopianDate};

/// Days between a rollover and the next draw.
pub const DRAW_INTERVAL_DAYS: i64 = 30;

/// The small configuration record shared with every collaborator: current
/// cycle and the next draw date, pre-rendered in both calendars. Owned
/// exclusively by the cycle service; everyone else reads it through an
/// accessor. `version` is bumped by the repository on every store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSettings {
    pub version: u64,
    pub cycle: u32,
    pub draw_date: NaiveDate,
    pub draw_date_ethiopian: EthiopianDate,
    pub draw_date_display_en: String,
    pub draw_date_display_am: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}

impl DrawSettings {
    /// Settings for cycle 1 with a draw scheduled `DRAW_INTERVAL_DAYS` out
    /// from `today`. Used to bootstrap an empty data directory.
    pub fn bootstrap(today: NaiveDate) -> Self {
        Self::for_cycle(1, today)
    }

    /// Settings pointing at `cycle` with the draw date recomputed from
    /// `today`.
    pub fn for_cycle(cycle: u32, today: NaiveDate) -> Self {
        let draw_date = today + Duration::days(DRAW_INTERVAL_DAYS);
        let ethiopian = ethiopian_calendar::to_ethiopian(draw_date);
        Self {
            version: 0,
            cycle,
            draw_date,
            draw_date_ethiopian: ethiopian,
            draw_date_display_en: ethiopian.format_en(),
            draw_date_display_am: ethiopian.format_am(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_schedules_thirty_days_out() {
        let today = NaiveDate::from_ymd_opt(2023, 12, 11).unwrap();
        let settings = DrawSettings::bootstrap(today);

        assert_eq!(settings.cycle, 1);
        assert_eq!(settings.draw_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        // January 10, 2024 is Tir 1, 2016 EC.
        assert_eq!(settings.draw_date_ethiopian, EthiopianDate { year: 2016, month: 5, day: 1 });
        assert_eq!(settings.draw_date_display_en, "Tir 1, 2016");
        assert_eq!(settings.draw_date_display_am, "ጥር 1, 2016");
    }
}
