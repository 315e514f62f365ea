use serde::{Deserialize, Serialize};

use crate::day::{optional_day, DayId};

/// Consecutive-day activity counter.
///
/// `count` is the number of consecutive days ending at `last_activity_date`
/// with at least one qualifying activity. Persisted as
/// `{"count": n, "lastActivityDate": "YYYY-MM-DD" | ""}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    #[serde(default)]
    pub count: u32,
    #[serde(default, with = "optional_day")]
    pub last_activity_date: Option<DayId>,
}

impl StreakData {
    /// Folds one activity on `day` into the streak.
    ///
    /// Same-day activity is a no-op, the day after the last activity extends
    /// the streak by one, and anything else (a gap, or a day before the last
    /// activity) restarts it at one.
    #[must_use]
    pub fn on_activity(self, day: DayId) -> Self {
        match self.last_activity_date {
            Some(last) if last == day => self,
            Some(last) if last == day.add_days(-1) => Self {
                count: self.count.saturating_add(1),
                last_activity_date: Some(day),
            },
            _ => Self {
                count: 1,
                last_activity_date: Some(day),
            },
        }
    }

    /// True while the streak can still be extended without a reset.
    pub fn is_alive(&self, today: DayId) -> bool {
        self.last_activity_date
            .map(|last| last == today || last == today.add_days(-1))
            .unwrap_or(false)
    }

    pub fn stage(&self) -> GrowthStage {
        GrowthStage::for_count(self.count)
    }
}

/// "Streak garden" illustration tier for a streak length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GrowthStage {
    DormantSeed,
    Sprout,
    Sapling,
    YoungTree,
    FloweringTree,
}

impl GrowthStage {
    pub fn for_count(count: u32) -> Self {
        match count {
            0 => GrowthStage::DormantSeed,
            1..=2 => GrowthStage::Sprout,
            3..=6 => GrowthStage::Sapling,
            7..=29 => GrowthStage::YoungTree,
            _ => GrowthStage::FloweringTree,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GrowthStage::DormantSeed => "Dormant Seed",
            GrowthStage::Sprout => "Sprout",
            GrowthStage::Sapling => "Sapling",
            GrowthStage::YoungTree => "Young Tree",
            GrowthStage::FloweringTree => "Flowering Tree",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GrowthStage::DormantSeed => "Complete a task to plant your seed!",
            GrowthStage::Sprout => "It's growing! Keep it up.",
            GrowthStage::Sapling => "Looking strong! A full week is close.",
            GrowthStage::YoungTree => "Amazing dedication!",
            GrowthStage::FloweringTree => "You are unstoppable!",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(raw: &str) -> DayId {
        raw.parse().unwrap()
    }

    #[test]
    fn first_activity_starts_at_one() {
        let streak = StreakData::default().on_activity(day("2024-03-10"));
        assert_eq!(
            streak,
            StreakData {
                count: 1,
                last_activity_date: Some(day("2024-03-10")),
            }
        );
    }

    #[test]
    fn same_day_activity_is_idempotent() {
        let once = StreakData::default().on_activity(day("2024-03-10"));
        let twice = once.on_activity(day("2024-03-10"));
        assert_eq!(once, twice);
    }

    #[test]
    fn consecutive_days_increment_by_one() {
        let mut streak = StreakData::default();
        let start = day("2024-12-28");
        for offset in 0..10 {
            let before = streak.count;
            streak = streak.on_activity(start.add_days(offset));
            assert_eq!(streak.count, before + 1);
        }
        assert_eq!(streak.last_activity_date, Some(day("2025-01-06")));
    }

    #[test]
    fn gap_resets_to_one() {
        let streak = StreakData::default()
            .on_activity(day("2024-03-10"))
            .on_activity(day("2024-03-11"));
        assert_eq!(streak.count, 2);

        let after_gap = streak.on_activity(day("2024-03-13"));
        assert_eq!(
            after_gap,
            StreakData {
                count: 1,
                last_activity_date: Some(day("2024-03-13")),
            }
        );
    }

    #[test]
    fn backdated_activity_restarts_at_one() {
        let streak = StreakData {
            count: 5,
            last_activity_date: Some(day("2024-03-11")),
        };
        assert_eq!(
            streak.on_activity(day("2024-03-09")),
            StreakData {
                count: 1,
                last_activity_date: Some(day("2024-03-09")),
            }
        );
    }

    #[test]
    fn liveness_covers_today_and_yesterday() {
        let streak = StreakData::default().on_activity(day("2024-03-10"));
        assert!(streak.is_alive(day("2024-03-10")));
        assert!(streak.is_alive(day("2024-03-11")));
        assert!(!streak.is_alive(day("2024-03-12")));
        assert!(!StreakData::default().is_alive(day("2024-03-12")));
    }

    #[test]
    fn persists_unset_date_as_empty_string() {
        let json = serde_json::to_string(&StreakData::default()).unwrap();
        assert_eq!(json, r#"{"count":0,"lastActivityDate":""}"#);

        let parsed: StreakData =
            serde_json::from_str(r#"{"count":4,"lastActivityDate":"2024-03-10"}"#).unwrap();
        assert_eq!(parsed.count, 4);
        assert_eq!(parsed.last_activity_date, Some(day("2024-03-10")));

        let blank: StreakData =
            serde_json::from_str(r#"{"count":0,"lastActivityDate":""}"#).unwrap();
        assert_eq!(blank, StreakData::default());
    }

    #[test]
    fn growth_stage_thresholds() {
        assert_eq!(GrowthStage::for_count(0), GrowthStage::DormantSeed);
        assert_eq!(GrowthStage::for_count(2), GrowthStage::Sprout);
        assert_eq!(GrowthStage::for_count(3), GrowthStage::Sapling);
        assert_eq!(GrowthStage::for_count(7), GrowthStage::YoungTree);
        assert_eq!(GrowthStage::for_count(30), GrowthStage::FloweringTree);
        assert_eq!(GrowthStage::Sprout.name(), "Sprout");
    }
}
