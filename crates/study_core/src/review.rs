use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::category::Category;
use crate::day::DayId;
use crate::ids::ItemId;

/// Offsets used when the caller supplies no usable intervals.
pub const DEFAULT_INTERVALS: [u32; 5] = [1, 3, 7, 14, 30];

/// Parses comma separated interval text such as `"0, 1, 3"`.
///
/// Non-numeric and negative entries are dropped. The result is sorted and
/// falls back to [`DEFAULT_INTERVALS`] when nothing usable remains.
pub fn parse_intervals(input: &str) -> Vec<u32> {
    let parsed: Vec<i64> = input
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect();
    sanitize_intervals(&parsed)
}

/// Same filtering as [`parse_intervals`] for already-numeric input.
pub fn sanitize_intervals(raw: &[i64]) -> Vec<u32> {
    let mut intervals: Vec<u32> = raw
        .iter()
        .filter_map(|value| u32::try_from(*value).ok())
        .collect();
    if intervals.is_empty() {
        return DEFAULT_INTERVALS.to_vec();
    }
    intervals.sort_unstable();
    intervals
}

fn deserialize_intervals<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u32>, D::Error> {
    let raw = Vec::<i64>::deserialize(deserializer)?;
    Ok(sanitize_intervals(&raw))
}

fn default_intervals() -> Vec<u32> {
    DEFAULT_INTERVALS.to_vec()
}

/// Display bucket for a review item on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewBucket {
    DueNow,
    CompletedToday,
    Upcoming,
}

/// Snapshot of an item's schedule as seen on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewStatus {
    pub is_due: bool,
    pub is_completed_today: bool,
    pub outstanding: usize,
    pub next_upcoming: Option<DayId>,
    pub bucket: Option<ReviewBucket>,
}

/// User input for creating or editing a review item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub subject: String,
    pub lesson_name: String,
    pub category: Category,
    intervals: Vec<u32>,
}

impl ReviewDraft {
    pub fn new(subject: impl Into<String>, lesson_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            lesson_name: lesson_name.into(),
            category: Category::default(),
            intervals: DEFAULT_INTERVALS.to_vec(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_intervals(mut self, intervals: &[i64]) -> Self {
        self.intervals = sanitize_intervals(intervals);
        self
    }

    pub fn with_interval_text(mut self, input: &str) -> Self {
        self.intervals = parse_intervals(input);
        self
    }

    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }
}

/// A lesson tracked for spaced repetition.
///
/// Status is never stored: every query derives it from `created_date`,
/// `intervals` and `completed_reviews`. A completion on day `c` satisfies
/// every due date on or before `c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: ItemId,
    pub subject: String,
    pub lesson_name: String,
    #[serde(default, alias = "type")]
    pub category: Category,
    created_date: DayId,
    #[serde(default = "default_intervals", deserialize_with = "deserialize_intervals")]
    intervals: Vec<u32>,
    #[serde(default)]
    completed_reviews: BTreeSet<DayId>,
}

impl ReviewItem {
    pub fn new(id: ItemId, draft: ReviewDraft, created_date: DayId) -> Self {
        Self {
            id,
            subject: draft.subject,
            lesson_name: draft.lesson_name,
            category: draft.category,
            created_date,
            intervals: draft.intervals,
            completed_reviews: BTreeSet::new(),
        }
    }

    /// Replaces the editable fields. Creation day and completions are kept,
    /// even completions no longer implied by the new intervals.
    pub fn apply_draft(&mut self, draft: ReviewDraft) {
        self.subject = draft.subject;
        self.lesson_name = draft.lesson_name;
        self.category = draft.category;
        self.intervals = draft.intervals;
    }

    pub fn created_date(&self) -> DayId {
        self.created_date
    }

    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }

    pub fn completed_reviews(&self) -> impl Iterator<Item = DayId> + '_ {
        self.completed_reviews.iter().copied()
    }

    /// `(interval, due date)` pairs, one per distinct due date, ascending.
    pub fn due_entries(&self) -> Vec<(u32, DayId)> {
        let mut entries: Vec<(u32, DayId)> = self
            .intervals
            .iter()
            .map(|interval| (*interval, self.created_date.add_days(i64::from(*interval))))
            .collect();
        entries.sort_by_key(|(_, date)| *date);
        entries.dedup_by_key(|(_, date)| *date);
        entries
    }

    /// Deduplicated due-date set in ascending order.
    pub fn due_dates(&self) -> Vec<DayId> {
        self.due_entries().into_iter().map(|(_, date)| date).collect()
    }

    fn latest_completion(&self) -> Option<DayId> {
        self.completed_reviews.last().copied()
    }

    fn is_satisfied(&self, due: DayId) -> bool {
        self.latest_completion()
            .map(|latest| latest >= due)
            .unwrap_or(false)
    }

    /// Due dates on or before `today` not yet covered by a completion.
    pub fn outstanding(&self, today: DayId) -> Vec<DayId> {
        self.due_dates()
            .into_iter()
            .filter(|due| *due <= today && !self.is_satisfied(*due))
            .collect()
    }

    pub fn is_due(&self, today: DayId) -> bool {
        !self.outstanding(today).is_empty()
    }

    pub fn is_completed_on(&self, day: DayId) -> bool {
        self.completed_reviews.contains(&day)
    }

    pub fn next_upcoming(&self, today: DayId) -> Option<DayId> {
        self.due_dates().into_iter().find(|due| *due > today)
    }

    /// Records a review on `today`. Returns `false` when one was already
    /// recorded for that day.
    pub fn mark_reviewed(&mut self, today: DayId) -> bool {
        self.completed_reviews.insert(today)
    }

    pub fn classify(&self, today: DayId) -> Option<ReviewBucket> {
        let completed_today = self.is_completed_on(today);
        if self.is_due(today) && !completed_today {
            Some(ReviewBucket::DueNow)
        } else if completed_today {
            Some(ReviewBucket::CompletedToday)
        } else if self.next_upcoming(today).is_some() {
            Some(ReviewBucket::Upcoming)
        } else {
            None
        }
    }

    pub fn status(&self, today: DayId) -> ReviewStatus {
        let outstanding = self.outstanding(today).len();
        ReviewStatus {
            is_due: outstanding > 0,
            is_completed_today: self.is_completed_on(today),
            outstanding,
            next_upcoming: self.next_upcoming(today),
            bucket: self.classify(today),
        }
    }

    /// `(satisfied, total)` due dates, regardless of whether they have passed.
    pub fn progress(&self) -> (usize, usize) {
        let due = self.due_dates();
        let satisfied = due.iter().filter(|date| self.is_satisfied(**date)).count();
        (satisfied, due.len())
    }
}
