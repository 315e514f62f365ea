use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::assignment::{Assignment, AssignmentStatus};
use crate::category::Category;
use crate::day::{DateRange, DayId};
use crate::review::{ReviewBucket, ReviewItem};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Assignment,
    Review,
}

/// One calendar entry: an assignment due date or a scheduled review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: DayId,
    pub kind: EventKind,
    pub category: Category,
    pub status: Option<AssignmentStatus>,
}

impl PartialEq for CalendarEvent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.date == other.date && self.kind == other.kind
    }
}

impl Eq for CalendarEvent {}

impl PartialOrd for CalendarEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

fn by_due_then_name<'a>(mut assignments: Vec<&'a Assignment>) -> Vec<&'a Assignment> {
    assignments.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.name.cmp(&b.name))
    });
    assignments
}

fn by_lesson<'a>(mut items: Vec<&'a ReviewItem>) -> Vec<&'a ReviewItem> {
    items.sort_by(|a, b| {
        a.subject
            .cmp(&b.subject)
            .then_with(|| a.lesson_name.cmp(&b.lesson_name))
    });
    items
}

pub fn overdue_assignments(assignments: &[Assignment], today: DayId) -> Vec<&Assignment> {
    by_due_then_name(
        assignments
            .iter()
            .filter(|a| a.due_date < today && !a.is_done())
            .collect(),
    )
}

pub fn due_today_assignments(assignments: &[Assignment], today: DayId) -> Vec<&Assignment> {
    by_due_then_name(
        assignments
            .iter()
            .filter(|a| a.due_date == today && !a.is_done())
            .collect(),
    )
}

pub fn upcoming_assignments(assignments: &[Assignment], today: DayId) -> Vec<&Assignment> {
    by_due_then_name(
        assignments
            .iter()
            .filter(|a| a.due_date > today && !a.is_done())
            .collect(),
    )
}

pub fn reviews_due_today(items: &[ReviewItem], today: DayId) -> Vec<&ReviewItem> {
    by_lesson(
        items
            .iter()
            .filter(|item| item.is_due(today) && !item.is_completed_on(today))
            .collect(),
    )
}

/// Items in `bucket` on `today`. Upcoming items are ordered by their next
/// due date.
pub fn reviews_in_bucket(
    items: &[ReviewItem],
    today: DayId,
    bucket: ReviewBucket,
) -> Vec<&ReviewItem> {
    let mut selected = by_lesson(
        items
            .iter()
            .filter(|item| item.classify(today) == Some(bucket))
            .collect(),
    );
    if bucket == ReviewBucket::Upcoming {
        selected.sort_by_key(|item| item.next_upcoming(today));
    }
    selected
}

/// Every assignment due date and every review expansion inside `range`.
///
/// Review items contribute one event per distinct due date whether or not
/// it has been satisfied.
pub fn calendar_events(
    assignments: &[Assignment],
    items: &[ReviewItem],
    range: DateRange,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for assignment in assignments {
        if !range.contains(assignment.due_date) {
            continue;
        }
        events.push(CalendarEvent {
            id: assignment.id.to_string(),
            title: format!("{}: {}", assignment.subject, assignment.name),
            date: assignment.due_date,
            kind: EventKind::Assignment,
            category: assignment.category,
            status: Some(assignment.status),
        });
    }

    for item in items {
        for (interval, date) in item.due_entries() {
            if !range.contains(date) {
                continue;
            }
            events.push(CalendarEvent {
                id: format!("{}-{}", item.id, interval),
                title: format!("Review: {}", item.lesson_name),
                date,
                kind: EventKind::Review,
                category: item.category,
                status: None,
            });
        }
    }

    events.sort();
    events
}

pub fn events_by_day(
    assignments: &[Assignment],
    items: &[ReviewItem],
    range: DateRange,
) -> BTreeMap<DayId, Vec<CalendarEvent>> {
    let mut grouped: BTreeMap<DayId, Vec<CalendarEvent>> = BTreeMap::new();
    for event in calendar_events(assignments, items, range) {
        grouped.entry(event.date).or_default().push(event);
    }
    grouped
}

/// Home screen summary for one day.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub today: DayId,
    pub overdue: Vec<Assignment>,
    pub due_today: Vec<Assignment>,
    pub reviews_due: Vec<ReviewItem>,
}

impl Dashboard {
    pub fn build(assignments: &[Assignment], items: &[ReviewItem], today: DayId) -> Self {
        Self {
            today,
            overdue: overdue_assignments(assignments, today).into_iter().cloned().collect(),
            due_today: due_today_assignments(assignments, today).into_iter().cloned().collect(),
            reviews_due: reviews_due_today(items, today).into_iter().cloned().collect(),
        }
    }

    pub fn total_due_today(&self) -> usize {
        self.due_today.len() + self.reviews_due.len()
    }

    pub fn is_clear(&self) -> bool {
        self.overdue.is_empty() && self.total_due_today() == 0
    }
}
