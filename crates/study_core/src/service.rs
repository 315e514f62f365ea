use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    agenda::{self, CalendarEvent, Dashboard},
    assignment::{Assignment, AssignmentFilter},
    day::{Clock, DateRange, DayId},
    ids::ItemId,
    notifications::{NotificationRequest, NotificationSink},
    review::{ReviewBucket, ReviewDraft, ReviewItem},
    settings::{Profile, TimerSettings},
    store::{self, KeyValueStore, MemoryStore},
    streak::StreakData,
    timer::TimerCompletion,
};

/// Result of [`Planner::mark_reviewed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Recorded,
    AlreadyRecorded,
    NotFound,
}

/// Result of [`Planner::save_assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub created: bool,
    /// The status moved to Done from anything else. Callers treat this as
    /// streak activity.
    pub newly_completed: bool,
}

#[derive(Debug, Default)]
struct PlannerState {
    review_items: Vec<ReviewItem>,
    assignments: Vec<Assignment>,
    streak: StreakData,
    timer_settings: TimerSettings,
    profile: Profile,
}

pub struct Planner {
    store: Box<dyn KeyValueStore>,
    clock: Clock,
    state: RwLock<PlannerState>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

pub struct PlannerBuilder {
    store: Option<Box<dyn KeyValueStore>>,
    clock: Clock,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlannerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            clock: Clock::System,
            notification_sink: None,
        }
    }

    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Loads every key from the store. Unreadable values fall back to their
    /// defaults, so building never fails.
    pub fn build(self) -> Planner {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let state = Planner::load_state(store.as_ref());
        info!(
            review_items = state.review_items.len(),
            assignments = state.assignments.len(),
            streak = state.streak.count,
            "planner loaded"
        );
        Planner {
            store,
            clock: self.clock,
            state: RwLock::new(state),
            notification_sink: self.notification_sink,
        }
    }
}

impl Planner {
    pub fn builder() -> PlannerBuilder {
        PlannerBuilder::new()
    }

    pub fn today(&self) -> DayId {
        self.clock.today()
    }

    // Review items

    pub fn review_items(&self) -> Vec<ReviewItem> {
        self.state.read().review_items.clone()
    }

    pub fn review_item(&self, id: &ItemId) -> Option<ReviewItem> {
        self.state
            .read()
            .review_items
            .iter()
            .find(|item| &item.id == id)
            .cloned()
    }

    #[instrument(skip(self, draft), fields(lesson = %draft.lesson_name))]
    pub fn create_review_item(&self, draft: ReviewDraft) -> ItemId {
        let id = ItemId::generate();
        let item = ReviewItem::new(id.clone(), draft, self.today());
        let mut state = self.state.write();
        state.review_items.push(item);
        self.persist(store::REVIEW_ITEMS_KEY, &state.review_items);
        info!(%id, "review item created");
        id
    }

    #[instrument(skip(self, draft))]
    pub fn update_review_item(&self, id: &ItemId, draft: ReviewDraft) -> bool {
        let mut state = self.state.write();
        let Some(item) = state.review_items.iter_mut().find(|item| &item.id == id) else {
            debug!("no review item with that id");
            return false;
        };
        item.apply_draft(draft);
        self.persist(store::REVIEW_ITEMS_KEY, &state.review_items);
        true
    }

    #[instrument(skip(self))]
    pub fn delete_review_item(&self, id: &ItemId) -> bool {
        let mut state = self.state.write();
        let before = state.review_items.len();
        state.review_items.retain(|item| &item.id != id);
        if state.review_items.len() == before {
            return false;
        }
        self.persist(store::REVIEW_ITEMS_KEY, &state.review_items);
        info!("review item deleted");
        true
    }

    #[instrument(skip(self))]
    pub fn mark_reviewed(&self, id: &ItemId, today: DayId) -> MarkOutcome {
        let mut state = self.state.write();
        let Some(item) = state.review_items.iter_mut().find(|item| &item.id == id) else {
            return MarkOutcome::NotFound;
        };
        if !item.mark_reviewed(today) {
            return MarkOutcome::AlreadyRecorded;
        }
        self.persist(store::REVIEW_ITEMS_KEY, &state.review_items);
        info!("review recorded");
        MarkOutcome::Recorded
    }

    // Assignments

    pub fn assignments(&self) -> Vec<Assignment> {
        self.state.read().assignments.clone()
    }

    pub fn assignment(&self, id: &ItemId) -> Option<Assignment> {
        self.state
            .read()
            .assignments
            .iter()
            .find(|assignment| &assignment.id == id)
            .cloned()
    }

    pub fn filtered_assignments(&self, filter: AssignmentFilter) -> Vec<Assignment> {
        let state = self.state.read();
        filter.apply(&state.assignments).into_iter().cloned().collect()
    }

    /// Inserts `assignment`, or replaces the stored one with the same id.
    #[instrument(skip(self, assignment), fields(id = %assignment.id, status = %assignment.status))]
    pub fn save_assignment(&self, assignment: Assignment) -> SaveOutcome {
        let mut state = self.state.write();
        let was_done = state
            .assignments
            .iter()
            .find(|existing| existing.id == assignment.id)
            .map(Assignment::is_done);
        let newly_completed = assignment.is_done() && !was_done.unwrap_or(false);

        match state
            .assignments
            .iter_mut()
            .find(|existing| existing.id == assignment.id)
        {
            Some(existing) => *existing = assignment,
            None => state.assignments.push(assignment),
        }
        self.persist(store::ASSIGNMENTS_KEY, &state.assignments);

        SaveOutcome {
            created: was_done.is_none(),
            newly_completed,
        }
    }

    #[instrument(skip(self))]
    pub fn delete_assignment(&self, id: &ItemId) -> bool {
        let mut state = self.state.write();
        let before = state.assignments.len();
        state.assignments.retain(|assignment| &assignment.id != id);
        if state.assignments.len() == before {
            return false;
        }
        self.persist(store::ASSIGNMENTS_KEY, &state.assignments);
        true
    }

    #[instrument(skip(self))]
    pub fn toggle_study_task(&self, assignment_id: &ItemId, task_id: &ItemId) -> bool {
        let mut state = self.state.write();
        let toggled = state
            .assignments
            .iter_mut()
            .find(|assignment| &assignment.id == assignment_id)
            .map(|assignment| assignment.toggle_task(task_id))
            .unwrap_or(false);
        if toggled {
            self.persist(store::ASSIGNMENTS_KEY, &state.assignments);
        }
        toggled
    }

    // Streak

    pub fn streak(&self) -> StreakData {
        self.state.read().streak
    }

    #[instrument(skip(self))]
    pub fn record_activity(&self, day: DayId) -> StreakData {
        let mut state = self.state.write();
        let previous = state.streak;
        let next = previous.on_activity(day);
        if next != previous {
            state.streak = next;
            self.persist(store::STREAK_KEY, &next);
            info!(count = next.count, "streak updated");
        }
        next
    }

    // Timer and profile

    pub fn timer_settings(&self) -> TimerSettings {
        self.state.read().timer_settings
    }

    pub fn save_timer_settings(&self, settings: TimerSettings) -> TimerSettings {
        let settings = settings.normalized();
        let mut state = self.state.write();
        state.timer_settings = settings;
        self.persist(store::TIMER_SETTINGS_KEY, &settings);
        settings
    }

    /// Handles a finished countdown: focus sessions count as activity, and
    /// every completion is forwarded to the notification sink.
    #[instrument(skip(self))]
    pub fn complete_timer_session(
        &self,
        completion: TimerCompletion,
        today: DayId,
    ) -> Option<StreakData> {
        if let Some(sink) = &self.notification_sink {
            sink.notify(NotificationRequest::for_completion(&completion));
        }
        completion
            .was_focus()
            .then(|| self.record_activity(today))
    }

    pub fn profile(&self) -> Profile {
        self.state.read().profile.clone()
    }

    pub fn set_app_title(&self, title: &str) {
        let mut state = self.state.write();
        state.profile.set_app_title(title);
        self.persist(store::APP_TITLE_KEY, &state.profile.app_title);
    }

    pub fn set_user_name(&self, name: &str) {
        let mut state = self.state.write();
        state.profile.set_user_name(name);
        self.persist(store::USER_NAME_KEY, &state.profile.user_name);
    }

    // Queries

    pub fn overdue_assignments(&self, today: DayId) -> Vec<Assignment> {
        let state = self.state.read();
        agenda::overdue_assignments(&state.assignments, today)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn due_today_assignments(&self, today: DayId) -> Vec<Assignment> {
        let state = self.state.read();
        agenda::due_today_assignments(&state.assignments, today)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn upcoming_assignments(&self, today: DayId) -> Vec<Assignment> {
        let state = self.state.read();
        agenda::upcoming_assignments(&state.assignments, today)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn reviews_due_today(&self, today: DayId) -> Vec<ReviewItem> {
        let state = self.state.read();
        agenda::reviews_due_today(&state.review_items, today)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn upcoming_reviews(&self, today: DayId) -> Vec<ReviewItem> {
        self.reviews_in_bucket(today, ReviewBucket::Upcoming)
    }

    pub fn completed_reviews_today(&self, today: DayId) -> Vec<ReviewItem> {
        self.reviews_in_bucket(today, ReviewBucket::CompletedToday)
    }

    pub fn reviews_in_bucket(&self, today: DayId, bucket: ReviewBucket) -> Vec<ReviewItem> {
        let state = self.state.read();
        agenda::reviews_in_bucket(&state.review_items, today, bucket)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn calendar_events(&self, range: DateRange) -> Vec<CalendarEvent> {
        let state = self.state.read();
        agenda::calendar_events(&state.assignments, &state.review_items, range)
    }

    pub fn events_by_day(&self, range: DateRange) -> BTreeMap<DayId, Vec<CalendarEvent>> {
        let state = self.state.read();
        agenda::events_by_day(&state.assignments, &state.review_items, range)
    }

    pub fn dashboard(&self, today: DayId) -> Dashboard {
        let state = self.state.read();
        Dashboard::build(&state.assignments, &state.review_items, today)
    }
}

impl Planner {
    fn load_state(store: &dyn KeyValueStore) -> PlannerState {
        let mut profile = Profile::default();
        if let Some(title) = store::load_value::<String>(store, store::APP_TITLE_KEY) {
            profile.set_app_title(&title);
        }
        if let Some(name) = store::load_value::<String>(store, store::USER_NAME_KEY) {
            profile.set_user_name(&name);
        }

        PlannerState {
            review_items: store::load_collection(store, store::REVIEW_ITEMS_KEY),
            assignments: store::load_collection(store, store::ASSIGNMENTS_KEY),
            streak: store::load_value(store, store::STREAK_KEY).unwrap_or_default(),
            timer_settings: store::load_value::<TimerSettings>(store, store::TIMER_SETTINGS_KEY)
                .map(TimerSettings::normalized)
                .unwrap_or_default(),
            profile,
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = store::save_value(self.store.as_ref(), key, value) {
            warn!(key, %err, "failed to persist planner state");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::assignment::AssignmentStatus;
    use crate::store::StoreError;
    use crate::timer::TimerMode;

    fn day(raw: &str) -> DayId {
        raw.parse().unwrap()
    }

    fn planner_on(today: &str) -> Planner {
        Planner::builder()
            .with_clock(Clock::fixed(day(today)))
            .build()
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<NotificationRequest>>>);

    impl NotificationSink for RecordingSink {
        fn notify(&self, notification: NotificationRequest) {
            self.0.lock().push(notification);
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<serde_json::Value> {
            None
        }

        fn set(&self, key: &str, _value: serde_json::Value) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: key.into(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn created_items_use_clock_day_and_become_due() {
        let planner = planner_on("2024-05-01");
        let id = planner.create_review_item(
            ReviewDraft::new("History", "Treaties").with_interval_text("1, 3"),
        );

        let item = planner.review_item(&id).unwrap();
        assert_eq!(item.created_date(), day("2024-05-01"));
        assert!(planner.reviews_due_today(day("2024-05-01")).is_empty());
        assert_eq!(planner.reviews_due_today(day("2024-05-02")).len(), 1);
        assert_eq!(planner.upcoming_reviews(day("2024-05-01")).len(), 1);
    }

    #[test]
    fn mark_reviewed_reports_outcomes() {
        let planner = planner_on("2024-05-01");
        let id = planner.create_review_item(ReviewDraft::new("History", "Treaties"));

        assert_eq!(planner.mark_reviewed(&id, day("2024-05-02")), MarkOutcome::Recorded);
        assert_eq!(
            planner.mark_reviewed(&id, day("2024-05-02")),
            MarkOutcome::AlreadyRecorded
        );
        assert_eq!(
            planner.mark_reviewed(&ItemId::from("missing"), day("2024-05-02")),
            MarkOutcome::NotFound
        );
        assert_eq!(planner.completed_reviews_today(day("2024-05-02")).len(), 1);
    }

    #[test]
    fn edit_and_delete_missing_ids_are_noops() {
        let planner = planner_on("2024-05-01");
        let missing = ItemId::from("missing");
        assert!(!planner.update_review_item(&missing, ReviewDraft::new("a", "b")));
        assert!(!planner.delete_review_item(&missing));
        assert!(!planner.delete_assignment(&missing));
        assert!(planner.review_items().is_empty());
    }

    #[test]
    fn saving_done_assignment_reports_new_completion_once() {
        let planner = planner_on("2024-05-01");
        let mut assignment = Assignment::new("Art", "Portfolio", day("2024-05-03"));

        let first = planner.save_assignment(assignment.clone());
        assert!(first.created);
        assert!(!first.newly_completed);

        assignment.status = AssignmentStatus::Done;
        let done = planner.save_assignment(assignment.clone());
        assert!(!done.created);
        assert!(done.newly_completed);

        assignment.name = "Portfolio v2".to_string();
        assert!(!planner.save_assignment(assignment).newly_completed);
        assert_eq!(planner.assignments().len(), 1);
    }

    #[test]
    fn complete_timer_session_records_focus_activity_and_notifies() {
        let sink = RecordingSink::default();
        let planner = Planner::builder()
            .with_clock(Clock::fixed(day("2024-05-01")))
            .with_notification_sink(Box::new(sink.clone()))
            .build();

        let focus = TimerCompletion {
            finished: TimerMode::Focus,
            next: TimerMode::ShortBreak,
            completed_sessions: 1,
        };
        let streak = planner.complete_timer_session(focus, day("2024-05-01"));
        assert_eq!(streak.map(|s| s.count), Some(1));

        let rest = TimerCompletion {
            finished: TimerMode::ShortBreak,
            next: TimerMode::Focus,
            completed_sessions: 1,
        };
        assert_eq!(planner.complete_timer_session(rest, day("2024-05-02")), None);
        assert_eq!(planner.streak().count, 1);
        assert_eq!(sink.0.lock().len(), 2);
    }

    #[test]
    fn loads_lenient_state_from_store() {
        let store = MemoryStore::new()
            .with_value(store::REVIEW_ITEMS_KEY, json!("garbage"))
            .with_value(
                store::STREAK_KEY,
                json!({"count": 3, "lastActivityDate": "2024-04-30"}),
            )
            .with_value(
                store::TIMER_SETTINGS_KEY,
                json!({"focus": 0, "shortBreak": 10, "longBreak": 20}),
            )
            .with_value(store::USER_NAME_KEY, json!("Ada"));
        let planner = Planner::builder()
            .with_store(Box::new(store))
            .with_clock(Clock::fixed(day("2024-05-01")))
            .build();

        assert!(planner.review_items().is_empty());
        assert_eq!(planner.streak().count, 3);
        assert_eq!(planner.timer_settings(), TimerSettings::new(25, 10, 20));
        assert_eq!(planner.profile().user_name, "Ada");
        assert_eq!(planner.profile().app_title, "TaskScholar");

        assert_eq!(planner.record_activity(day("2024-05-01")).count, 4);
    }

    #[test]
    fn store_failures_do_not_abort_mutations() {
        let planner = Planner::builder()
            .with_store(Box::new(FailingStore))
            .with_clock(Clock::fixed(day("2024-05-01")))
            .build();
        let id = planner.create_review_item(ReviewDraft::new("Math", "Limits"));
        assert!(planner.review_item(&id).is_some());
        assert_eq!(planner.record_activity(day("2024-05-01")).count, 1);
    }

    #[test]
    fn dashboard_counts_assignments_and_reviews() {
        let planner = planner_on("2024-05-01");
        planner.save_assignment(Assignment::new("Math", "Set 4", day("2024-05-02")));
        planner.save_assignment(Assignment::new("Math", "Set 3", day("2024-04-28")));
        planner.create_review_item(ReviewDraft::new("Math", "Derivatives").with_intervals(&[1]));

        let dashboard = planner.dashboard(day("2024-05-02"));
        assert_eq!(dashboard.due_today.len(), 1);
        assert_eq!(dashboard.reviews_due.len(), 1);
        assert_eq!(dashboard.total_due_today(), 2);
        assert_eq!(dashboard.overdue.len(), 1);

        let events = planner.calendar_events(DateRange::month_of(day("2024-05-01")));
        assert_eq!(events.len(), 2);
    }
}
