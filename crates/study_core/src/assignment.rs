use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::{normalize_label, Category, ParseEnumError};
use crate::day::DayId;
use crate::ids::ItemId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Almost Done")]
    AlmostDone,
    Done,
}

impl AssignmentStatus {
    pub const ALL: [AssignmentStatus; 4] = [
        AssignmentStatus::NotStarted,
        AssignmentStatus::InProgress,
        AssignmentStatus::AlmostDone,
        AssignmentStatus::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssignmentStatus::NotStarted => "Not Started",
            AssignmentStatus::InProgress => "In Progress",
            AssignmentStatus::AlmostDone => "Almost Done",
            AssignmentStatus::Done => "Done",
        }
    }

    pub fn is_done(self) -> bool {
        self == AssignmentStatus::Done
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AssignmentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        AssignmentStatus::ALL
            .into_iter()
            .find(|candidate| normalize_label(candidate.label()) == wanted)
            .ok_or_else(|| ParseEnumError::new("status", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Not Important")]
    NotImportant,
    #[serde(rename = "Less Important")]
    LessImportant,
    #[default]
    Important,
    #[serde(rename = "Very Important")]
    VeryImportant,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::NotImportant,
        Priority::LessImportant,
        Priority::Important,
        Priority::VeryImportant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::NotImportant => "Not Important",
            Priority::LessImportant => "Less Important",
            Priority::Important => "Important",
            Priority::VeryImportant => "Very Important",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Priority::ALL
            .into_iter()
            .find(|candidate| normalize_label(candidate.label()) == wanted)
            .ok_or_else(|| ParseEnumError::new("priority", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTask {
    pub id: ItemId,
    pub text: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, with = "crate::day::optional_day")]
    pub due_date: Option<DayId>,
}

impl StudyTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            text: text.into(),
            is_complete: false,
            due_date: None,
        }
    }
}

/// Attached material. Only the name is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDocument {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: ItemId,
    pub subject: String,
    pub name: String,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default, alias = "type")]
    pub category: Category,
    pub due_date: DayId,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub study_tasks: Vec<StudyTask>,
    #[serde(default)]
    pub documents: Vec<StudyDocument>,
}

impl Assignment {
    pub fn new(subject: impl Into<String>, name: impl Into<String>, due_date: DayId) -> Self {
        Self {
            id: ItemId::generate(),
            subject: subject.into(),
            name: name.into(),
            status: AssignmentStatus::default(),
            category: Category::default(),
            due_date,
            priority: Priority::default(),
            study_tasks: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn days_until_due(&self, today: DayId) -> i64 {
        today.days_until(self.due_date)
    }

    pub fn due_label(&self, today: DayId) -> DueLabel {
        DueLabel::from_days(self.days_until_due(today))
    }

    /// `(completed, total)` study tasks.
    pub fn task_progress(&self) -> (usize, usize) {
        let done = self.study_tasks.iter().filter(|task| task.is_complete).count();
        (done, self.study_tasks.len())
    }

    /// Flips one study task. Returns `false` when no task has that id.
    pub fn toggle_task(&mut self, task_id: &ItemId) -> bool {
        match self.study_tasks.iter_mut().find(|task| &task.id == task_id) {
            Some(task) => {
                task.is_complete = !task.is_complete;
                true
            }
            None => false,
        }
    }
}

/// Human readable distance to a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Overdue(i64),
    DueToday,
    DueTomorrow,
    DueIn(i64),
}

impl DueLabel {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 0 => DueLabel::Overdue(-d),
            0 => DueLabel::DueToday,
            1 => DueLabel::DueTomorrow,
            d => DueLabel::DueIn(d),
        }
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Overdue(days) => write!(f, "Overdue by {days} days"),
            DueLabel::DueToday => f.write_str("Due today"),
            DueLabel::DueTomorrow => f.write_str("Due tomorrow"),
            DueLabel::DueIn(days) => write!(f, "Due in {days} days"),
        }
    }
}

/// Status/priority filter for assignment lists. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub status: Option<AssignmentStatus>,
    pub priority: Option<Priority>,
}

impl AssignmentFilter {
    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.status.map_or(true, |status| assignment.status == status)
            && self
                .priority
                .map_or(true, |priority| assignment.priority == priority)
    }

    /// Matching assignments ordered by due date.
    pub fn apply<'a>(&self, assignments: &'a [Assignment]) -> Vec<&'a Assignment> {
        let mut matching: Vec<&Assignment> = assignments
            .iter()
            .filter(|assignment| self.matches(assignment))
            .collect();
        matching.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        matching
    }
}
