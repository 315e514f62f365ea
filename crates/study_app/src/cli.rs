use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use study_core::{
    assignment::{AssignmentStatus, Priority},
    category::Category,
    day::CalendarView,
    timer::TimerMode,
    DayId, ItemId,
};

#[derive(Parser, Debug)]
#[command(name = "study")]
#[command(about = "Assignments, spaced-repetition reviews and a focus timer")]
#[command(version)]
pub struct Cli {
    /// Store file (overrides STUDY_DATA_PATH).
    #[arg(long, value_name = "PATH", global = true)]
    pub data: Option<PathBuf>,

    /// Pretend today is this day (YYYY-MM-DD).
    #[arg(long, value_name = "DAY", global = true)]
    pub today: Option<DayId>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Overdue work, today's assignments and reviews due.
    Dashboard,
    /// Current streak and its growth stage.
    Streak,
    /// Record study activity for today.
    Activity,
    /// Spaced-repetition review items.
    Review {
        #[command(subcommand)]
        action: ReviewCommand,
    },
    /// Assignments and their study tasks.
    Assignment {
        #[command(subcommand)]
        action: AssignmentCommand,
    },
    /// Due dates and scheduled reviews for a month, week or day.
    Calendar {
        #[arg(long, value_enum, default_value_t = ViewArg::Month)]
        view: ViewArg,
        #[arg(long, value_name = "DAY")]
        date: Option<DayId>,
    },
    /// Run one focus or break countdown.
    Timer {
        #[arg(long, default_value = "focus")]
        mode: TimerMode,
        /// Override the countdown length.
        #[arg(long)]
        seconds: Option<u32>,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    Add {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        lesson: String,
        #[arg(long)]
        category: Option<Category>,
        /// Comma separated day offsets, e.g. "1,3,7".
        #[arg(long)]
        intervals: Option<String>,
    },
    Edit {
        id: ItemId,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        lesson: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        intervals: Option<String>,
    },
    Delete {
        id: ItemId,
    },
    /// Mark an item reviewed today.
    Mark {
        id: ItemId,
    },
    List,
}

#[derive(Subcommand, Debug)]
pub enum AssignmentCommand {
    Add {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_name = "DAY")]
        due: DayId,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<AssignmentStatus>,
    },
    Status {
        id: ItemId,
        status: AssignmentStatus,
    },
    Delete {
        id: ItemId,
    },
    List {
        #[arg(long)]
        status: Option<AssignmentStatus>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Attach a study task to an assignment.
    AddTask {
        id: ItemId,
        text: String,
    },
    ToggleTask {
        id: ItemId,
        task: ItemId,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Focus, short break and long break minutes. Zero keeps the default.
    Timer {
        focus: u32,
        short_break: u32,
        long_break: u32,
    },
    Title {
        text: String,
    },
    Name {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Month,
    Week,
    Day,
}

impl From<ViewArg> for CalendarView {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Month => CalendarView::Month,
            ViewArg::Week => CalendarView::Week,
            ViewArg::Day => CalendarView::Day,
        }
    }
}
