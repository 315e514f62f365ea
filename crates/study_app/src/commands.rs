use std::io::Write;

use anyhow::{bail, Context, Result};
use study_core::{
    assignment::{Assignment, AssignmentFilter, StudyTask},
    day::CalendarView,
    notifications::LogSink,
    review::{ReviewDraft, ReviewItem},
    settings::TimerSettings,
    service::MarkOutcome,
    store::JsonFileStore,
    streak::StreakData,
    timer::{FocusTimer, Ticker, TimerMode},
    DayId, Planner,
};
use tracing::{debug, info};

use crate::cli::{AssignmentCommand, Cli, Command, ReviewCommand, SettingsCommand};
use crate::config::AppConfig;

pub fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let config = config.with_data_path(cli.data).with_today(cli.today);
    let planner = open_planner(&config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&planner, cli.command.unwrap_or(Command::Dashboard), &mut out)
}

pub fn open_planner(config: &AppConfig) -> Result<Planner> {
    let store = JsonFileStore::open(config.data_path())
        .with_context(|| format!("failed to open {}", config.data_path().display()))?;
    info!(path = %config.data_path().display(), "store opened");
    Ok(Planner::builder()
        .with_store(Box::new(store))
        .with_clock(config.clock())
        .with_notification_sink(Box::new(LogSink))
        .build())
}

/// Runs one command against `planner`, writing human readable output.
pub fn execute(planner: &Planner, command: Command, out: &mut dyn Write) -> Result<()> {
    let today = planner.today();
    debug!(?command, %today, "executing command");
    match command {
        Command::Dashboard => dashboard(planner, today, out),
        Command::Streak => print_streak(planner.streak(), today, out),
        Command::Activity => print_streak(planner.record_activity(today), today, out),
        Command::Review { action } => review(planner, action, today, out),
        Command::Assignment { action } => assignment(planner, action, today, out),
        Command::Calendar { view, date } => {
            calendar(planner, view.into(), date.unwrap_or(today), out)
        }
        Command::Timer { mode, seconds } => timer(planner, mode, seconds, out),
        Command::Settings { action } => settings(planner, action, out),
    }
}

fn dashboard(planner: &Planner, today: DayId, out: &mut dyn Write) -> Result<()> {
    let profile = planner.profile();
    let summary = planner.dashboard(today);
    writeln!(out, "{} | {}", profile.app_title, today)?;
    writeln!(out, "{}", profile.greeting())?;
    writeln!(out, "{} due today", summary.total_due_today())?;

    if !summary.overdue.is_empty() {
        writeln!(out, "\nOverdue")?;
        for assignment in &summary.overdue {
            print_assignment(assignment, today, out)?;
        }
    }
    if !summary.due_today.is_empty() {
        writeln!(out, "\nDue today")?;
        for assignment in &summary.due_today {
            print_assignment(assignment, today, out)?;
        }
    }
    if !summary.reviews_due.is_empty() {
        writeln!(out, "\nReviews due")?;
        for item in &summary.reviews_due {
            print_review(item, today, out)?;
        }
    }
    if summary.is_clear() {
        writeln!(out, "\nNothing due. Enjoy the day!")?;
    }

    let upcoming = planner.upcoming_assignments(today);
    if !upcoming.is_empty() {
        writeln!(out, "\nComing up")?;
        for assignment in &upcoming {
            print_assignment(assignment, today, out)?;
        }
    }

    writeln!(out)?;
    print_streak(planner.streak(), today, out)
}

fn review(
    planner: &Planner,
    action: ReviewCommand,
    today: DayId,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        ReviewCommand::Add {
            subject,
            lesson,
            category,
            intervals,
        } => {
            let mut draft =
                ReviewDraft::new(subject, lesson).with_category(category.unwrap_or_default());
            if let Some(text) = intervals {
                draft = draft.with_interval_text(&text);
            }
            let id = planner.create_review_item(draft);
            writeln!(out, "Added review item {id}")?;
        }
        ReviewCommand::Edit {
            id,
            subject,
            lesson,
            category,
            intervals,
        } => {
            let Some(existing) = planner.review_item(&id) else {
                bail!("no review item with id {id}");
            };
            let current: Vec<i64> = existing.intervals().iter().map(|i| i64::from(*i)).collect();
            let mut draft = ReviewDraft::new(
                subject.unwrap_or(existing.subject),
                lesson.unwrap_or(existing.lesson_name),
            )
            .with_category(category.unwrap_or(existing.category))
            .with_intervals(&current);
            if let Some(text) = intervals {
                draft = draft.with_interval_text(&text);
            }
            planner.update_review_item(&id, draft);
            writeln!(out, "Updated review item {id}")?;
        }
        ReviewCommand::Delete { id } => {
            if planner.delete_review_item(&id) {
                writeln!(out, "Deleted review item {id}")?;
            } else {
                writeln!(out, "No review item {id}")?;
            }
        }
        ReviewCommand::Mark { id } => match planner.mark_reviewed(&id, today) {
            MarkOutcome::Recorded => {
                writeln!(out, "Marked reviewed on {today}")?;
                print_streak(planner.record_activity(today), today, out)?;
            }
            MarkOutcome::AlreadyRecorded => writeln!(out, "Already reviewed on {today}")?,
            MarkOutcome::NotFound => bail!("no review item with id {id}"),
        },
        ReviewCommand::List => {
            let mut items = planner.review_items();
            items.sort_by(|a, b| {
                a.subject
                    .cmp(&b.subject)
                    .then_with(|| a.lesson_name.cmp(&b.lesson_name))
            });
            if items.is_empty() {
                writeln!(out, "No review items")?;
            }
            for item in &items {
                print_review(item, today, out)?;
            }
        }
    }
    Ok(())
}

fn assignment(
    planner: &Planner,
    action: AssignmentCommand,
    today: DayId,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        AssignmentCommand::Add {
            subject,
            name,
            due,
            category,
            priority,
            status,
        } => {
            let mut assignment = Assignment::new(subject, name, due);
            assignment.category = category.unwrap_or_default();
            assignment.priority = priority.unwrap_or_default();
            assignment.status = status.unwrap_or_default();
            let id = assignment.id.clone();
            let outcome = planner.save_assignment(assignment);
            writeln!(out, "Added assignment {id}")?;
            if outcome.newly_completed {
                print_streak(planner.record_activity(today), today, out)?;
            }
        }
        AssignmentCommand::Status { id, status } => {
            let Some(mut assignment) = planner.assignment(&id) else {
                bail!("no assignment with id {id}");
            };
            assignment.status = status;
            let outcome = planner.save_assignment(assignment);
            writeln!(out, "Assignment {id} is now {status}")?;
            if outcome.newly_completed {
                print_streak(planner.record_activity(today), today, out)?;
            }
        }
        AssignmentCommand::Delete { id } => {
            if planner.delete_assignment(&id) {
                writeln!(out, "Deleted assignment {id}")?;
            } else {
                writeln!(out, "No assignment {id}")?;
            }
        }
        AssignmentCommand::List { status, priority } => {
            let list = planner.filtered_assignments(AssignmentFilter { status, priority });
            if list.is_empty() {
                writeln!(out, "No assignments")?;
            }
            for assignment in &list {
                print_assignment(assignment, today, out)?;
            }
        }
        AssignmentCommand::AddTask { id, text } => {
            let Some(mut assignment) = planner.assignment(&id) else {
                bail!("no assignment with id {id}");
            };
            let task = StudyTask::new(text);
            let task_id = task.id.clone();
            assignment.study_tasks.push(task);
            planner.save_assignment(assignment);
            writeln!(out, "Added study task {task_id}")?;
        }
        AssignmentCommand::ToggleTask { id, task } => {
            if !planner.toggle_study_task(&id, &task) {
                bail!("no study task {task} on assignment {id}");
            }
            writeln!(out, "Toggled study task {task}")?;
        }
    }
    Ok(())
}

fn calendar(
    planner: &Planner,
    view: CalendarView,
    anchor: DayId,
    out: &mut dyn Write,
) -> Result<()> {
    let range = view.range_for(anchor);
    writeln!(out, "{} .. {}", range.start, range.end)?;
    let grouped = planner.events_by_day(range);
    if grouped.is_empty() {
        writeln!(out, "No events")?;
    }
    for (day, events) in grouped {
        writeln!(out, "{day}")?;
        for event in events {
            let status = event
                .status
                .map(|status| format!(" [{status}]"))
                .unwrap_or_default();
            writeln!(out, "  {} ({}){status}", event.title, event.category)?;
        }
    }
    Ok(())
}

fn timer(
    planner: &Planner,
    mode: TimerMode,
    seconds: Option<u32>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut focus_timer = FocusTimer::new(planner.timer_settings());
    focus_timer.change_mode(mode);
    if let Some(seconds) = seconds {
        focus_timer.set_remaining(seconds);
    }
    writeln!(out, "{mode}: {}", focus_timer.format_remaining())?;
    focus_timer.start();

    let ticker = Ticker::start();
    while ticker.next_tick().is_some() {
        let completion = focus_timer.tick();
        write!(out, "\r{mode}: {}", focus_timer.format_remaining())?;
        out.flush()?;
        if let Some(completion) = completion {
            writeln!(out, "\r{mode} complete. Next up: {}", completion.next)?;
            if let Some(streak) = planner.complete_timer_session(completion, planner.today()) {
                print_streak(streak, planner.today(), out)?;
            }
            break;
        }
    }
    Ok(())
}

fn settings(planner: &Planner, action: SettingsCommand, out: &mut dyn Write) -> Result<()> {
    match action {
        SettingsCommand::Timer {
            focus,
            short_break,
            long_break,
        } => {
            let saved =
                planner.save_timer_settings(TimerSettings::new(focus, short_break, long_break));
            writeln!(
                out,
                "Focus {} min, short break {} min, long break {} min",
                saved.focus, saved.short_break, saved.long_break
            )?;
        }
        SettingsCommand::Title { text } => {
            planner.set_app_title(&text);
            writeln!(out, "Title set to {}", planner.profile().app_title)?;
        }
        SettingsCommand::Name { text } => {
            planner.set_user_name(&text);
            writeln!(out, "Name set to {}", planner.profile().user_name)?;
        }
    }
    Ok(())
}

fn print_assignment(assignment: &Assignment, today: DayId, out: &mut dyn Write) -> Result<()> {
    let (done, total) = assignment.task_progress();
    writeln!(
        out,
        "  {} {}: {} [{} / {} / {}] {} ({}/{} tasks)",
        assignment.id,
        assignment.subject,
        assignment.name,
        assignment.category,
        assignment.priority,
        assignment.status,
        assignment.due_label(today),
        done,
        total
    )?;
    for task in &assignment.study_tasks {
        let mark = if task.is_complete { "x" } else { " " };
        writeln!(out, "      [{mark}] {} {}", task.id, task.text)?;
    }
    Ok(())
}

fn print_review(item: &ReviewItem, today: DayId, out: &mut dyn Write) -> Result<()> {
    let status = item.status(today);
    let (satisfied, total) = item.progress();
    let state = if status.is_due {
        format!("due ({} outstanding)", status.outstanding)
    } else if status.is_completed_today {
        "reviewed today".to_string()
    } else {
        match status.next_upcoming {
            Some(next) => format!("next {next}"),
            None => "schedule complete".to_string(),
        }
    };
    writeln!(
        out,
        "  {} {}: {} [{}] {} ({satisfied}/{total} reviews)",
        item.id, item.subject, item.lesson_name, item.category, state
    )?;
    Ok(())
}

fn print_streak(streak: StreakData, today: DayId, out: &mut dyn Write) -> Result<()> {
    let stage = streak.stage();
    let days = if streak.count == 1 { "day" } else { "days" };
    writeln!(out, "Streak: {} {days} ({})", streak.count, stage.name())?;
    writeln!(out, "{}", stage.message())?;
    if streak.count > 0 && !streak.is_alive(today) {
        writeln!(out, "Your streak has lapsed. Study today to start a new one.")?;
    }
    Ok(())
}
