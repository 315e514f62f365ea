use clap::Parser;
use study_app::{
    cli::Cli,
    commands::{execute, open_planner},
    AppConfig,
};
use tempfile::tempdir;

fn run_line(config: &AppConfig, args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).expect("parse args");
    let config = config
        .clone()
        .with_data_path(cli.data)
        .with_today(cli.today);
    let planner = open_planner(&config).expect("open planner");
    let mut out = Vec::new();
    execute(
        &planner,
        cli.command.unwrap_or(study_app::cli::Command::Dashboard),
        &mut out,
    )
    .expect("command succeeds");
    String::from_utf8(out).expect("utf8 output")
}

#[test]
fn review_lifecycle_through_the_store_file() {
    let temp = tempdir().expect("tempdir");
    let data = temp.path().join("planner.json");
    let data = data.to_str().expect("utf8 path");
    let config = AppConfig::default();

    let added = run_line(
        &config,
        &[
            "study",
            "--data",
            data,
            "--today",
            "2024-01-01",
            "review",
            "add",
            "--subject",
            "Biology",
            "--lesson",
            "Mitosis",
            "--intervals",
            "0,1,3",
        ],
    );
    let id = added
        .trim()
        .strip_prefix("Added review item ")
        .expect("id printed")
        .to_string();

    let dashboard = run_line(&config, &["study", "--data", data, "--today", "2024-01-01"]);
    assert!(dashboard.contains("1 due today"));
    assert!(dashboard.contains("Mitosis"));

    let marked = run_line(
        &config,
        &["study", "--data", data, "--today", "2024-01-01", "review", "mark", id.as_str()],
    );
    assert!(marked.contains("Marked reviewed on 2024-01-01"));
    assert!(marked.contains("Streak: 1 day (Sprout)"));

    let next_day = run_line(
        &config,
        &["study", "--data", data, "--today", "2024-01-02", "review", "list"],
    );
    assert!(next_day.contains("due (1 outstanding)"));
    assert!(next_day.contains("(1/3 reviews)"));
}

#[test]
fn streak_and_settings_persist_between_runs() {
    let temp = tempdir().expect("tempdir");
    let data = temp.path().join("planner.json");
    let data = data.to_str().expect("utf8 path");
    let config = AppConfig::default();

    run_line(&config, &["study", "--data", data, "--today", "2024-03-10", "activity"]);
    let streak = run_line(&config, &["study", "--data", data, "--today", "2024-03-11", "activity"]);
    assert!(streak.contains("Streak: 2 days (Sprout)"));

    let lapsed = run_line(&config, &["study", "--data", data, "--today", "2024-03-13", "streak"]);
    assert!(lapsed.contains("lapsed"));

    let saved = run_line(
        &config,
        &["study", "--data", data, "settings", "timer", "0", "10", "20"],
    );
    assert!(saved.contains("Focus 25 min, short break 10 min, long break 20 min"));

    run_line(&config, &["study", "--data", data, "settings", "name", "Ada"]);
    let dashboard = run_line(&config, &["study", "--data", data, "--today", "2024-03-13"]);
    assert!(dashboard.contains("Welcome back, Ada!"));
}

#[test]
fn adding_a_done_assignment_starts_the_streak() {
    let temp = tempdir().expect("tempdir");
    let data = temp.path().join("planner.json");
    let data = data.to_str().expect("utf8 path");
    let config = AppConfig::default();

    let added = run_line(
        &config,
        &[
            "study",
            "--data",
            data,
            "--today",
            "2024-03-10",
            "assignment",
            "add",
            "--subject",
            "Chemistry",
            "--name",
            "Lab report",
            "--due",
            "2024-03-10",
            "--status",
            "done",
        ],
    );
    assert!(added.contains("Added assignment"));
    assert!(added.contains("Streak: 1 day (Sprout)"));

    let dashboard = run_line(&config, &["study", "--data", data, "--today", "2024-03-10"]);
    assert!(dashboard.contains("Nothing due. Enjoy the day!"));
    assert!(dashboard.contains("Streak: 1 day (Sprout)"));
}
