//! End-to-end command tests without network access.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use ink_cli::{CliArgs, Command, HistoryCommand};
use ink_core::{HistoryStore, ReadingKind};
use ink_oracle::OracleConfig;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

const DRAWING: &str = r##"[
  {"points": [{"x": 20, "y": 20}, {"x": 80, "y": 60}, {"x": 140, "y": 30}],
   "color": "#FFD700", "width": 6, "tool": "pen", "style": "glow", "opacity": 1},
  {"points": [{"x": 30, "y": 90}, {"x": 120, "y": 90}],
   "color": "#9370DB", "width": 8, "tool": "pen", "style": "ethereal", "opacity": 0.8},
  {"points": [{"x": 70, "y": 10}, {"x": 70, "y": 110}],
   "color": "#000000", "width": 12, "tool": "eraser", "style": "solid", "opacity": 1}
]"##;

fn write_drawing(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).expect("write drawing");
    path
}

fn parse(argv: &[&str]) -> Command {
    CliArgs::try_parse_from(argv).expect("parse").command
}

#[test]
fn render_writes_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_drawing(dir.path(), "drawing.json", DRAWING);
    let output = dir.path().join("out.png");

    let Command::Render(args) = parse(&[
        "mystic-ink",
        "render",
        input.to_str().expect("utf8"),
        "-o",
        output.to_str().expect("utf8"),
        "--width",
        "160",
        "--height",
        "120",
    ]) else {
        panic!("expected render");
    };

    let image = ink_cli::render(&args).expect("render");
    assert_eq!((image.width, image.height), (160, 120));
    let written = std::fs::read(&output).expect("png");
    assert!(written.starts_with(PNG_MAGIC));
    assert_eq!(written, image.png);
}

#[test]
fn render_rejects_empty_and_invalid_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("out.png");

    for (name, json) in [
        ("empty.json", "[]"),
        (
            "tap.json",
            r##"[{"points": [{"x": 1, "y": 1}], "color": "#FFFFFF", "width": 5, "tool": "pen", "style": "solid", "opacity": 1}]"##,
        ),
        ("garbage.json", "not json"),
    ] {
        let input = write_drawing(dir.path(), name, json);
        let Command::Render(args) = parse(&[
            "mystic-ink",
            "render",
            input.to_str().expect("utf8"),
            "-o",
            output.to_str().expect("utf8"),
        ]) else {
            panic!("expected render");
        };
        assert!(ink_cli::render(&args).is_err(), "{name} should fail");
    }
    assert!(!output.exists());
}

#[tokio::test(start_paused = true)]
async fn offline_reading_completes_with_mystery_cards() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_drawing(dir.path(), "one.json", DRAWING);
    let second = write_drawing(dir.path(), "two.json", DRAWING);
    let store = HistoryStore::with_data_dir(dir.path().join("data")).expect("store");

    let Command::Read(args) = parse(&[
        "mystic-ink",
        "read",
        first.to_str().expect("utf8"),
        second.to_str().expect("utf8"),
        "-q",
        "What is hidden?",
        "--category",
        "Spiritual Growth",
        "--width",
        "160",
        "--height",
        "120",
    ]) else {
        panic!("expected read");
    };

    let entry = ink_cli::read(&args, &OracleConfig::default(), &store)
        .await
        .expect("read");
    assert_eq!(entry.readings.len(), 2);
    assert!(entry.readings.iter().all(|r| r.card.is_mystery()));
    assert_eq!(entry.readings[1].position, "Card 2");
    assert_eq!(entry.readings[0].prompt, "Draw card 1");
    assert_eq!(entry.synthesis, "The connection to the ether was interrupted.");
    assert_eq!(entry.category_name.as_deref(), Some("Spiritual Growth"));

    let reloaded = HistoryStore::with_data_dir(dir.path().join("data")).expect("reload");
    assert_eq!(reloaded.len(), 1);
}

#[tokio::test]
async fn daily_card_is_drawn_once_per_day() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::with_data_dir(dir.path()).expect("store");
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).expect("date");
    let config = OracleConfig::default();

    let first = ink_cli::daily(&config, &store, today).await.expect("daily");
    assert_eq!(first.card.name, "The Star");
    assert_eq!(first.date, today);

    let again = ink_cli::daily(&config, &store, today).await.expect("daily");
    assert_eq!(again, first);

    let entries = store.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, ReadingKind::Daily);
}

#[tokio::test]
async fn history_clear_empties_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::with_data_dir(dir.path()).expect("store");
    store.save_reading("q", Vec::new(), "s", ReadingKind::Full, None, None);

    let config = OracleConfig::default();
    let stats = HistoryCommand::Stats {
        year: 2026,
        month: None,
        insight: false,
    };
    ink_cli::history(&stats, &config, &store).await.expect("stats");
    ink_cli::history(&HistoryCommand::Clear, &config, &store)
        .await
        .expect("clear");

    assert!(store.is_empty());
    assert!(HistoryStore::with_data_dir(dir.path())
        .expect("reload")
        .is_empty());
}
