//! End-to-end tests driving the `att` binary.
//!
//! Each test gets its own HOME and data directory, so the user's real
//! configuration and data are never read.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn att_binary() -> String {
    env!("CARGO_BIN_EXE_att").to_string()
}

fn data_dir(home: &Path) -> PathBuf {
    home.join("data")
}

fn att(home: &Path, args: &[&str]) -> Output {
    Command::new(att_binary())
        .env("HOME", home)
        .env("ATT_DATA_DIR", data_dir(home))
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("ATT_OCR_API_KEY")
        .env_remove("ATT_DAYS")
        .env_remove("ATT_DEFAULT_TARGET")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run att")
}

/// Runs `att` and asserts success, returning stdout.
fn att_ok(home: &Path, args: &[&str]) -> String {
    let output = att(home, args);
    assert!(
        output.status.success(),
        "att {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_full_tracking_flow() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    att_ok(home, &["subject", "add", "Math"]);
    att_ok(home, &["subject", "add", "Physics", "--target", "80"]);
    att_ok(home, &["timetable", "add", "monday", "Math"]);
    att_ok(home, &["timetable", "add", "Monday", "Physics"]);

    let marked = att_ok(home, &["mark", "Math", "present", "--date", "2025-03-03"]);
    assert!(marked.starts_with("Marked Math as attended on 2025-03-03."));
    att_ok(home, &["mark", "Math", "absent", "--date", "2025-03-04"]);
    let again = att_ok(home, &["mark", "Math", "absent", "--date", "2025-03-04"]);
    assert!(again.starts_with("Math was already marked missed on 2025-03-04."));

    let today = att_ok(home, &["today", "--date", "2025-03-03"]);
    assert!(today.contains("Math: [low] 50.00% | target 75%"));
    assert!(today.contains("Marked attended today."));
    assert!(today.contains("You must attend next 3 class(es) to reach 75%."));
    assert!(today.contains("Physics: [--] no classes yet | target 80%"));

    let report = att_ok(home, &["report", "--date", "2025-03-05", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(value["week_start"], "2025-03-03");
    assert_eq!(value["subjects"][0]["name"], "Math");
    assert_eq!(value["subjects"][0]["attended"], 1);
    assert_eq!(value["subjects"][0]["missed"], 1);
    assert_eq!(value["subjects"][0]["week"]["total"], 2);
    assert_eq!(value["totals"]["below_target"], 1);

    let csv = att_ok(home, &["export"]);
    assert_eq!(
        csv,
        "Subject,Target (%),Attended,Missed,Attendance (%),Can Skip,Must Attend\n\
         Math,75,1,1,50.00,0,3\n\
         Physics,80,0,0,0.00,0,1\n"
    );
}

#[test]
fn test_correcting_a_mark_keeps_counts_consistent() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    att_ok(home, &["subject", "add", "Math"]);
    att_ok(home, &["mark", "Math", "absent", "--date", "2025-03-03"]);
    att_ok(home, &["mark", "Math", "present", "--date", "2025-03-03"]);

    let list = att_ok(home, &["subject", "list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(value[0]["attended"], 1);
    assert_eq!(value[0]["missed"], 0);

    let data = std::fs::read_to_string(data_dir(home).join("data.json")).unwrap();
    assert!(data.contains("\"2025-03-03\": \"attended\""));
    assert!(data.ends_with("}\n"));
}

#[test]
fn test_data_files_use_four_space_indent() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    att_ok(home, &["subject", "add", "Math"]);
    att_ok(home, &["timetable", "add", "Friday", "Math"]);

    let data = std::fs::read_to_string(data_dir(home).join("data.json")).unwrap();
    assert!(data.starts_with("{\n    \"Math\": {\n        \"attended\": 0,"));

    let timetable = std::fs::read_to_string(data_dir(home).join("timetable.json")).unwrap();
    assert!(timetable.contains("    \"Friday\": [\n        \"Math\"\n    ],"));
    assert!(timetable.contains("    \"Monday\": [],"));
}

#[test]
fn test_removing_subject_unschedules_it() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    att_ok(home, &["subject", "add", "Math"]);
    att_ok(home, &["timetable", "add", "Monday", "Math"]);
    att_ok(home, &["timetable", "add", "Tuesday", "Math"]);

    let removed = att_ok(home, &["subject", "remove", "Math"]);
    assert!(removed.contains("from 2 day(s)"));

    let shown = att_ok(home, &["timetable", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(value["Monday"].as_array().unwrap().len(), 0);
    assert_eq!(value["Tuesday"].as_array().unwrap().len(), 0);
}

#[test]
fn test_rejected_operations_fail_without_writing() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let output = att(home, &["subject", "add", "Math", "--target", "40"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("between 50 and 100"));
    assert!(!data_dir(home).join("data.json").exists());

    let output = att(home, &["timetable", "add", "Monday", "Ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown subject: Ghost"));
    assert!(!data_dir(home).join("timetable.json").exists());

    let output = att(home, &["mark", "Ghost", "present"]);
    assert!(!output.status.success());

    let output = att(home, &["mark", "Math", "maybe"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown outcome"));
}

#[test]
fn test_malformed_data_file_warns_and_is_backed_up() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    std::fs::create_dir_all(data_dir(home)).unwrap();
    std::fs::write(data_dir(home).join("data.json"), "{not json").unwrap();

    let output = att(home, &["subject", "list"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No subjects yet."));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("warning: data.json was malformed and was treated as empty"),
        "stderr: {stderr}"
    );

    // The next write replaces the malformed document but keeps its bytes.
    let output = att(home, &["subject", "add", "Math"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("data.json.bak"));
    let data = std::fs::read_to_string(data_dir(home).join("data.json")).unwrap();
    assert!(data.contains("\"Math\""));
    let backup = std::fs::read_to_string(data_dir(home).join("data.json.bak")).unwrap();
    assert_eq!(backup, "{not json");

    // Once rewritten, the warning is gone.
    let output = att(home, &["subject", "list"]);
    assert!(!String::from_utf8_lossy(&output.stderr).contains("warning"));
}

#[test]
fn test_legacy_history_pairs_are_accepted() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    std::fs::create_dir_all(data_dir(home)).unwrap();
    std::fs::write(
        data_dir(home).join("data.json"),
        r#"{"Math": {"attended": 1, "missed": 1, "target": 75,
            "history": [["2025-03-03", "Present"], ["2025-03-04", "Absent"]]}}"#,
    )
    .unwrap();

    let today = att_ok(home, &["report", "--date", "2025-03-04", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&today).unwrap();
    assert_eq!(value["subjects"][0]["week"]["attended"], 1);
    assert_eq!(value["subjects"][0]["week"]["total"], 2);
}

#[test]
fn test_export_to_file() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let csv_path = home.join("attendance.csv");

    att_ok(home, &["subject", "add", "Math"]);
    let stdout = att_ok(home, &["export", "--output", csv_path.to_str().unwrap()]);
    assert!(stdout.is_empty());

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("Subject,Target (%),"));
    assert!(csv.contains("Math,75,0,0,0.00,0,1"));
}

#[test]
fn test_config_file_sets_days_and_target() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let config = home.join("att.toml");
    std::fs::write(
        &config,
        "days = [\"Monday\", \"Sunday\"]\ndefault_target = 90\n",
    )
    .unwrap();
    let config = config.to_str().unwrap();

    att_ok(home, &["--config", config, "subject", "add", "Yoga"]);
    att_ok(home, &["--config", config, "timetable", "add", "Sunday", "Yoga"]);

    let list = att_ok(home, &["--config", config, "subject", "list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(value[0]["target"], 90);

    let shown = att_ok(home, &["--config", config, "timetable", "show"]);
    assert_eq!(shown, "Monday     -\nSunday     Yoga\n");

    // Without the config file, Sunday is still supported because it is stored.
    let shown = att_ok(home, &["timetable", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(value["Sunday"][0], "Yoga");
}

#[test]
fn test_ocr_without_api_key_is_a_warning() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let image = home.join("timetable.png");
    std::fs::write(&image, b"png").unwrap();

    let stdout = att_ok(home, &["ocr", image.to_str().unwrap(), "--save"]);
    assert!(stdout.starts_with("warning: missing OCR API key"));
    assert!(!data_dir(home).join("timetable.json").exists());
}

#[test]
fn test_ocr_rejects_unsupported_image_type() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let image = home.join("timetable.gif");
    std::fs::write(&image, b"gif").unwrap();

    let output = att(home, &["ocr", image.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported image type"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let stdout = att_ok(temp.path(), &[]);
    assert!(stdout.contains("Usage: att"));
}
