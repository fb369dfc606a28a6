//! End-to-end tests for `stagecard balloon` commands.

use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Output};

use stagecard::models::{BalloonArea, BalloonColor, BalloonIcon, BalloonItem};

mod fixtures;
use fixtures::*;

#[derive(Debug, Deserialize)]
struct ListBalloonsResponse {
    stage: String,
    balloons: Vec<BalloonItem>,
    count: usize,
}

/// Path to the stagecard binary (set by cargo at compile time)
fn stagecard_bin() -> &'static str {
    env!("CARGO_BIN_EXE_stagecard")
}

/// Runs `stagecard balloon <sub> -t <path> -s review -a required_fields <extra>`.
fn balloon(path: &Path, sub: &str, extra: &[&str]) -> Output {
    Command::new(stagecard_bin())
        .args([
            "balloon",
            sub,
            "-t",
            path.to_str().unwrap(),
            "-s",
            REVIEW_STAGE,
            "-a",
            "required_fields",
        ])
        .args(extra)
        .output()
        .expect("Failed to execute command")
}

fn assert_success(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(0),
        "command should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

// ============================================================================
// List Command Tests
// ============================================================================

#[test]
fn test_balloon_list_empty() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    let output = balloon(&path, "list", &[]);

    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("No balloons"));
}

#[test]
fn test_balloon_list_json_sample() {
    let (path, _temp_dir) = create_temp_template_file(&sample_template());

    let output = Command::new(stagecard_bin())
        .args([
            "balloon",
            "list",
            "-t",
            path.to_str().unwrap(),
            "-s",
            "dfd-elaboration",
            "-a",
            "main_form.required_fields",
            "--json",
        ])
        .output()
        .expect("Failed to execute command");

    assert_success(&output);
    let response: ListBalloonsResponse = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response.stage, "dfd-elaboration");
    assert_eq!(response.count, 3);
    let labels: Vec<&str> = response.balloons.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["Objeto", "Justificativa", "Urgente"]);
    assert_eq!(response.balloons[2].color, BalloonColor::Amber);
}

#[test]
fn test_balloon_unknown_area() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    let output = Command::new(stagecard_bin())
        .args([
            "balloon",
            "list",
            "-t",
            path.to_str().unwrap(),
            "-s",
            REVIEW_STAGE,
            "-a",
            "attachments",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_balloon_unknown_stage() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    let output = Command::new(stagecard_bin())
        .args([
            "balloon",
            "list",
            "-t",
            path.to_str().unwrap(),
            "-s",
            "missing",
            "-a",
            "required_fields",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(3));
}

// ============================================================================
// Add / Rename Command Tests
// ============================================================================

#[test]
fn test_balloon_add_with_style() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    let output = balloon(
        &path,
        "add",
        &["--label", "  Urgente ", "--color", "amber", "--icon", "alert", "--json"],
    );

    assert_success(&output);
    let item: BalloonItem = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(item.label, "Urgente", "label is trimmed");
    assert_eq!(item.color, BalloonColor::Amber);
    assert_eq!(item.icon, Some(BalloonIcon::Alert));

    let template = read_template_file(&path);
    assert_eq!(
        catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields),
        vec!["Urgente"]
    );
}

#[test]
fn test_balloon_add_rejects_duplicate_label() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    assert_success(&balloon(&path, "add", &["--label", "Urgente"]));
    let output = balloon(&path, "add", &["--label", "urgente"]);

    assert_eq!(output.status.code(), Some(1));
    let template = read_template_file(&path);
    assert_eq!(
        catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields).len(),
        1
    );
}

#[test]
fn test_balloon_add_rejects_blank_and_long_labels() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    let output = balloon(&path, "add", &["--label", "   "]);
    assert_eq!(output.status.code(), Some(1));

    let long = "x".repeat(33);
    let output = balloon(&path, "add", &["--label", &long]);
    assert_eq!(output.status.code(), Some(1));

    let exact = "y".repeat(32);
    assert_success(&balloon(&path, "add", &["--label", &exact]));
}

#[test]
fn test_balloon_rename_by_label() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());
    assert_success(&balloon(&path, "add", &["--label", "Urgente", "--color", "amber"]));

    let output = balloon(&path, "rename", &["--balloon", "urgente", "--label", "Prioritário"]);

    assert_success(&output);
    let template = read_template_file(&path);
    let items = template
        .catalogs
        .catalog(REVIEW_STAGE, BalloonArea::RequiredFields)
        .unwrap();
    assert_eq!(items[0].label, "Prioritário");
    assert_eq!(items[0].color, BalloonColor::Amber, "rename keeps style");
}

#[test]
fn test_balloon_rename_unknown() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    let output = balloon(&path, "rename", &["--balloon", "ghost", "--label", "X"]);

    assert_eq!(output.status.code(), Some(3));
}

// ============================================================================
// Remove / Reorder / Style Command Tests
// ============================================================================

#[test]
fn test_balloon_remove_is_idempotent() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());
    assert_success(&balloon(&path, "add", &["--label", "Urgente"]));

    let first = balloon(&path, "remove", &["--balloon", "Urgente"]);
    assert_success(&first);
    assert!(String::from_utf8_lossy(&first.stdout).contains("Removed 'Urgente'"));

    let second = balloon(&path, "remove", &["--balloon", "Urgente"]);
    assert_success(&second);
    assert!(String::from_utf8_lossy(&second.stdout).contains("not present"));

    let template = read_template_file(&path);
    assert!(catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields).is_empty());
}

#[test]
fn test_balloon_reorder_by_labels() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());
    for label in ["A", "B", "C"] {
        assert_success(&balloon(&path, "add", &["--label", label]));
    }

    let output = balloon(&path, "reorder", &["--order", "C,A,B"]);

    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("New order: C, A, B"));
    let template = read_template_file(&path);
    assert_eq!(
        catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields),
        vec!["C", "A", "B"]
    );
}

#[test]
fn test_balloon_reorder_must_list_every_balloon() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());
    for label in ["A", "B"] {
        assert_success(&balloon(&path, "add", &["--label", label]));
    }

    let output = balloon(&path, "reorder", &["--order", "B"]);

    assert_eq!(output.status.code(), Some(1));
    let template = read_template_file(&path);
    assert_eq!(
        catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields),
        vec!["A", "B"]
    );
}

#[test]
fn test_balloon_style_and_clear_icon() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());
    assert_success(&balloon(&path, "add", &["--label", "Urgente", "--icon", "flag"]));

    assert_success(&balloon(&path, "style", &["--balloon", "Urgente", "--color", "red"]));
    let template = read_template_file(&path);
    let item = &template
        .catalogs
        .catalog(REVIEW_STAGE, BalloonArea::RequiredFields)
        .unwrap()[0];
    assert_eq!(item.color, BalloonColor::Red);
    assert_eq!(item.icon, Some(BalloonIcon::Flag));

    assert_success(&balloon(&path, "style", &["--balloon", "Urgente", "--no-icon"]));
    let template = read_template_file(&path);
    let item = &template
        .catalogs
        .catalog(REVIEW_STAGE, BalloonArea::RequiredFields)
        .unwrap()[0];
    assert_eq!(item.icon, None);
}

#[test]
fn test_balloon_style_requires_a_change() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());
    assert_success(&balloon(&path, "add", &["--label", "Urgente"]));

    let output = balloon(&path, "style", &["--balloon", "Urgente"]);

    assert_eq!(output.status.code(), Some(1));
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_urgente_rotineiro_prioritario_scenario() {
    let (path, _temp_dir) = create_temp_template_file(&minimal_template());

    assert_success(&balloon(&path, "add", &["--label", "Urgente", "--color", "amber"]));
    assert_success(&balloon(&path, "add", &["--label", "Rotineiro"]));
    assert_success(&balloon(&path, "reorder", &["--order", "Rotineiro,Urgente"]));
    assert_success(&balloon(&path, "rename", &["--balloon", "Urgente", "--label", "Prioritário"]));

    let template = read_template_file(&path);
    let items = template
        .catalogs
        .catalog(REVIEW_STAGE, BalloonArea::RequiredFields)
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "Rotineiro");
    assert_eq!(items[1].label, "Prioritário");
    assert_eq!(items[1].color, BalloonColor::Amber);
}
