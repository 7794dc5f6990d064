use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ENV_VARS: [&str; 8] = [
    "SUPABASE_URL",
    "SUPABASE_ANON_KEY",
    "RECIPE_TABLE",
    "GEMINI_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_ENDPOINT",
    "RECIPE_TIMEOUT_SECS",
    "RECIPE_DATE_STYLE",
];

fn receita(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("receita"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .arg("--root")
        .arg(root)
        .arg("--date-style")
        .arg("iso")
        .arg("--no-color");
    cmd
}

fn parse_line(stdout: &[u8]) -> Value {
    let s = String::from_utf8_lossy(stdout);
    let line = s
        .lines()
        .find(|l| !l.trim().is_empty())
        .expect("one output line");
    serde_json::from_str(line).expect("valid json line")
}

fn today_iso() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn recipe_json() -> Value {
    json!({
        "title": "Espeto de Frutas",
        "description": "Espetinhos coloridos de frutas frescas",
        "ingredients": ["morango", "banana"],
        "instructions": ["Corte as frutas", "Monte no espeto"],
        "benefits": ["Vitamina C"],
        "quickTip": "Sirva gelado"
    })
}

fn seed_local(root: &Path, recipe: Value, tag: &str) {
    let blob = json!({ "recipe": recipe, "date": tag }).to_string();
    let storage = json!({ "dailyRecipe": blob, "dailyRecipeDate": tag });
    let dir = root.join(".receita");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("storage.json"), storage.to_string()).unwrap();
}

#[test]
fn today_serves_fresh_local_entry() {
    let temp = tempdir().unwrap();
    seed_local(temp.path(), recipe_json(), &today_iso());

    let assert = receita(temp.path()).arg("today").assert().success();
    let report = parse_line(&assert.get_output().stdout);

    assert_eq!(report["source"], "local");
    assert_eq!(report["recipe"]["title"], "Espeto de Frutas");
    assert_eq!(report["recipe"]["instructions"][1], "Monte no espeto");
    assert_eq!(report["freshness_tag"], today_iso());
    assert!(report.get("errors").is_none());
}

#[test]
fn today_normalizes_single_block_instructions() {
    let temp = tempdir().unwrap();
    let mut recipe = recipe_json();
    recipe["instructions"] = json!("Corte e monte no espeto");
    seed_local(temp.path(), recipe, &today_iso());

    let assert = receita(temp.path()).arg("today").assert().success();
    let report = parse_line(&assert.get_output().stdout);

    assert_eq!(report["recipe"]["instructions"], json!(["Corte e monte no espeto"]));
}

#[test]
fn today_without_collaborators_reports_no_recipe() {
    let temp = tempdir().unwrap();

    let assert = receita(temp.path()).arg("today").assert().success();
    let report = parse_line(&assert.get_output().stdout);

    assert_eq!(report["source"], "none");
    assert!(report["recipe"].is_null());
    assert_eq!(report["errors"][0]["code"], "NO_RECIPE");
    assert!(report["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("not configured"));
}

#[test]
fn today_ignores_stale_local_entry() {
    let temp = tempdir().unwrap();
    seed_local(temp.path(), recipe_json(), "2001-01-01");

    let assert = receita(temp.path()).arg("today").assert().success();
    let report = parse_line(&assert.get_output().stdout);

    assert!(report["recipe"].is_null());
}

#[test]
fn today_rejects_entry_without_benefits_list() {
    let temp = tempdir().unwrap();
    let mut recipe = recipe_json();
    recipe["benefits"] = json!("Vitamina C");
    seed_local(temp.path(), recipe, &today_iso());

    let assert = receita(temp.path()).arg("today").assert().success();
    let report = parse_line(&assert.get_output().stdout);

    assert!(report["recipe"].is_null());
}

#[test]
fn today_survives_unreachable_shared_store() {
    let temp = tempdir().unwrap();

    let assert = receita(temp.path())
        .arg("--supabase-url")
        .arg("http://127.0.0.1:9")
        .arg("--supabase-key")
        .arg("anon")
        .arg("today")
        .assert()
        .success();
    let report = parse_line(&assert.get_output().stdout);

    assert_eq!(report["source"], "none");
    assert_eq!(report["errors"][0]["code"], "NO_RECIPE");
}

#[test]
fn today_reports_unreachable_generator() {
    let temp = tempdir().unwrap();

    let assert = receita(temp.path())
        .arg("--gemini-key")
        .arg("key")
        .arg("--endpoint")
        .arg("http://127.0.0.1:9/v1beta")
        .arg("--timeout-secs")
        .arg("5")
        .arg("today")
        .assert()
        .success();
    let report = parse_line(&assert.get_output().stdout);

    assert!(report["recipe"].is_null());
    assert!(report["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("generation request failed"));
}

#[test]
fn today_renders_markdown() {
    let temp = tempdir().unwrap();
    seed_local(temp.path(), recipe_json(), &today_iso());

    receita(temp.path())
        .arg("--format")
        .arg("md")
        .arg("today")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Espeto de Frutas"))
        .stdout(predicate::str::contains("1. Corte as frutas"))
        .stdout(predicate::str::contains("> 💡 Sirva gelado"));
}

#[test]
fn cache_show_reports_freshness() {
    let temp = tempdir().unwrap();
    seed_local(temp.path(), recipe_json(), "2001-01-01");

    let assert = receita(temp.path())
        .arg("cache")
        .arg("show")
        .assert()
        .success();
    let report = parse_line(&assert.get_output().stdout);

    assert_eq!(report["fresh"], false);
    assert_eq!(report["tag"], "2001-01-01");
    assert_eq!(report["recipe"]["title"], "Espeto de Frutas");
}

#[test]
fn cache_clear_empties_local_store() {
    let temp = tempdir().unwrap();
    seed_local(temp.path(), recipe_json(), &today_iso());

    receita(temp.path())
        .arg("cache")
        .arg("clear")
        .assert()
        .success();

    let assert = receita(temp.path())
        .arg("cache")
        .arg("show")
        .assert()
        .success();
    let report = parse_line(&assert.get_output().stdout);
    assert!(report["recipe"].is_null());
    assert_eq!(report["fresh"], false);
}

#[test]
fn doctor_reports_unconfigured_collaborators() {
    let temp = tempdir().unwrap();

    let assert = receita(temp.path())
        .arg("doctor")
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing configured"));
    let report = parse_line(&assert.get_output().stdout);

    let collaborators = report["collaborators"].as_array().unwrap();
    assert_eq!(collaborators.len(), 2);
    assert!(collaborators.iter().all(|c| c["configured"] == false));
    assert_eq!(report["today"]["freshness_tag"], today_iso());
}

#[test]
fn prompt_prints_fixed_request() {
    let temp = tempdir().unwrap();

    let assert = receita(temp.path()).arg("prompt").assert().success();
    let report = parse_line(&assert.get_output().stdout);

    assert!(report["prompt"].as_str().unwrap().contains("frutas"));
    assert_eq!(report["response_schema"]["required"].as_array().unwrap().len(), 6);
}

#[test]
fn invalid_date_style_fails() {
    let temp = tempdir().unwrap();

    receita(temp.path())
        .arg("--date-style")
        .arg("klingon")
        .arg("today")
        .assert()
        .failure()
        .stderr(predicate::str::contains("date-style"));
}

#[test]
fn local_commands_ignore_malformed_collaborator_env() {
    let temp = tempdir().unwrap();
    seed_local(temp.path(), recipe_json(), &today_iso());

    receita(temp.path())
        .env("SUPABASE_URL", "not a url")
        .env("SUPABASE_ANON_KEY", "anon")
        .arg("prompt")
        .assert()
        .success();

    receita(temp.path())
        .env("SUPABASE_URL", "not a url")
        .env("SUPABASE_ANON_KEY", "anon")
        .arg("cache")
        .arg("clear")
        .assert()
        .success();
    assert!(!fs::read_to_string(temp.path().join(".receita/storage.json"))
        .unwrap()
        .contains("dailyRecipe"));

    receita(temp.path())
        .env("SUPABASE_URL", "not a url")
        .env("SUPABASE_ANON_KEY", "anon")
        .arg("today")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid shared store URL"));
}
