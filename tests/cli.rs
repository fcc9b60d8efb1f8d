use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn home_path(home: &TempDir) -> &Path {
    home.path()
}

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_bharat-ev-cost")
}

fn run_cmd(home: &TempDir, args: &[&str]) -> Output {
    run_cmd_with_env(home, args, &[])
}

fn run_cmd_with_env(home: &TempDir, args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env("BHARAT_EV_COST_HOME", home_path(home))
        .envs(vars.iter().copied())
        .output()
        .expect("run bharat-ev-cost command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_config(home: &TempDir, raw: &str) {
    let dir = home.path().join("config");
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join("config.toml"), raw).expect("write config");
}

#[test]
fn init_creates_config_and_data_paths() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["init"]);
    assert!(output.status.success());

    assert!(home.path().join("config").exists());
    assert!(home.path().join("data").exists());
    assert!(home.path().join("config").join("config.toml").exists());
}

#[test]
fn init_keeps_existing_config() {
    let home = TempDir::new().expect("temp home");
    write_config(&home, "default_city = \"Pune\"\n");

    assert!(run_cmd(&home, &["init"]).status.success());
    let raw = fs::read_to_string(home.path().join("config").join("config.toml"))
        .expect("read config");
    assert!(raw.contains("Pune"));
}

#[test]
fn vehicles_lists_built_in_catalog_as_csv() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["vehicles"]);
    assert!(output.status.success());

    let text = stdout(&output);
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(
        lines[0],
        "id,brand,name,category,kwh_per_100km,petrol_alt_kmpl,ev_premium"
    );
    assert_eq!(lines.len(), 7);
    assert!(lines.contains(&"ola-s1-air,Ola,S1 Air,two-wheeler,3.5,45,25000"));
}

#[test]
fn vehicles_filters_by_category() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["vehicles", "--category", "car"]);
    assert!(output.status.success());

    let text = stdout(&output);
    let rows = text.lines().skip(1).collect::<Vec<_>>();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.contains(",car,")));
}

#[test]
fn cities_include_source_metadata() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["cities"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.starts_with("city,tariff,petrol,discom,updated"));
    assert!(text.contains("Gurugram,8.2,96,DHBVN,2025-08-08"));
}

#[test]
fn calc_json_reports_costs_and_break_even() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(
        &home,
        &[
            "calc",
            "--vehicle",
            "ola-s1-air",
            "--city",
            "Gurugram",
            "--km",
            "50",
            "--json",
        ],
    );
    assert!(output.status.success());

    let parsed: Value = serde_json::from_str(&stdout(&output)).expect("calc json");
    assert_eq!(parsed["vehicle"], "ola-s1-air");
    assert_eq!(parsed["city"], "Gurugram");
    assert_eq!(parsed["daily_km"], 50.0);
    assert_eq!(parsed["result"]["break_even"]["months"], 10);

    let daily = parsed["result"]["daily_cost"].as_f64().expect("daily cost");
    assert!((daily - 14.35).abs() < 1e-9);
}

#[test]
fn calc_text_uses_indian_grouping() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(
        &home,
        &["calc", "--vehicle", "nexon-ev", "--city", "Delhi", "--km", "300"],
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Tata Nexon EV · Delhi"));
    assert!(text.contains("₹/year"));
    assert!(text.contains(','));
}

#[test]
fn calc_without_distance_asks_for_one() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["calc", "--vehicle", "ola-s1-air"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Select a daily distance first.");

    let output = run_cmd(
        &home,
        &["calc", "--vehicle", "ola-s1-air", "--custom-km", "abc"],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Select a daily distance first.");
}

#[test]
fn calc_rejects_unknown_vehicle() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["calc", "--vehicle", "hover-car", "--km", "50"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hover-car"));
}

#[test]
fn calc_rejects_non_chip_distance() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(&home, &["calc", "--vehicle", "ola-s1-air", "--km", "60"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported distance chip"));
}

#[test]
fn configured_vehicle_is_available_to_calc() {
    let home = TempDir::new().expect("temp home");
    write_config(
        &home,
        r#"
default_city = "Pune"

[[vehicles]]
id = "Ather-Rizta"
name = "Rizta"
brand = "Ather"
category = "scooter"
kwh_per_100km = 3.0
petrol_alt_kmpl = 50.0
ev_premium = 20000.0
"#,
    );

    let output = run_cmd(
        &home,
        &["calc", "--vehicle", "ather-rizta", "--km", "100", "--json"],
    );
    assert!(output.status.success());
    let parsed: Value = serde_json::from_str(&stdout(&output)).expect("calc json");
    assert_eq!(parsed["vehicle"], "ather-rizta");
    assert_eq!(parsed["city"], "Pune");
}

#[test]
fn share_saves_png_card_when_native_share_disabled() {
    let home = TempDir::new().expect("temp home");
    let out = home.path().join("cards");
    let out_str = out.to_string_lossy().to_string();
    let output = run_cmd(
        &home,
        &[
            "share",
            "--vehicle",
            "ola-s1-air",
            "--km",
            "50",
            "--no-native-share",
            "--out",
            &out_str,
        ],
    );
    assert!(output.status.success());

    let card = out.join("ola-s1-air-50km.png");
    assert!(stdout(&output).contains("ola-s1-air-50km.png"));
    assert_eq!(
        image::image_dimensions(&card).expect("card dimensions"),
        (1200, 630)
    );
}

#[test]
fn share_with_unreadable_logo_still_saves_card() {
    let home = TempDir::new().expect("temp home");
    let out = home.path().join("cards");
    let out_str = out.to_string_lossy().to_string();
    let logo = home.path().join("missing-logo.png");
    let logo_str = logo.to_string_lossy().to_string();
    let output = run_cmd(
        &home,
        &[
            "share",
            "--vehicle",
            "tiago-ev",
            "--custom-km",
            "42",
            "--logo",
            &logo_str,
            "--no-native-share",
            "--out",
            &out_str,
        ],
    );
    assert!(output.status.success());
    assert!(out.join("tiago-ev-42km.png").exists());
}

#[test]
fn share_requires_distance() {
    let home = TempDir::new().expect("temp home");
    let output = run_cmd(
        &home,
        &["share", "--vehicle", "ola-s1-air", "--no-native-share"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MissingDistance"));
    assert!(!home.path().join("data").join("cards").exists());
}

#[test]
fn environment_overrides_default_city() {
    let home = TempDir::new().expect("temp home");
    write_config(&home, "default_city = \"Pune\"\n");
    let output = run_cmd_with_env(
        &home,
        &["calc", "--vehicle", "ola-s1-air", "--km", "50", "--json"],
        &[("BHARAT_EV_COST_DEFAULT_CITY", "Delhi")],
    );
    assert!(output.status.success());

    let parsed: Value = serde_json::from_str(&stdout(&output)).expect("calc json");
    assert_eq!(parsed["city"], "Delhi");
    let raw = fs::read_to_string(home.path().join("config").join("config.toml"))
        .expect("read config");
    assert!(raw.contains("Pune"));
}
