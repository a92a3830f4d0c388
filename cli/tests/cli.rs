use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn builtin_scenario_prints_results() {
    Command::cargo_bin("tactics")
        .expect("binary built")
        .args(["--scenario-id", "orcs_vs_commoners", "--encounters", "5", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("encounters:         5"))
        .stdout(predicate::str::contains("ORC BRIGADE:"))
        .stdout(predicate::str::contains("Hit Ratio"));
}

#[test]
fn show_grid_prints_the_final_map() {
    Command::cargo_bin("tactics")
        .expect("binary built")
        .args(["--map-id", "arena", "--encounters", "2", "--show-grid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("┏"))
        .stdout(predicate::str::contains("#"));
}

#[test]
fn attack_log_is_written_as_json_lines() {
    let path = std::env::temp_dir().join(format!("tactics-cli-log-{}.jsonl", std::process::id()));
    Command::cargo_bin("tactics")
        .expect("binary built")
        .args(["--encounters", "3", "--seed", "4", "--log-out"])
        .arg(&path)
        .assert()
        .success();

    let text = std::fs::read_to_string(&path).expect("log written");
    let _ = std::fs::remove_file(&path);
    assert!(!text.is_empty());
    for line in text.lines() {
        let v: serde_json::Value = serde_json::from_str(line).expect("json line");
        assert!(v.get("attacker_id").is_some());
        assert!(v.get("damage").is_some());
    }
}

#[test]
fn unknown_scenario_fails() {
    Command::cargo_bin("tactics")
        .expect("binary built")
        .args(["--scenario-id", "dragons", "--encounters", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dragons"));
}

#[test]
fn conflicting_sources_are_rejected() {
    Command::cargo_bin("tactics")
        .expect("binary built")
        .args(["--scenario", "a.json", "--scenario-id", "orcs_vs_commoners"])
        .assert()
        .failure();
}
