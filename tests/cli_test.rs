//! Integration tests driving the opskit binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Command with `HOME` and the audit log inside `home`.
fn opskit(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("opskit"));
    cmd.env("HOME", home.path())
        .env("OPSKIT_LOG_FILE", audit_path(home))
        .env_remove("RUST_LOG")
        .env_remove("OPSKIT_DB_PASSWORD")
        .env_remove("OPSKIT_CONFIRM")
        .current_dir(home.path());
    cmd
}

fn audit_path(home: &TempDir) -> PathBuf {
    home.path().join("audit.log")
}

fn audit_lines(home: &TempDir) -> Vec<String> {
    fs::read_to_string(audit_path(home))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

fn write(home: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = home.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: opskit"))
        .stdout(predicate::str::contains("backup"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_unknown_group_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home)
        .arg("frobnicate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unrecognized subcommand"))
        .stderr(predicate::str::contains("security"))
        .stderr(predicate::str::contains("completions"));
    Ok(())
}

#[test]
fn cli_unknown_subcommand_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let assert = opskit(&home).args(["docker", "explode"]).assert().code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("unrecognized subcommand"));
    for name in ["ps", "images", "logs", "stats", "cleanup"] {
        assert!(stderr.contains(name), "missing {name} in:\n{stderr}");
    }
    Ok(())
}

#[test]
fn cli_without_subcommand_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home).assert().code(1);
    opskit(&home).arg("git").assert().code(1);
    Ok(())
}

#[test]
fn cli_missing_argument_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home).args(["logs", "summary"]).assert().code(1);
    Ok(())
}

#[test]
fn cli_empty_argument_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home).args(["process", "check", ""]).assert().code(1);
    Ok(())
}

#[test]
fn cli_parse_errors_are_not_audited() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home).args(["net", "check-port", "localhost"]).assert().code(1);
    assert!(audit_lines(&home).is_empty());
    Ok(())
}

#[test]
fn text_stats_writes_one_audit_line() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let file = write(&home, "notes.txt", "alpha beta\n\ngamma\n");

    opskit(&home)
        .args(["text", "stats"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lines: 3"))
        .stdout(predicate::str::contains("Words: 3"));

    let lines = audit_lines(&home);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("[INFO] text stats: 3 lines, 3 words"));
    Ok(())
}

#[test]
fn missing_file_fails_and_is_audited() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    opskit(&home)
        .args(["logs", "summary", "missing.log"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));

    let lines = audit_lines(&home);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("[ERROR] logs summary:"));
    Ok(())
}

#[test]
fn logs_errors_ranks_messages() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let log = write(
        &home,
        "app.log",
        "INFO boot\nERROR db timeout after 30s\nERROR db timeout after 31s\nERROR disk full\n",
    );

    opskit(&home)
        .args(["logs", "errors"])
        .arg(&log)
        .args(["--top", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("db timeout after Ns"))
        .stdout(predicate::str::contains("disk full").not());
    Ok(())
}

#[test]
fn text_replace_in_place() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let file = write(&home, "hosts.txt", "db=10.0.0.1\ncache=10.0.0.2\n");

    opskit(&home)
        .args(["text", "replace"])
        .arg(&file)
        .args([r"10\.0\.0\.", "192.168.1.", "--in-place"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&file)?,
        "db=192.168.1.1\ncache=192.168.1.2\n"
    );
    Ok(())
}

#[test]
fn api_suite_passes_against_stub_server() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body("ok");
    });
    server.mock(|when, then| {
        when.method(POST).path("/users");
        then.status(201);
    });
    let suite = write(
        &home,
        "suite.txt",
        &format!(
            "# smoke tests\nhealth|GET|{}|200\ncreate|POST|{}|201|{{\"name\":\"ada\"}}\n",
            server.url("/health"),
            server.url("/users")
        ),
    );

    opskit(&home)
        .args(["api", "suite"])
        .arg(&suite)
        .assert()
        .success()
        .stdout(predicate::str::contains("Success rate: 100.0%"));

    assert!(audit_lines(&home)[0].contains("2/2 passed (100.0%)"));
    Ok(())
}

#[test]
fn api_suite_failure_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503);
    });
    let suite = write(
        &home,
        "suite.txt",
        &format!("health|GET|{}|200\n", server.url("/health")),
    );

    opskit(&home)
        .args(["api", "suite"])
        .arg(&suite)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected 200, got 503"));
    Ok(())
}

#[test]
fn empty_api_suite_runs_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let suite = write(&home, "empty.txt", "# nothing here\n\n");

    opskit(&home)
        .args(["api", "suite"])
        .arg(&suite)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tests run"));
    Ok(())
}

#[test]
fn api_suite_json_report() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let suite = write(&home, "bad.txt", "only|two\n");

    let output = opskit(&home)
        .args(["api", "suite", "--json"])
        .arg(&suite)
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["total"], 1);
    assert_eq!(report["results"][0]["outcome"], "malformed");
    Ok(())
}

#[test]
fn docker_cleanup_without_yes_is_cancelled() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    opskit(&home)
        .args(["docker", "cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));

    assert!(audit_lines(&home)[0].contains("[INFO] docker cleanup: cancelled"));
    Ok(())
}

#[test]
fn db_commands_need_configuration() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    opskit(&home)
        .args(["db", "tables"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not configured"));
    Ok(())
}

#[test]
fn db_configure_saves_connection() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    opskit(&home)
        .args(["db", "configure", "postgres", "db.local", "5432", "app", "shop"])
        .assert()
        .success();

    let saved = fs::read_to_string(home.path().join(".opskit").join("db.env"))?;
    assert!(saved.contains("DB_KIND=postgres"));
    assert!(saved.contains("DB_NAME=shop"));
    Ok(())
}

#[test]
fn invalid_settings_file_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let config = write(&home, "broken.yml", "backup: [unclosed\n");

    opskit(&home)
        .arg("--config")
        .arg(&config)
        .args(["text", "stats", "broken.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse"));
    Ok(())
}

#[test]
fn zero_max_backups_refuses_to_run() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let dest = home.path().join("out");
    let config = write(
        &home,
        "ops.yml",
        &format!(
            "backup:\n  destination: {}\n  max_backups: 0\n",
            dest.display()
        ),
    );
    write(&home, "site/index.html", "<h1>hi</h1>\n");

    opskit(&home)
        .arg("--config")
        .arg(&config)
        .args(["backup", "create", "site"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_backups must be at least 1"));
    assert!(!dest.exists());
    Ok(())
}

#[test]
fn check_port_reports_open_and_closed() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let open = listener.local_addr()?.port();
    let closed = {
        let probe = std::net::TcpListener::bind("127.0.0.1:0")?;
        probe.local_addr()?.port()
    };

    opskit(&home)
        .args(["net", "check-port", "127.0.0.1", &open.to_string()])
        .assert()
        .success();
    opskit(&home)
        .args(["net", "check-port", "127.0.0.1", &closed.to_string()])
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn completions_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    opskit(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_opskit"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn backup_create_rotates_and_restores() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::{Duration, SystemTime};

    let home = TempDir::new()?;
    let config = write(&home, "config.yml", "backup:\n  max_backups: 2\n");
    let source = home.path().join("site");
    fs::create_dir(&source)?;
    fs::write(source.join("index.html"), "<h1>hi</h1>")?;
    let dest = home.path().join("archives");
    fs::create_dir(&dest)?;
    for (i, name) in ["backup_site_20200101_000000.tar.gz", "backup_site_20200102_000000.tar.gz"]
        .iter()
        .enumerate()
    {
        let file = fs::File::create(dest.join(name))?;
        file.set_modified(SystemTime::now() - Duration::from_secs(86_400 * (10 - i as u64)))?;
    }

    opskit(&home)
        .arg("--config")
        .arg(&config)
        .args(["backup", "create"])
        .arg(&source)
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    let mut names: Vec<String> = fs::read_dir(&dest)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], "backup_site_20200102_000000.tar.gz");
    assert!(names[1].starts_with("backup_site_") && names[1] != names[0]);

    let target = home.path().join("restored");
    opskit(&home)
        .args(["backup", "restore"])
        .arg(dest.join(&names[1]))
        .arg(&target)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(target.join("site").join("index.html"))?,
        "<h1>hi</h1>"
    );
    Ok(())
}
