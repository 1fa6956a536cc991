use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn non_http_scheme_is_a_warning_with_exit_2_and_no_output() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("out");

    Command::new(assert_cmd::cargo::cargo_bin!("pagefreq"))
        .args(["run", "ftp://example.com/index.html", "--wordcloud", "false", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("warning: invalid url"));

    assert!(!out_dir.exists(), "nothing should be written for an invalid url");
}

#[test]
fn unsupported_chart_kind_fails_before_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("out");

    // The host does not resolve; a fetch attempt would report a transport error instead.
    Command::new(assert_cmd::cargo::cargo_bin!("pagefreq"))
        .args([
            "run",
            "http://unreachable.invalid/",
            "--chart",
            "histogram",
            "--wordcloud",
            "false",
            "--out-dir",
        ])
        .arg(&out_dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported chart kind: histogram"));

    assert!(!out_dir.exists());
}

#[test]
fn transport_failure_reports_cause_and_writes_nothing() {
    // Bind then drop to get a port nobody is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/");
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("out");

    let out = std::process::Command::new(assert_cmd::cargo::cargo_bin!("pagefreq"))
        .args(["run", url.as_str(), "--wordcloud", "false", "--out-dir"])
        .arg(&out_dir)
        .env("PAGEFREQ_TIMEOUT_MS", "3000")
        .env("PAGEFREQ_CONNECT_TIMEOUT_MS", "3000")
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .expect("run pagefreq");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: fetch failed"), "stderr: {stderr}");
    // The OS-level reason survives, not just the client's summary line.
    assert!(stderr.to_lowercase().contains("refused"), "stderr: {stderr}");
    assert!(!out_dir.join("chart.json").exists());
    assert!(!out_dir.join("wordcloud.png").exists());
}

#[test]
fn missing_font_fails_before_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("out");

    Command::new(assert_cmd::cargo::cargo_bin!("pagefreq"))
        .args(["run", "http://unreachable.invalid/", "--font", "/no/such/font.ttc", "--out-dir"])
        .arg(&out_dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("font error"));

    assert!(!out_dir.exists());
}
