use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET_ENVS: [&str; 7] = [
    "OPENAI_API_KEY",
    "SLACK_WEBHOOK_URL",
    "TIKTOK_CLIENT_KEY",
    "TIKTOK_CLIENT_SECRET",
    "TIKTOK_REFRESH_TOKEN",
    "S3_ACCESS_KEY_ID",
    "S3_SECRET_ACCESS_KEY",
];

/// Offline configuration rooted in a temporary directory
fn write_offline_config(dir: &TempDir) -> PathBuf {
    let root = dir.path();
    let content = format!(
        r#"[general]
staging_path = "{staging}"
image_dir = "{images}"

[llm]
provider = "stub"

[image]
provider = "stub"

[storage]
provider = "none"

[tiktok]
base_url = "http://127.0.0.1:9"
"#,
        staging = root.join("pending_post.json").display(),
        images = root.join("images").display(),
    );
    let path = root.join("dreampost.toml");
    fs::write(&path, content).expect("write config");
    path
}

fn dreampost(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dreampost");
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    for env in SECRET_ENVS {
        cmd.env_remove(env);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().expect("temp dir");

    dreampost(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("nested").join("dreampost.toml");

    dreampost(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("staging_path"));
    assert!(content.contains("privacy_level = \"SELF_ONLY\""));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("dreampost.toml");
    fs::write(&config_path, "# mine").expect("write existing");

    dreampost(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine");

    dreampost(&dir)
        .args(["config", "init", "--force", "--path"])
        .arg(&config_path)
        .assert()
        .success();
    assert!(fs::read_to_string(&config_path).unwrap().contains("[tiktok]"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");

    dreampost(&dir)
        .args(["--config", "does-not-exist.toml", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn show_reports_empty_staging() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);

    dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing staged"));
}

#[test]
fn publish_without_staged_post_fails_before_any_request() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);

    dreampost(&dir)
        .env("TIKTOK_CLIENT_KEY", "key")
        .env("TIKTOK_CLIENT_SECRET", "secret")
        .env("TIKTOK_REFRESH_TOKEN", "refresh")
        .arg("--config")
        .arg(&config)
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to publish"));
}

#[test]
fn publish_rejects_corrupt_staging_file() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);
    fs::write(dir.path().join("pending_post.json"), "{ not json").expect("write corrupt");

    dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["publish", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to publish"));
}

#[test]
fn generate_stages_post_that_show_and_dry_run_can_read() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);

    dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["generate", "--no-notify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged post"));

    let staged = dir.path().join("pending_post.json");
    assert!(staged.exists());

    let output = dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["show", "--json"])
        .output()
        .expect("run show");
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let media = value["media_reference"].as_str().expect("media reference");
    assert!(media.ends_with(".png"));
    assert!(PathBuf::from(media).exists());
    assert_eq!(value["caption"], "Every quiet night is a page of its own.");
    assert!(value["hashtags"].as_str().unwrap().contains("#aiart"));

    dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["publish", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("direct upload"))
        .stdout(predicate::str::contains("SELF_ONLY"))
        .stdout(predicate::str::contains("Auto add music:  true"));
}

#[tokio::test(flavor = "multi_thread")]
async fn publish_without_client_key_reports_failure_to_slack() {
    let slack = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/dreampost"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&slack)
        .await;

    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);

    dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["generate", "--no-notify"])
        .assert()
        .success();

    dreampost(&dir)
        .env("SLACK_WEBHOOK_URL", format!("{}/hooks/dreampost", slack.uri()))
        .env("TIKTOK_CLIENT_SECRET", "secret")
        .env("TIKTOK_REFRESH_TOKEN", "refresh")
        .arg("--config")
        .arg(&config)
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("credential refresh"));

    let requests = slack.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("Post Failed"));
    assert!(body.contains("client key"));
}

#[test]
fn generate_notify_only_requires_staged_post() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);

    dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["generate", "--notify-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing is staged"));
}

#[test]
fn generate_notify_flags_conflict() {
    let dir = TempDir::new().expect("temp dir");

    dreampost(&dir)
        .args(["generate", "--notify-only", "--no-notify"])
        .assert()
        .failure();
}

#[test]
fn env_overrides_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);
    let other = dir.path().join("other.json");

    dreampost(&dir)
        .env("DREAMPOST__GENERAL__STAGING_PATH", &other)
        .arg("--config")
        .arg(&config)
        .args(["generate", "--no-notify"])
        .assert()
        .success();

    assert!(other.exists());
    assert!(!dir.path().join("pending_post.json").exists());
}

#[test]
fn doctor_outputs_json_report() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_offline_config(&dir);

    let output = dreampost(&dir)
        .arg("--config")
        .arg(&config)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    // Missing TikTok credentials are a warning, not an error
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["config"]["status"], "ok");
    assert_eq!(value["llm"]["status"], "ok");
    assert_eq!(value["tiktok"]["status"], "warn");
    assert_eq!(value["overall"], "warn");
}
