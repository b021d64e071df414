#![allow(deprecated)] // cargo_bin! macro doesn't exist yet in assert_cmd 2.1

use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;
use tempfile::TempDir;

fn release_fetch() -> Command {
    let mut cmd = Command::cargo_bin("release-fetch").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("HTTP_PROXY")
        .env_remove("HTTPS_PROXY");
    cmd
}

fn write_config(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("github-releases.yaml");
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn version_flag() {
    release_fetch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_config_exits_1() {
    let dir = TempDir::new().unwrap();
    release_fetch()
        .arg("-c")
        .arg(dir.path().join("nope.yaml"))
        .arg("-d")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn missing_config_quiet_prints_no_help() {
    let dir = TempDir::new().unwrap();
    release_fetch()
        .arg("-q")
        .arg("-c")
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn config_directory_exits_1_as_unreadable() {
    let dir = TempDir::new().unwrap();
    release_fetch()
        .arg("-c")
        .arg(dir.path())
        .arg("-d")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error reading config file"))
        .stderr(predicate::str::contains("does not exist").not())
        .stdout(predicate::str::contains("Usage").not());
}

#[test]
fn invalid_config_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "- name: A\n  repository: a/b\n  files: ['app-(']\n");
    release_fetch()
        .arg("-c")
        .arg(&config)
        .arg("-d")
        .arg(dir.path())
        .assert()
        .code(1);
}

#[test]
fn missing_download_dir_exits_2() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[]\n");
    release_fetch()
        .arg("-c")
        .arg(&config)
        .arg("-d")
        .arg(dir.path().join("missing"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not writable"));
}

#[test]
fn downloads_and_reports() {
    let mut server = Server::new();
    let release = server
        .mock("GET", "/repos/acme/tool/releases/latest")
        .with_status(200)
        .with_body(format!(
            r#"{{"name": "Tool 1.0.0", "assets": [{{"name": "app-1.0.0.tar.gz", "size": 5, "browser_download_url": "{}/dl/app-1.0.0.tar.gz"}}]}}"#,
            server.url()
        ))
        .expect(2)
        .create();
    let asset = server
        .mock("GET", "/dl/app-1.0.0.tar.gz")
        .with_status(200)
        .with_body("hello")
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "- name: Tool\n  repository: acme/tool\n  files: ['app-.*']\n",
    );
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    release_fetch()
        .arg("-c")
        .arg(&config)
        .arg("-d")
        .arg(&out)
        .arg("-u")
        .arg(server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest release of Tool is Tool 1.0.0"))
        .stdout(predicate::str::contains("Downloading asset app-1.0.0.tar.gz"));

    assert_eq!(std::fs::read_to_string(out.join("app-1.0.0.tar.gz")).unwrap(), "hello");

    // Second run only skips.
    release_fetch()
        .arg("-c")
        .arg(&config)
        .arg("-d")
        .arg(&out)
        .arg("-u")
        .arg(server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping download"));

    release.assert();
    asset.assert();
}

#[test]
fn failed_item_exits_3_after_processing_the_rest() {
    let mut server = Server::new();
    let _missing = server
        .mock("GET", "/repos/acme/missing/releases/latest")
        .with_status(404)
        .create();
    let _tool = server
        .mock("GET", "/repos/acme/tool/releases/latest")
        .with_status(200)
        .with_body(r#"{"name": "Tool 2", "assets": []}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "- name: Missing\n  repository: acme/missing\n  files: [app]\n- name: Tool\n  repository: acme/tool\n  files: [app]\n",
    );

    release_fetch()
        .arg("-c")
        .arg(&config)
        .arg("-d")
        .arg(dir.path())
        .arg("-u")
        .arg(server.url())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Missing"))
        .stdout(predicate::str::contains("Latest release of Tool is Tool 2"));
}

#[test]
fn quiet_run_prints_nothing_to_stdout() {
    let mut server = Server::new();
    let _tool = server
        .mock("GET", "/repos/acme/tool/releases/latest")
        .with_status(200)
        .with_body(r#"{"name": "Tool 2", "assets": []}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "- name: Tool\n  repository: acme/tool\n  files: [app]\n");

    release_fetch()
        .arg("-q")
        .arg("-c")
        .arg(&config)
        .arg("-d")
        .arg(dir.path())
        .arg("-u")
        .arg(server.url())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
