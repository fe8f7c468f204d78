// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the compiled `devkool` binary.
//!
//! Each test gets its own temp directory used as working directory, config
//! home, and data directory. Every command runs in a fresh process, so any
//! state that survives between commands went through disk.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_devkool"));
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("DEVKOOL_STORAGE_DATA_DIR", self.data_dir())
            .env("DEVKOOL_CLASSIFIER_BACKEND", "heuristic")
            .env_remove("DEVKOOL_SECRET_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    fn ok(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "devkool {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8(out.stdout).unwrap()
    }

    fn list_json(&self) -> Value {
        serde_json::from_str(&self.ok(&["list", "--json"])).unwrap()
    }
}

fn added_id(stdout: &str) -> String {
    // "Stored credential <id> (category: ...)"
    stdout
        .split_whitespace()
        .nth(2)
        .expect("id in add output")
        .to_string()
}

#[test]
fn add_then_list_across_processes() {
    let sandbox = Sandbox::new();
    let out = sandbox.ok(&["--plain", "add", "sk-live-123", "https://api.stripe.com/v1/charges"]);
    assert!(out.contains("category: Payments"), "{out}");
    let id = added_id(&out);

    let list = sandbox.list_json();
    let creds = list["credentials"].as_array().unwrap();
    assert_eq!(creds.len(), 1);
    assert_eq!(creds[0]["id"], id.as_str());
    assert_eq!(creds[0]["api_key"], "sk-live-123");
    assert_eq!(creds[0]["endpoint"], "https://api.stripe.com/v1/charges");
    assert_eq!(creds[0]["category"], "Payments");
    assert!(list["failures"].as_array().unwrap().is_empty());
}

#[test]
fn files_land_in_data_dir_encrypted() {
    let sandbox = Sandbox::new();
    sandbox.ok(&["add", "sk-very-secret", "https://api.example.com"]);

    let key = std::fs::read(sandbox.data_dir().join("secret.key")).unwrap();
    assert_eq!(key.len(), 32);
    let store = std::fs::read_to_string(sandbox.data_dir().join("api_store.json")).unwrap();
    assert!(!store.contains("sk-very-secret"));
    assert!(!store.contains("api.example.com"));
}

#[test]
fn list_mask_hides_key() {
    let sandbox = Sandbox::new();
    sandbox.ok(&["add", "sk-live-abcdefghijkl", "https://api.example.com"]);
    let out = sandbox.ok(&["--plain", "list", "--mask"]);
    assert!(out.contains("sk-l...ijkl"), "{out}");
    assert!(!out.contains("sk-live-abcdefghijkl"));
}

#[test]
fn invalid_endpoint_fails_with_exit_code() {
    let sandbox = Sandbox::new();
    let out = sandbox.run(&["add", "k", "not a url"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: invalid endpoint"), "{stderr}");
    assert!(!stderr.contains('\u{1b}'));
    assert!(!sandbox.data_dir().join("api_store.json").exists());
}

#[test]
fn update_and_show() {
    let sandbox = Sandbox::new();
    let id = added_id(&sandbox.ok(&["--plain", "add", "old", "https://api.github.com"]));

    sandbox.ok(&["update", &id, "--new-api-key", "new"]);
    let shown = sandbox.ok(&["show", &id]);
    assert!(shown.contains("api key:  new"), "{shown}");
    assert!(shown.contains("endpoint: https://api.github.com"));
    assert!(shown.contains("category: Developer Tools"));
}

#[test]
fn update_without_fields_fails() {
    let sandbox = Sandbox::new();
    let id = added_id(&sandbox.ok(&["--plain", "add", "k", "https://a.example.com"]));
    assert!(!sandbox.run(&["update", &id]).status.success());
}

#[test]
fn delete_then_missing() {
    let sandbox = Sandbox::new();
    let id = added_id(&sandbox.ok(&["--plain", "add", "k", "https://a.example.com"]));

    sandbox.ok(&["delete", &id]);
    assert!(sandbox.list_json()["credentials"].as_array().unwrap().is_empty());

    let out = sandbox.run(&["delete", &id]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no record with id"));
}

#[test]
fn disabled_classifier_stores_uncategorized() {
    let sandbox = Sandbox::new();
    let out = sandbox
        .command(&["--plain", "add", "k", "https://api.stripe.com"])
        .env("DEVKOOL_CLASSIFIER_BACKEND", "disabled")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("category: Uncategorized"));
}

#[test]
fn status_json_reports_state() {
    let sandbox = Sandbox::new();
    let before: Value = serde_json::from_str(&sandbox.ok(&["status", "--json"])).unwrap();
    assert_eq!(before["key_source"], "missing");
    assert_eq!(before["store_health"], "missing");
    assert_eq!(before["record_count"], 0);

    sandbox.ok(&["add", "k", "https://a.example.com"]);
    let after: Value = serde_json::from_str(&sandbox.ok(&["status", "--json"])).unwrap();
    assert_eq!(after["key_source"], "file");
    assert_eq!(after["store_health"], "healthy");
    assert_eq!(after["record_count"], 1);
}

#[test]
fn corrupt_record_does_not_fail_list() {
    let sandbox = Sandbox::new();
    sandbox.ok(&["add", "good", "https://good.example.com"]);
    let bad = added_id(&sandbox.ok(&["--plain", "add", "bad", "https://bad.example.com"]));

    let store_path = sandbox.data_dir().join("api_store.json");
    let mut store: Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    store[bad.as_str()]["endpoint"] = Value::String("AQ".repeat(20));
    std::fs::write(&store_path, store.to_string()).unwrap();

    let list = sandbox.list_json();
    assert_eq!(list["credentials"].as_array().unwrap().len(), 1);
    assert_eq!(list["failures"][0]["id"], bad.as_str());
}

#[test]
fn config_file_flag_is_honored() {
    let sandbox = Sandbox::new();
    let config_path = sandbox.dir.path().join("custom.toml");
    std::fs::write(&config_path, "[storage]\nstore_file = \"other.json\"\n").unwrap();

    sandbox.ok(&["--config", config_path.to_str().unwrap(), "add", "k", "https://a.example.com"]);
    assert!(sandbox.data_dir().join("other.json").exists());
    assert!(!sandbox.data_dir().join("api_store.json").exists());
}

#[test]
fn bad_config_is_reported() {
    let sandbox = Sandbox::new();
    let config_path = sandbox.dir.path().join("bad.toml");
    std::fs::write(&config_path, "[storage]\nstore_fiel = \"x.json\"\n").unwrap();

    let out = sandbox.run(&["--config", config_path.to_str().unwrap(), "list"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("store_fiel"), "{stderr}");
}

#[test]
fn env_key_takes_precedence() {
    let sandbox = Sandbox::new();
    // 32 zero bytes, base64.
    let key = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    let run = |args: &[&str]| {
        sandbox
            .command(args)
            .env("DEVKOOL_SECRET_KEY", key)
            .output()
            .unwrap()
    };

    assert!(run(&["add", "k", "https://a.example.com"]).status.success());
    assert!(!sandbox.data_dir().join("secret.key").exists());

    let listed = run(&["list", "--json"]);
    let list: Value = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(list["credentials"][0]["api_key"], "k");

    // Without the env key there is no key file, and records exist.
    let out = sandbox.run(&["list"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("secret key unavailable"));
}

#[test]
fn help_lists_commands() {
    let sandbox = Sandbox::new();
    let out = sandbox.ok(&["--help"]);
    for command in ["add", "list", "show", "update", "delete", "status"] {
        assert!(out.contains(command), "missing {command} in help");
    }
}
