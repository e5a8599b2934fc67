#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;
use tempfile::TempDir;
use url::Url;

/// A directory-backed store plus an isolated home for the CLI.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::create_dir_all(dir.path().join("store/records/Restaurant")).unwrap();
        fs::create_dir_all(dir.path().join("store/assets")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_root(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn store_url(&self) -> String {
        Url::from_directory_path(self.store_root())
            .expect("Failed to convert path to file URL")
            .to_string()
    }

    /// Write a restaurant record, with an image asset when `image` is set.
    pub fn add_restaurant(&self, id: &str, created_at: &str, name: &str, image: Option<&[u8]>) {
        let root = self.store_root();
        let mut assets = json!({});
        if let Some(bytes) = image {
            fs::write(root.join(format!("assets/{id}.jpg")), bytes).unwrap();
            assets = json!({ "image": { "path": format!("assets/{id}.jpg") } });
        }

        let record = json!({
            "createdAt": created_at,
            "fields": { "name": name, "category": "Cafe", "location": "Hong Kong" },
            "assets": assets,
        });
        fs::write(
            root.join(format!("records/Restaurant/{id}.json")),
            record.to_string(),
        )
        .unwrap();
    }

    /// Run the CLI against this fixture's store.
    pub fn run(&self, args: &[&str]) -> Output {
        let store = self.store_url();
        let mut full = vec!["--store", store.as_str()];
        full.extend_from_slice(args);
        self.run_raw(&full)
    }

    /// Run the CLI with only the given arguments.
    pub fn run_raw(&self, args: &[&str]) -> Output {
        let home = self.dir.path().join("home");
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cloudpin"));
        cmd.args(args);
        cmd.env("HOME", &home);
        cmd.env("XDG_CONFIG_HOME", home.join("config"));
        cmd.env("XDG_CACHE_HOME", home.join("cache"));
        cmd.env_remove("CLOUDPIN_STORE");
        cmd.env_remove("CLOUDPIN_ASSET_DIR");
        cmd.env_remove("CLOUDPIN_CONFIG");
        cmd.env_remove("RUST_LOG");
        cmd.output().expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success, returning stdout.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }
}

/// Parse JSON lines from stdout.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
