use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct CliOutput {
    pub stdout: String,
    #[allow(dead_code)]
    pub stderr: String,
}

/// Runs the scripted CLI against an isolated data directory.
pub struct FunnelHarness {
    home: TempDir,
}

impl FunnelHarness {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    #[allow(dead_code)]
    pub fn snapshot_path(&self) -> PathBuf {
        self.home().join("state").join("car-funnel-lead.json")
    }

    #[allow(dead_code)]
    pub fn write_config(&self, json: &str) {
        std::fs::write(self.home().join("config.json"), json).expect("write config");
    }

    pub fn run_interactive(&self, menu_sequences: &[&str], text_inputs: &[&str]) -> CliOutput {
        self.run_interactive_with_env(menu_sequences, text_inputs, &[])
    }

    pub fn run_interactive_with_env(
        &self,
        menu_sequences: &[&str],
        text_inputs: &[&str],
        extra_env: &[(&str, &str)],
    ) -> CliOutput {
        assert!(
            !menu_sequences.is_empty(),
            "provide at least one menu sequence"
        );
        let mut cmd = Command::cargo_bin("funnel_core_cli").expect("binary exists");
        cmd.env("FUNNEL_CORE_HOME", self.home());
        cmd.env("FUNNEL_TEST_MENU_EVENTS", menu_sequences.join("|"));
        cmd.env("FUNNEL_TEST_TEXT_INPUTS", text_inputs.join("|"));
        cmd.env_remove("RUST_LOG");
        for (key, value) in extra_env {
            cmd.env(key, value);
        }
        let output = cmd.output().expect("run interactive CLI");
        if !output.status.success() {
            panic!(
                "interactive CLI failed: status={}\nstdout:\n{}\nstderr:\n{}",
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
