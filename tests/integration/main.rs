//! Integration tests for dlock

mod scenarios;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Isolated store, export dir and config for one test
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let config = format!(
                "[general]\naudit_log = false\n\n[store]\ndir = '{}'\n\n[export]\ndir = '{}'\n",
                dir.path().join("store").display(),
                dir.path().join("exports").display()
            );
            std::fs::write(dir.path().join("config.toml"), config).unwrap();
            Self { dir }
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn exports(&self) -> Vec<PathBuf> {
            let dir = self.dir.path().join("exports");
            if !dir.exists() {
                return vec![];
            }
            let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            paths.sort();
            paths
        }

        fn cmd(&self) -> Command {
            let mut cmd = dlock();
            cmd.arg("--config").arg(self.config_path());
            cmd
        }
    }

    fn dlock() -> Command {
        let mut cmd = cargo_bin_cmd!("dlock");
        cmd.env_remove("DLOCK_CONFIG").env_remove("DLOCK_ADMIN_PASSWORD");
        cmd
    }

    fn create_draft(sandbox: &Sandbox, name: &str) {
        sandbox
            .cmd()
            .args(["create", name, "--content", r#"{"steps":[1,2,3]}"#])
            .assert()
            .success();
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn help_displays() {
        dlock()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Lock, export and cache finalized business deliverables",
            ))
            .stdout(predicate::str::contains("export-all"));
    }

    #[test]
    fn version_displays() {
        dlock()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("dlock"));
    }

    #[test]
    fn config_path_honors_flag() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("capacity = 100"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.config_path(), "[cache\ncapacity = ").unwrap();
        sandbox
            .cmd()
            .args(["stats"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn list_empty() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn create_rejects_malformed_content() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["create", "Plan", "--content", "{\"steps\": ["])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not valid JSON"));
    }

    #[test]
    fn lock_requires_optimize() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "Plan");

        sandbox
            .cmd()
            .args(["lock", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not optimized"))
            .stderr(predicate::str::contains("dlock optimize"));
        assert!(sandbox.exports().is_empty());
    }

    #[test]
    fn failed_export_is_reported_as_retryable() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "Plan");
        sandbox.cmd().args(["optimize", "1"]).assert().success();

        // A regular file where the export directory should be
        std::fs::write(sandbox.dir.path().join("exports"), "not a directory").unwrap();

        sandbox
            .cmd()
            .args(["lock", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Export failed"))
            .stderr(predicate::str::contains("can be retried"));

        sandbox
            .cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1\toptimized\tPlan"));
    }

    #[test]
    fn show_missing_deliverable() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["show", "99"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Deliverable not found: 99"));
    }

    #[test]
    fn lock_unlock_lifecycle() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "Quarterly plan");

        sandbox
            .cmd()
            .args(["optimize", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("marked optimized"));

        sandbox
            .cmd()
            .args(["lock", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Locked deliverable 1"));

        let exports = sandbox.exports();
        assert_eq!(exports.len(), 1);
        assert!(file_name(&exports[0]).starts_with("deliverable-1-"));

        // Relocking is a no-op
        sandbox
            .cmd()
            .args(["lock", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already locked"));
        assert_eq!(sandbox.exports().len(), 1);

        sandbox
            .cmd()
            .args(["edit", "1", "--content", "{}"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("locked"));

        sandbox
            .cmd()
            .args(["admin", "add", "admin", "--password", "correctpassword"])
            .assert()
            .success();

        sandbox
            .cmd()
            .args(["unlock", "1", "--password", "wrongpassword"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unauthorized"));

        sandbox
            .cmd()
            .args(["show", "1", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"is_locked\": true"));

        sandbox
            .cmd()
            .args(["unlock", "1"])
            .env("DLOCK_ADMIN_PASSWORD", "correctpassword")
            .assert()
            .success()
            .stdout(predicate::str::contains("Unlocked deliverable 1"));

        sandbox
            .cmd()
            .args(["show", "1", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"is_locked\": false"))
            .stdout(predicate::str::contains("\"exported_path\": null"));
    }

    #[test]
    fn staff_cannot_unlock() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "Plan");
        sandbox.cmd().args(["optimize", "1"]).assert().success();
        sandbox.cmd().args(["lock", "1"]).assert().success();
        sandbox
            .cmd()
            .args(["admin", "add", "clerk", "--password", "pw", "--staff"])
            .assert()
            .success();

        sandbox
            .cmd()
            .args(["unlock", "1", "--username", "clerk", "--password", "pw"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unauthorized"));
    }

    #[test]
    fn unlock_without_password_fails_non_interactive() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["unlock", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no password given"));
    }

    #[test]
    fn export_all_and_verify() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "First");
        create_draft(&sandbox, "Second");
        create_draft(&sandbox, "Draft only");
        sandbox.cmd().args(["optimize", "1"]).assert().success();
        sandbox.cmd().args(["optimize", "2"]).assert().success();

        sandbox
            .cmd()
            .args(["export-all"])
            .assert()
            .success()
            .stdout(predicate::str::contains("exported: 2"));

        let exports = sandbox.exports();
        assert_eq!(exports.len(), 2);

        sandbox
            .cmd()
            .args(["list", "--state", "locked", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1\tlocked\tFirst"))
            .stdout(predicate::str::contains("2\tlocked\tSecond"))
            .stdout(predicate::str::contains("Draft only").not());

        dlock()
            .arg("verify")
            .arg(&exports[0])
            .assert()
            .success()
            .stdout(predicate::str::contains("Checksum matches"));
    }

    #[test]
    fn verify_detects_tampering() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "Plan");
        sandbox.cmd().args(["optimize", "1"]).assert().success();
        sandbox.cmd().args(["lock", "1"]).assert().success();

        let artifact = sandbox.exports().remove(0);
        let raw = std::fs::read_to_string(&artifact).unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        doc["content"]["steps"] = serde_json::json!([9]);
        std::fs::write(&artifact, serde_json::to_string(&doc).unwrap()).unwrap();

        dlock()
            .arg("verify")
            .arg(&artifact)
            .assert()
            .failure()
            .stdout(predicate::str::contains("Checksum mismatch"));
    }

    #[test]
    fn stats_reports_preloaded_cache() {
        let sandbox = Sandbox::new();
        create_draft(&sandbox, "Plan");
        sandbox.cmd().args(["optimize", "1"]).assert().success();
        sandbox.cmd().args(["lock", "1"]).assert().success();

        sandbox
            .cmd()
            .args(["stats", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"size\": 1"))
            .stdout(predicate::str::contains("\"capacity\": 100"));
    }
}
