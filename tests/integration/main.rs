//! Integration tests for the Launchpad CLI

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// CLI isolated in a scratch home with no ambient overrides
    fn launchpad(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("launchpad");
        cmd.env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path().join("config"))
            .env("XDG_STATE_HOME", home.path().join("state"))
            .env_remove("LAUNCHPAD_CONFIG")
            .env_remove("LAUNCHPAD_API_URL")
            .env_remove("LAUNCHPAD_PASSWORD")
            .env_remove("CI");
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("deploy and manage services"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("launchpad"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_path_follows_flag() {
        let home = TempDir::new().unwrap();
        let custom = home.path().join("custom.toml");
        launchpad(&home)
            .args(["-c", custom.to_str().unwrap(), "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("[api]"))
            .stdout(predicate::str::contains("[poll]"));
    }

    #[test]
    fn config_set_persists() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["config", "set", "api.base_url", "http://localhost:8000"])
            .assert()
            .success();

        launchpad(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://localhost:8000"));
    }

    #[test]
    fn config_set_unknown_key() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn api_url_env_overrides_config() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .env("LAUNCHPAD_API_URL", "http://env.example")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://env.example"));
    }

    #[test]
    fn config_set_does_not_persist_env_override() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .env("LAUNCHPAD_API_URL", "http://env.example")
            .args(["config", "set", "poll.interval_secs", "9"])
            .assert()
            .success();

        launchpad(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("interval_secs = 9"))
            .stdout(predicate::str::contains("http://env.example").not());
    }

    #[test]
    fn theme_defaults_to_system_and_persists() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["theme", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("system"));

        launchpad(&home).args(["theme", "set", "dark"]).assert().success();

        launchpad(&home)
            .args(["theme", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dark"));
    }

    #[test]
    fn whoami_requires_login() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"))
            .stderr(predicate::str::contains("launchpad login"));
    }

    #[test]
    fn services_list_requires_login() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["services", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }

    #[test]
    fn logout_when_signed_out() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .arg("logout")
            .assert()
            .success()
            .stdout(predicate::str::contains("Not logged in"));
    }

    #[test]
    fn login_without_terminal_needs_username() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .arg("login")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--username"));
    }

    #[test]
    fn login_reports_unreachable_api() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args([
                "--api-url",
                "http://127.0.0.1:9",
                "login",
                "-u",
                "ada",
                "--password",
                "secret",
            ])
            .assert()
            .code(75)
            .stderr(predicate::str::contains("Cannot reach the Launchpad API"));
    }

    #[test]
    fn upload_rejects_missing_artifact() {
        let home = TempDir::new().unwrap();
        let missing = home.path().join("missing.zip");
        launchpad(&home)
            .args(["deploys", "upload", "3", missing.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn upload_rejects_non_zip() {
        let home = TempDir::new().unwrap();
        let file = home.path().join("site.tar");
        std::fs::write(&file, b"not a zip").unwrap();
        launchpad(&home)
            .args(["deploys", "upload", "3", file.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected a .zip archive"));
    }

    #[test]
    fn completions_generate() {
        let home = TempDir::new().unwrap();
        launchpad(&home)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("launchpad"));
    }
}
