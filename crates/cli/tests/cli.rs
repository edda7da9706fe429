use assert_cmd::Command;
use predicates::prelude::*;

fn bookshelf(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", config_dir)
        .env_remove("BOOKSHELF_ENV")
        .env_remove("BOOKSHELF__DATABASE__URL")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn check_config_prints_redacted_target() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("test.toml"),
        "[server]\nport = 4100\n\n[database]\nurl = \"postgres://app:hunter2@db:5432/books_test\"\n",
    )
    .unwrap();

    bookshelf(dir.path())
        .args(["--env", "test", "check-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("environment: test"))
        .stdout(predicate::str::contains("0.0.0.0:4100"))
        .stdout(predicate::str::contains("postgres://app:***@db:5432/books_test"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn rejects_unknown_environment() {
    let dir = tempfile::tempdir().unwrap();

    bookshelf(dir.path())
        .args(["--env", "qa", "check-config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported environment 'qa'"));
}

#[test]
fn requires_a_subcommand() {
    let dir = tempfile::tempdir().unwrap();

    bookshelf(dir.path()).assert().failure();
}
