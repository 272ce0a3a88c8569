use std::{fs, process::Command};

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const CAPS: &str = "\
key_up kcuu1 str ku KEY_UP 0403 ----- up-arrow key
key_none knone str kn KEY_NONE - ----- no code
";

const HEADER: &str = "#define KEY_HOME\t0406\t\t/* home key */\n";

fn setup(caps: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("Caps"), caps).unwrap();
    fs::write(temp_dir.path().join("ncurses.h"), HEADER).unwrap();
    temp_dir
}

fn command(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("keycode-gen").unwrap();
    cmd.current_dir(temp_dir.path()).args([
        "--caps-file",
        "Caps",
        "--curses-header",
        "ncurses.h",
        "--output-prefix",
        "keycode",
        "--year",
        "2013",
    ]);
    cmd
}

#[test]
fn help() {
    let mut cmd = Command::cargo_bin("keycode-gen").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--output-prefix"))
        .stdout(predicate::str::contains("--caps-file"))
        .stdout(predicate::str::contains("--curses-header"));
}

#[test]
fn generates_files() {
    let temp_dir = setup(CAPS);
    command(&temp_dir).assert().success();
    let source = fs::read_to_string(temp_dir.path().join("keycode.cc")).unwrap();
    assert!(source.contains("const size_t max_code = 262;"));
    assert!(source.contains("\"KEY_UP\","));
    assert!(temp_dir.path().join("keycode.h").exists());
}

#[test]
fn atomic_quiet() {
    let temp_dir = setup(CAPS);
    command(&temp_dir)
        .args(["--atomic", "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
    assert!(temp_dir.path().join("keycode.cc").exists());
}

#[test]
fn bad_line_fails() {
    let temp_dir = setup("key_up kcuu1 ku KEY_UP 0403 ----- up-arrow key\n");
    command(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("key_up kcuu1 ku KEY_UP 0403"));
    assert!(!temp_dir.path().join("keycode.h").exists());
    assert!(!temp_dir.path().join("keycode.cc").exists());
}

#[test]
fn missing_input_fails() {
    let temp_dir = setup(CAPS);
    command(&temp_dir)
        .args(["--curses-header", "missing.h"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read missing.h: "));
    assert!(!temp_dir.path().join("keycode.h").exists());
}

#[test]
fn strict_fails_on_bad_code() {
    let temp_dir = setup(
        "key_up kcuu1 str ku KEY_UP 0903 ----- up-arrow key\n\
         key_down kcud1 str kd KEY_DOWN 0402 ----- down-arrow key\n",
    );
    command(&temp_dir).assert().success();
    command(&temp_dir)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("0903"));
}

#[test]
fn invalid_radix() {
    let temp_dir = setup(CAPS);
    command(&temp_dir)
        .args(["--header-radix", "hex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("octal or decimal"));
}
