use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("bookstore")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("migrate"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("bookstore")
        .unwrap()
        .arg("reindex")
        .assert()
        .failure();
}
