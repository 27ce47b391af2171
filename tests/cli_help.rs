//! Integration tests for help and version output

mod common;

use common::*;

#[test]
fn help_lists_all_subcommands() {
    let env = TestEnv::new();

    let result = env.run(&["--help"]);
    assert!(result.success);
    for command in ["deploy", "plan", "doctor"] {
        assert!(
            result.stdout.contains(command),
            "help is missing '{command}':\n{}",
            result.stdout
        );
    }
}

#[test]
fn version_prints_the_crate_version() {
    let env = TestEnv::new();

    let result = env.run(&["--version"]);
    assert!(result.success);
    assert!(result.stdout.contains(env!("CARGO_PKG_VERSION")));
}
