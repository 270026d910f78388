//! Integration tests for CLI argument handling
//!
//! Tests the --endpoint flag and endpoint parsing from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mealfeed"))
        .args(args)
        .output()
        .expect("Failed to execute mealfeed")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mealfeed"), "Help should mention mealfeed");
    assert!(
        stdout.contains("endpoint"),
        "Help should mention --endpoint flag"
    );
    assert!(
        stdout.contains("cuisine"),
        "Help should mention --cuisine flag"
    );
}

#[test]
fn test_invalid_endpoint_prints_error_and_exits() {
    let output = run_cli(&["--endpoint", "staging"]);
    assert!(
        !output.status.success(),
        "Expected invalid endpoint to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid endpoint") || stderr.contains("staging"),
        "Should print error message about invalid endpoint: {}",
        stderr
    );
}

#[test]
fn test_endpoint_argument_is_accepted() {
    // With --help, parsing succeeds regardless of other flags; the actual
    // fetch behavior is covered by unit and feed-flow tests.
    let output = run_cli(&["--endpoint", "empty", "--help"]);
    assert!(output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use mealfeed::cli::{parse_endpoint_arg, Cli, StartupConfig};
    use mealfeed::data::Endpoint;

    #[test]
    fn test_cli_no_args_defaults() {
        let cli = Cli::parse_from(["mealfeed"]);
        assert!(cli.endpoint.is_none());
        assert!(cli.cuisine.is_none());
        assert!(!cli.thumbnails);
        assert!(!cli.clear_cache);
    }

    #[test]
    fn test_cli_endpoint_flag_with_value() {
        let cli = Cli::parse_from(["mealfeed", "--endpoint", "malformed"]);
        assert_eq!(cli.endpoint.as_deref(), Some("malformed"));
    }

    #[test]
    fn test_cli_cuisine_flag_with_value() {
        let cli = Cli::parse_from(["mealfeed", "--cuisine", "Malaysian"]);
        assert_eq!(cli.cuisine.as_deref(), Some("Malaysian"));
    }

    #[test]
    fn test_parse_endpoint_arg_primary() {
        let result = parse_endpoint_arg("primary");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Endpoint::Primary);
    }

    #[test]
    fn test_parse_endpoint_arg_unreachable() {
        let result = parse_endpoint_arg("unreachable");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Endpoint::Unreachable);
    }

    #[test]
    fn test_parse_endpoint_arg_invalid_returns_error() {
        let result = parse_endpoint_arg("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_from_cli_defaults_to_primary() {
        let cli = Cli::parse_from(["mealfeed"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        assert_eq!(config.unwrap().endpoint, Endpoint::Primary);
    }

    #[test]
    fn test_startup_config_from_cli_with_endpoint_and_cuisine() {
        let cli = Cli::parse_from(["mealfeed", "--endpoint", "empty", "--cuisine", "Italian"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.endpoint, Endpoint::Empty);
        assert_eq!(config.cuisine.as_deref(), Some("Italian"));
    }

    #[test]
    fn test_startup_config_from_cli_invalid_endpoint() {
        let cli = Cli::parse_from(["mealfeed", "--endpoint", "invalid"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_err());
    }
}
