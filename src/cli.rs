use anyhow::{bail, Result};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub dry_run: bool,
    pub help: bool,
}

/// Parse command-line flags (program name already stripped).
///
/// Supported forms:
///   issue-checker
///   issue-checker --dry-run
///   issue-checker -h | --help
pub fn parse_args(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();
    for arg in args {
        match arg.as_str() {
            "-n" | "--dry-run" => opts.dry_run = true,
            "-h" | "--help" => opts.help = true,
            other => bail!("Unknown argument: {other}\n\nRun `issue-checker --help` for usage."),
        }
    }
    Ok(opts)
}

pub fn print_help() {
    println!("issue-checker — close or reopen a bug report based on its formatting\n");
    println!("USAGE:");
    println!("  issue-checker [--dry-run]");
    println!();
    println!("OPTIONS:");
    println!("  -n, --dry-run  Decide and log the outcome without touching the issue");
    println!("  -h, --help     Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  GITHUB_TOKEN         Token used to authenticate against the API (required)");
    println!("  GITHUB_REPOSITORY    Repository in owner/name form (required)");
    println!("  ISSUE_NUMBER         Number of the issue to check (required)");
    println!("  GITHUB_API_URL       API base URL (default https://api.github.com)");
    println!("  ISSUE_CHECKER_RULES  Optional TOML file overriding the formatting rules");
    println!("  RUST_LOG             Log filter (default info)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_is_a_live_run() {
        assert_eq!(parse_args(&args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn parse_dry_run_flags() {
        assert!(parse_args(&args(&["--dry-run"])).unwrap().dry_run);
        assert!(parse_args(&args(&["-n"])).unwrap().dry_run);
    }

    #[test]
    fn parse_help_alongside_dry_run() {
        let opts = parse_args(&args(&["-n", "--help"])).unwrap();
        assert!(opts.dry_run);
        assert!(opts.help);
    }

    #[test]
    fn unknown_argument_fails() {
        let result = parse_args(&args(&["--close-all"]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("--close-all"));
    }
}
