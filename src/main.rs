mod checks;
mod cli;
mod config;
mod model;
mod tracker;
mod validator;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tracker::github::GitHubTracker;
use validator::Validator;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = cli::parse_args(&args)?;
    if opts.help {
        cli::print_help();
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let env = config::EnvConfig::from_env()?;
    let rules = config::load_rules()?;
    let validator = Validator::new(rules)?;
    let tracker = GitHubTracker::new(&env);

    tracing::info!(
        repo = %format!("{}/{}", env.owner, env.repo),
        issue = env.issue_number,
        dry_run = opts.dry_run,
        "checking issue"
    );

    validator::run(&tracker, &validator, env.issue_number, opts.dry_run).await?;
    Ok(())
}
