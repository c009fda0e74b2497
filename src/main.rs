use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

use aggregit::analysis::{find_branch, CommitWalker, WalkOptions, WalkStyle};
use aggregit::{Config, GitHubApi, GitHubClient, PrState, ReportConfig, ReportPipeline};

#[derive(Parser, Debug)]
#[command(name = "aggregit")]
#[command(version = "0.1.0")]
#[command(about = "Aggregate pull request activity for GitHub users across repositories")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the pull request CSV report
    Report {
        /// Output file (defaults to AGGREGIT_PR_CSV_PATH)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pull request state: open, closed or all
        #[arg(short, long)]
        state: Option<PrState>,
    },

    /// Print PR, commit and line totals per configured user
    Totals,

    /// Walk a branch's commit history from its head
    Walk {
        /// Repository as owner/name
        repo: String,

        /// Branch to start from (defaults to the first branch listed)
        #[arg(short, long)]
        branch: Option<String>,

        /// One line per commit instead of full details
        #[arg(long)]
        short: bool,

        /// Visit each commit once even when reachable along several paths
        #[arg(long)]
        dedupe: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("aggregit=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    if let Err(err) = run(args.command).await {
        if err.is_fatal() {
            tracing::error!("Aborting, fix the settings and rerun: {}", err);
        } else {
            tracing::error!("Run failed. {}: {}", err.kind(), err);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command) -> aggregit::Result<()> {
    let config = Config::from_env()?;
    let github = GitHubClient::new(&config.github_token)?;

    match command {
        Command::Report { output, state } => {
            let report = ReportConfig::from_env()?;
            let mut pipeline =
                ReportPipeline::new(&github, &report).with_progress(io::stderr().is_terminal());
            if let Some(state) = state {
                let mut settings = pipeline.settings().clone();
                settings.pr_state = state;
                pipeline = pipeline.with_settings(settings);
            }

            let output = output.unwrap_or_else(|| report.pr_csv_path.clone());
            let summary = pipeline.run(&output).await?;

            println!();
            println!(
                "Wrote {} rows to {}",
                summary.rows_written,
                summary.path.display()
            );
            if !summary.failures.is_empty() {
                println!("Skipped {} pull requests:", summary.failures.len());
                for failure in &summary.failures {
                    println!("  {}#{}: {}", failure.repo, failure.number, failure);
                }
            }
        }
        Command::Totals => {
            let report = ReportConfig::from_env()?;
            let totals = ReportPipeline::new(&github, &report).totals().await?;
            println!();
            println!("Totals for configured repos");
            for user in totals {
                println!("{}", user);
            }
        }
        Command::Walk {
            repo,
            branch,
            short,
            dedupe,
        } => {
            let repository = github.get_repo(&repo).await?;
            let branch = find_branch(&github, &repository, branch.as_deref()).await?;
            println!("Branch: {}", branch.name);

            let options = WalkOptions {
                style: if short { WalkStyle::Short } else { WalkStyle::Detailed },
                delay: Duration::from_millis(config.walk_delay_ms),
                dedupe,
            };
            let mut walker = CommitWalker::new(&github, &repository, io::stdout().lock(), options);
            walker.walk(&branch.commit.sha).await?;
        }
    }

    Ok(())
}
