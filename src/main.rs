use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use daybreak::{Config, Daemon, daemon};

/// Daybreak - morning texts and conversational SMS replies
#[derive(Parser)]
#[command(name = "daybreak", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "DAYBREAK_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server and the job scheduler (default)
    Serve,
    /// Run one configured job now
    Run {
        /// Job name
        job: String,
    },
    /// List configured jobs
    Jobs,
    /// Send a message to every broadcast recipient
    Broadcast {
        /// Message text
        message: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,daybreak=info",
        1 => "info,daybreak=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(
                port = config.server.port,
                jobs = config.jobs.len(),
                "starting daybreak"
            );
            Daemon::new(config).run().await?;
        }
        Command::Run { job } => {
            let job = config.job(&job)?.clone();
            let client = config.http_client()?;
            let runner = daemon::job_runner(&config, &client)?;
            let report = runner
                .run(&job)
                .await
                .with_context(|| format!("job '{}' failed", job.name))?;
            println!("{}: sent {}, failed {}", job.name, report.sent, report.failed);
        }
        Command::Jobs => list_jobs(&config),
        Command::Broadcast { message } => {
            let client = config.http_client()?;
            let channel = daemon::sms_channel(&config, &client)?;
            let report = daybreak::broadcast(channel.as_ref(), &config.broadcast, &message).await?;
            println!(
                "broadcast: sent {}, failed {}, skipped {}",
                report.sent, report.failed, report.skipped
            );
        }
    }

    Ok(())
}

fn list_jobs(config: &Config) {
    if config.jobs.is_empty() {
        println!("No jobs configured.");
        return;
    }

    println!("{:<20} {:<10} {:<8} RECIPIENTS", "NAME", "TEMPLATE", "AT");
    for job in &config.jobs {
        println!(
            "{:<20} {:<10} {:<8} {}",
            job.name,
            job.template.as_str(),
            job.at.as_deref().unwrap_or("-"),
            job.recipients.len()
        );
    }
}
