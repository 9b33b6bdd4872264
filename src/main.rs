use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;

use rollcall::commands::{
    run_general, run_members, run_users, Data, GeneralCommand, MembersCommand, UsersCommand,
};
use rollcall::logging;

/// Membership registry and roster management
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the stored roster, accounts and settings.json
    #[arg(long, env = "DATA_PATH", default_value = "data")]
    data_dir: PathBuf,

    /// Console log level (error, warn, info, debug, trace, off). Captured
    /// activity is always recorded from INFO up.
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: LevelFilter,

    /// Print the last N captured log entries after the command
    #[arg(long, value_name = "N")]
    activity: Option<usize>,

    /// Print captured activity as JSON lines
    #[arg(long, requires = "activity")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    General(GeneralCommand),

    /// Manage staff accounts
    #[command(subcommand)]
    Users(UsersCommand),

    /// View and edit the roster
    #[command(subcommand)]
    Members(MembersCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    // Capture everything at INFO and above, print only what was asked for
    let activity_log = logging::create_activity_log(1000);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::Layer;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_filter(args.log_level),
        )
        .with(
            logging::ActivityCaptureLayer::new(activity_log.clone())
                .with_filter(LevelFilter::INFO),
        )
        .init();

    let data = Data::open(&args.data_dir).await?;

    let outcome = match args.command {
        Command::General(command) => run_general(&data, command).await,
        Command::Users(command) => run_users(&data, command).await,
        Command::Members(command) => run_members(&data, command).await,
    };

    let status = match outcome {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            info!("Command completed");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(anyhow::Error::new(e))
        }
    };

    if let Some(count) = args.activity {
        for entry in activity_log.recent(count) {
            if args.json {
                println!("{}", entry.to_json());
            } else {
                println!("{}", entry.format());
            }
        }
    }

    status
}
