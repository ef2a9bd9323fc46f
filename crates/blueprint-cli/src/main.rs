mod cmd;
mod home;
mod output;
mod session;

use clap::{Parser, Subcommand};
use cmd::{
    meta::MetaSubcommand, milestone::MilestoneSubcommand, settings::SettingsSubcommand,
    task::TaskSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "blueprint",
    about = "52-week career blueprint tracker: quarters, blocks, tasks, and progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data directory (default: ~/.blueprint)
    #[arg(long, global = true, env = "BLUEPRINT_HOME")]
    home: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall, quarter, and domain progress with this week's and overdue tasks
    Status,

    /// Show the current week and the date it started
    Week,

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// List and toggle quarter milestones
    Milestone {
        #[command(subcommand)]
        subcommand: MilestoneSubcommand,
    },

    /// Show or change plan settings (start date, theme)
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommand,
    },

    /// Change plan metadata (goal, version, ...)
    Meta {
        #[command(subcommand)]
        subcommand: MetaSubcommand,
    },

    /// Write the whole plan to a JSON file
    Export {
        /// Output file (default: <home>/exports/blueprint-<date>.json; "-" for stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the whole plan with a previously exported JSON file
    Import {
        file: PathBuf,
        /// Confirm overwriting all current data
        #[arg(long)]
        yes: bool,
    },

    /// Discard all progress and restore the original 52-week plan
    Reset {
        /// Confirm discarding all progress, notes, and changes
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = home::resolve_home(cli.home.as_deref()).and_then(|home| match cli.command {
        Commands::Status => cmd::status::run(&home, cli.json),
        Commands::Week => cmd::status::week(&home, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&home, subcommand, cli.json),
        Commands::Milestone { subcommand } => cmd::milestone::run(&home, subcommand, cli.json),
        Commands::Settings { subcommand } => cmd::settings::run(&home, subcommand, cli.json),
        Commands::Meta { subcommand } => cmd::meta::run(&home, subcommand, cli.json),
        Commands::Export { out } => cmd::data::export(&home, out.as_deref(), cli.json),
        Commands::Import { file, yes } => cmd::data::import(&home, &file, yes, cli.json),
        Commands::Reset { yes } => cmd::data::reset(&home, yes, cli.json),
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
