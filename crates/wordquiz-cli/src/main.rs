//! wordquiz CLI — sign in, take multiple-choice vocabulary quizzes, check the score.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "wordquiz",
    version,
    about = "Multiple-choice vocabulary quiz client"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter wordquiz.toml
    Init,

    /// Sign in and store the session token
    Login {
        /// Account name
        username: String,

        /// Account password
        #[arg(long, env = "WORDQUIZ_PASSWORD", hide_env_values = true)]
        password: String,

        /// Sign in again even if a token is already stored
        #[arg(long)]
        force: bool,
    },

    /// Create a new account
    Register {
        /// Account name
        username: String,

        /// Account password
        #[arg(long, env = "WORDQUIZ_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show where a route resolves for the current session
    Navigate {
        /// Route path, e.g. /multiple-choice
        path: String,
    },

    /// Show the signed-in user's score
    Score,

    /// Take a multiple-choice quiz
    Quiz {
        /// Stop after this many answered questions
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_questions: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Login {
            username,
            password,
            force,
        } => commands::login::execute(config, username, password, force).await,
        Commands::Register { username, password } => {
            commands::register::execute(config, username, password).await
        }
        Commands::Logout => commands::logout::execute(config),
        Commands::Navigate { path } => commands::navigate::execute(config, path),
        Commands::Score => commands::score::execute(config).await,
        Commands::Quiz { max_questions } => commands::quiz::execute(config, max_questions).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
