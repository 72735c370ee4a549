pub mod client;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "calc")]
#[command(about = "Command-line client for the calculator history API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "CALC_SERVER",
        default_value = "http://localhost:3000",
        help = "Base URL of the server"
    )]
    pub server: String,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compute and record a calculation, e.g. calc calculate 6 / 3")]
    Calculate {
        #[arg(allow_negative_numbers = true)]
        num1: f64,
        #[arg(help = "One of + - * /")]
        operation: String,
        #[arg(allow_negative_numbers = true)]
        num2: f64,
        #[arg(long, help = "Device token to notify with the result")]
        device_token: Option<String>,
    },

    #[command(about = "Inspect and edit calculation history")]
    History {
        #[command(subcommand)]
        cmd: HistoryCommands,
    },

    #[command(about = "Show the proceed feature flag")]
    Proceed,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    #[command(about = "List every recorded calculation")]
    List,

    #[command(about = "Recompute a recorded calculation")]
    Update {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        num1: f64,
        operation: String,
        #[arg(allow_negative_numbers = true)]
        num2: f64,
    },

    #[command(about = "Delete one calculation")]
    Delete { id: i64 },

    #[command(about = "Delete all calculations")]
    Clear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.server);

    let body = match cli.command {
        Commands::Calculate { num1, operation, num2, device_token } => {
            client.calculate(num1, &operation, num2, device_token.as_deref()).await?
        }
        Commands::History { cmd } => match cmd {
            HistoryCommands::List => client.history().await?,
            HistoryCommands::Update { id, num1, operation, num2 } => {
                client.update(id, num1, &operation, num2).await?
            }
            HistoryCommands::Delete { id } => client.delete(id).await?,
            HistoryCommands::Clear => client.clear().await?,
        },
        Commands::Proceed => client.check_proceed().await?,
    };

    utils::output_response(&output_format, &body)
}
