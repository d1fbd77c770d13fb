pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "mathgenius")]
#[command(about = "MathGenius CLI - administration for the curriculum API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the document tables and indexes")]
    Migrate,

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, env = "ADMIN_PASSWORD", help = "Password (or ADMIN_PASSWORD)")]
        password: String,
        #[arg(long, help = "Year of birth")]
        year_of_birth: i64,
        #[arg(long, help = "Mark the account as male")]
        male: bool,
    },

    #[command(about = "Grant admin rights to an existing account")]
    Promote {
        #[arg(long, help = "Email of the account to promote")]
        email: String,
    },

    #[command(about = "Check a running server through its /health endpoint")]
    Status {
        #[arg(long, default_value = "http://localhost:5000", help = "Server base URL")]
        url: String,
    },
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

    match cli.command {
        Commands::Migrate => commands::store::migrate(output_format).await,
        Commands::CreateAdmin {
            email,
            name,
            password,
            year_of_birth,
            male,
        } => {
            let account = commands::admin::NewAdmin {
                email,
                name,
                password,
                year_of_birth,
                is_male: male,
            };
            commands::admin::create(account, output_format).await
        }
        Commands::Promote { email } => commands::admin::promote(&email, output_format).await,
        Commands::Status { url } => commands::status::check(&url, output_format).await,
    }
}
