pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trainers")]
#[command(about = "Administration CLI for the pokemon trainers app")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the users, pokedex and pokemon tables if missing")]
    InitSchema,

    #[command(about = "Create a user with a bcrypt-hashed password")]
    CreateUser {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Password")]
        password: String,
        #[arg(long, help = "Grant manager level")]
        manager: bool,
    },

    #[command(about = "Replace a user's password")]
    ResetPassword {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "New password")]
        password: String,
    },

    #[command(about = "Print a bcrypt hash for a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy)]
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
    let config = crate::config::config();

    match cli.command {
        Commands::InitSchema => commands::schema::init(config, output_format).await,
        Commands::CreateUser { username, password, manager } => {
            commands::user::create(&username, &password, manager, config, output_format).await
        }
        Commands::ResetPassword { username, password } => {
            commands::user::reset_password(&username, &password, config, output_format).await
        }
        Commands::HashPassword { password } => {
            commands::user::hash(&password, config, output_format).await
        }
    }
}
