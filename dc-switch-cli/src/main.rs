use clap::{Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "dc-switch")]
#[command(author, version, about = "Manage Discord account profiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile management
    #[command(subcommand, alias = "p")]
    Profile(commands::profile::ProfileCommands),

    /// List detected client installations
    Detect {
        /// Output format: json (default is a table)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Restart the client on its login screen to sign into another account
    Login {
        /// Release channel: stable, ptb, or canary (defaults to settings)
        #[arg(short, long)]
        channel: Option<String>,
    },

    /// Capture the signed-in account's credential onto a profile
    Capture {
        /// Profile ID or nickname
        id: String,
    },

    /// Switch the client to a profile's saved account
    #[command(alias = "s")]
    Switch {
        /// Profile ID or nickname (interactive selection if omitted)
        id: Option<String>,
    },

    /// Launcher settings
    #[command(subcommand)]
    Settings(commands::launcher::SettingsCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Profile(cmd)) => commands::profile::handle(cmd),
        Some(Commands::Detect { format }) => commands::launcher::detect(format).await,
        Some(Commands::Login { channel }) => commands::launcher::login(channel).await,
        Some(Commands::Capture { id }) => commands::launcher::capture(id).await,
        Some(Commands::Switch { id }) => commands::launcher::switch(id).await,
        Some(Commands::Settings(cmd)) => commands::launcher::handle_settings(cmd),
        None => commands::launcher::switch(None).await,
    }
}
