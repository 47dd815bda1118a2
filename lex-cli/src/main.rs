use clap::Parser;
use lex_cli::{Cli, Commands, Settings, commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    lex_telemetry::init_telemetry("lex")?;

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve { host, port, memory } => {
            commands::serve(&settings, host, port, memory).await
        }
        Commands::Ingest => commands::ingest(&settings).await,
        Commands::Verify => commands::verify(&settings).await,
        Commands::Ask { question, memory } => {
            commands::ask(&settings, &question.join(" "), memory).await
        }
    }
}
