mod config;
mod error;
mod run;

use clap::Parser;
use config::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run::run(&cli).await {
        Ok(inserted) => println!("{inserted} rows inserted"),
        Err(e) => {
            if let Some(errors) = e.row_errors() {
                run::report(errors, cli.json);
            }
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
