use anyhow::Result;
use clap::{Parser, Subcommand};
use openrouter_cli::api::ChatOptions;
use openrouter_cli::app::App;
use openrouter_cli::commands;
use openrouter_cli::config::Config;
use openrouter_cli::terminal;

/// Chat with OpenRouter models from the terminal
#[derive(Parser, Debug)]
#[command(name = "openrouter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the API key and endpoint
    Configure {
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },

    /// List the models offered by the endpoint
    Models {
        /// Print the model list as JSON
        #[arg(long)]
        raw: bool,
    },

    /// Start a chat session with a model
    Run {
        /// Model id, e.g. deepseek/deepseek-r1
        model: String,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Configure { api_key, api_url } => {
            commands::configure(api_key, api_url)?;
        }
        Command::Models { raw } => {
            let config = Config::load()?;
            config.validate()?;
            commands::list_models(&config, raw).await?;
        }
        Command::Run { model, temperature } => {
            let config = Config::load()?;
            config.validate()?;

            terminal::install_panic_hook_once();
            let mut app = App::new(&config, ChatOptions { model, temperature })?;
            app.run().await?;
        }
    }

    Ok(())
}
