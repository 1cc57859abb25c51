use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use santi::commands::{email::EmailCommand, serve::serve};
use santi_models::environment::Environment;
use santi_utils::santi_version;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            env!("CARGO_BIN_NAME"),
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let config = santi_config::load();
    init_tracing(
        config
            .as_ref()
            .map(|config| config.environment)
            .unwrap_or_default(),
    );
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!("Failed to load config: {err:#}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Serve => serve(config).await.context("Server failed")?,
        Command::Email { command } => command.invoke(config).await?,
        Command::CheckConfig { verbose } => {
            verbose.then(|| println!("{config:#?}"));
        }
        Command::Completion { .. } => unreachable!(),
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[command(version = santi_version())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the http server serving the website and the contact form
    #[command(aliases(["run", "start", "r", "s"]))]
    Serve,
    /// Test email deliverability
    #[command(aliases(["e"]))]
    Email {
        #[command(subcommand)]
        command: EmailCommand,
    },
    /// Validate configuration
    CheckConfig {
        /// Print a debug representation of the config
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match environment {
            Environment::Production => "info",
            Environment::Development => "debug",
        })
    });

    let (json_layer, fmt_layer) = if environment.is_production() {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr);
        (Some(json_layer), None)
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        #[cfg(tracing_pretty)]
        let fmt_layer = fmt_layer.pretty();

        (None, Some(fmt_layer))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(fmt_layer)
        .init();
}
