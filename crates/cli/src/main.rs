mod config_commands;
mod send_commands;

use std::path::{Path, PathBuf};

use {
    botchoice_auto_reply::BotChoicePlugin,
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "botchoice",
    about = "BotChoice: keyword-triggered chat bot router",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of botchoice.{toml,yaml,json}).
    #[arg(long, global = true, env = "BOTCHOICE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one message and print every reply.
    Send {
        #[arg(short, long)]
        message: String,
        /// Chat ID attached to the inbound message.
        #[arg(long)]
        chat_id: Option<String>,
    },
    /// Print the configured help text.
    Help {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only replies.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "botchoice starting");

    let explicit = cli.config.as_deref();
    match cli.command {
        Some(Commands::Send { message, chat_id }) => {
            let config = botchoice_config::discover_and_load(explicit);
            send_commands::handle_send(config, message, chat_id).await
        },
        Some(Commands::Config { action }) => config_commands::handle_config(action, explicit),
        Some(Commands::Help { verbose }) => print_help(explicit, verbose),
        None => print_help(explicit, false),
    }
}

fn print_help(explicit: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let plugin = BotChoicePlugin::new(botchoice_config::discover_and_load(explicit))?;
    println!("{}", plugin.help_text(verbose));
    Ok(())
}
