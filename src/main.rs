use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sparkpost_mailer::{
    Config,
    email::{EmailMessage, Mailbox, create_transport},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a single message through the configured provider
    Send {
        /// Recipient, either `addr` or `Name <addr>` (repeatable)
        #[arg(short, long, required = true)]
        to: Vec<String>,

        #[arg(short, long)]
        subject: String,

        /// Plain-text body
        #[arg(long, default_value = "")]
        text: String,

        /// HTML body
        #[arg(long, conflicts_with = "html_file")]
        html: Option<String>,

        /// Read the HTML body from a file
        #[arg(long)]
        html_file: Option<PathBuf>,

        /// Reply-to address (repeatable, the first one is used)
        #[arg(long)]
        reply_to: Vec<String>,

        /// Override the configured sender, `addr` or `Name <addr>`
        #[arg(long)]
        from: Option<String>,
    },

    /// Validate the configuration without sending anything
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load_from_file(&cli.config).await?
    } else {
        Config::default()
    };

    // Set up logging first
    let log_level = cli.log_level.as_deref().unwrap_or(&config.app.log_level);
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.config.exists() {
        info!("Configuration loaded from: {:?}", cli.config);
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
    }

    match cli.command {
        Commands::Check => run_checks(&config),
        Commands::Send {
            to,
            subject,
            text,
            html,
            html_file,
            reply_to,
            from,
        } => {
            let html = match (html, html_file) {
                (Some(html), _) => html,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
                (None, None) => String::new(),
            };
            let mut config = config;
            if let Some(from) = from {
                config.email.override_sender(from.parse::<Mailbox>()?);
            }
            let mut reply_to = reply_to;
            if reply_to.is_empty()
                && let Some(default_reply_to) = &config.email.reply_to
            {
                reply_to.push(default_reply_to.clone());
            }

            let message = EmailMessage {
                from: config.email.sender(),
                to: to
                    .iter()
                    .map(|recipient| recipient.parse::<Mailbox>())
                    .collect::<Result<Vec<_>, _>>()?,
                reply_to,
                subject,
                html,
                text,
            };

            send(&config, message).await
        }
    }
}

fn run_checks(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match startup_checks::perform_startup_checks(config) {
        Ok(()) => {
            println!("Configuration OK");
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("Startup check failed: {}", error);
            }
            std::process::exit(1);
        }
    }
}

async fn send(config: &Config, message: EmailMessage) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(errors) = startup_checks::perform_startup_checks(config) {
        for error in &errors {
            tracing::error!("Startup check failed: {}", error);
        }
        return Err(format!("{} configuration problem(s), see log", errors.len()).into());
    }

    let transport = create_transport(&config.email.provider)?;
    info!("Using email provider: {}", transport.name());

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let receipt = transport.send_email_cancellable(&message, &cancel).await?;
    match receipt.id {
        Some(id) => println!(
            "Accepted transmission {} ({} accepted, {} rejected)",
            id, receipt.accepted_recipients, receipt.rejected_recipients
        ),
        None => println!(
            "Accepted ({} recipient(s))",
            receipt.accepted_recipients
        ),
    }

    Ok(())
}
