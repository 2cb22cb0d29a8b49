#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for rendering mail client auto-configuration documents

use clap::{Parser, Subcommand};
use mail_autoconfig::{
    ActiveSyncWriter, ClientFamily, JsonSettings, MozillaWriter, OutlookWriter, Request,
    RequestHandler, ResponseWriter, parse_autodiscover_body,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autoconfig-cli")]
#[command(
    about = "Render mail client auto-configuration XML for an email address"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Settings file (default: AUTOCONFIG_SETTINGS or
    /// ./autoconfig.settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the Mozilla autoconfig document
    Autoconfig {
        /// Email address to configure
        email: String,
    },

    /// Render the Outlook Autodiscover document
    Outlook {
        /// Email address to configure
        email: String,
    },

    /// Render the ActiveSync (MobileSync) Autodiscover document
    Activesync {
        /// Email address to configure
        email: String,
    },

    /// Report which client family a request would route to
    Detect {
        /// Inbound request host, e.g. autodiscover.example.com
        host: String,

        /// File containing the request body, for autodiscover hosts
        #[arg(long)]
        body: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = args
        .settings
        .as_ref()
        .map_or_else(JsonSettings::from_env, JsonSettings::new);

    match &args.command {
        Command::Autoconfig { email } => {
            cmd_render(&settings, &MozillaWriter, email)?;
        }
        Command::Outlook { email } => {
            cmd_render(&settings, &OutlookWriter, email)?;
        }
        Command::Activesync { email } => {
            cmd_render(&settings, &ActiveSyncWriter, email)?;
        }
        Command::Detect { host, body } => {
            cmd_detect(host, body.as_deref())?;
        }
    }

    Ok(())
}

fn cmd_render(
    settings: &JsonSettings,
    writer: &dyn ResponseWriter,
    email: &str,
) -> anyhow::Result<()> {
    let mut handler = RequestHandler::new(settings);
    let response = handler.handle(writer, Request::new(email))?;

    eprintln!("Content-Type: {}", response.content_type);
    println!("{}", response.body);
    Ok(())
}

fn cmd_detect(host: &str, body: Option<&std::path::Path>) -> anyhow::Result<()> {
    let body = body.map(std::fs::read_to_string).transpose()?;

    match ClientFamily::detect(host, body.as_deref()) {
        Some(ClientFamily::Autoconfig) => println!("autoconfig (Mozilla-style clients)"),
        Some(ClientFamily::Outlook) => println!("autodiscover (Outlook)"),
        Some(ClientFamily::ActiveSync) => println!("autodiscover (ActiveSync/MobileSync)"),
        None => println!("no client family matches this host"),
    }

    if let Some(body) = &body
        && let Ok(parsed) = parse_autodiscover_body(body)
    {
        println!("requested for: {}", parsed.email);
    }

    Ok(())
}
