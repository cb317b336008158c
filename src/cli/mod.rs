//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and drives a session against
//! the configured backend: every command that talks to the server first
//! resolves the session (bootstrap), then issues its remote call, and only
//! commits the confirmed result to the session store.

use std::error::Error;
use std::io::{self, IsTerminal, Write};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::transport::HttpTransport;
use crate::core::actions;
use crate::core::bootstrap::bootstrap_session;
use crate::core::config::Config;
use crate::core::session::SessionStore;

#[derive(Parser)]
#[command(name = "fluence")]
#[command(about = "Command-line client for the Fluence chat service")]
#[command(
    long_about = "Fluence is a chat service organized into servers, each holding an \
ordered list of channels. This client resolves your session, keeps a local \
store of the channels it has seen, and only records what the backend has \
confirmed.\n\n\
Configuration:\n\
  fluence set server-url <URL>   Remember the backend to talk to\n\
  FLUENCE_LOG=debug              Enable diagnostic logging on stderr"
)]
pub struct Args {
    /// Backend base URL, overriding the configured one for this invocation
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current session (default)
    Status,
    /// Create an account
    Register { username: String, email: String },
    /// Log in with an email address
    Login { email: String },
    /// Invalidate the current session
    Logout,
    /// Create a channel on a server
    CreateChannel {
        #[arg(value_name = "SERVER_ID")]
        server_id: u64,
        name: String,
    },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Unset a configuration value
    Unset { key: String },
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    init_tracing();

    let mut config = Config::load()?;

    match args.command.take().unwrap_or(Commands::Status) {
        Commands::Set { key, value } => {
            let message = apply_set(&mut config, &key, &value)?;
            config.save()?;
            println!("{message}");
        }
        Commands::Unset { key } => {
            let message = apply_unset(&mut config, &key)?;
            config.save()?;
            println!("{message}");
        }
        Commands::Status => {
            let (_, store) = connect(&args, &config).await?;
            print_status(&store);
        }
        Commands::Register { username, email } => {
            let (transport, _) = connect(&args, &config).await?;
            let password = prompt_password()?;
            let user = actions::register(&transport, &username, &email, &password).await?;
            println!("Account '{}' created. Log in to start chatting.", user.username);
        }
        Commands::Login { email } => {
            let (transport, mut store) = connect(&args, &config).await?;
            let password = prompt_password()?;
            let user = actions::log_in(&transport, &mut store, &email, &password).await?;
            println!("Logged in as {} (id {}).", user.username, user.id);
        }
        Commands::Logout => {
            let (transport, mut store) = connect(&args, &config).await?;
            if store.user().is_none() {
                println!("Not logged in.");
                return Ok(());
            }
            actions::log_out(&transport, &mut store).await?;
            println!("Logged out.");
        }
        Commands::CreateChannel { server_id, name } => {
            let (transport, mut store) = connect(&args, &config).await?;
            let channel =
                actions::create_channel(&transport, &mut store, server_id, &name).await?;
            println!("Created channel #{} (id {}).", channel.name, channel.id);
            let cached = store.channels_for(server_id);
            println!(
                "Channels seen on server {} this session: {}",
                server_id,
                cached
                    .iter()
                    .map(|c| format!("#{}", c.name))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(())
}

/// Build the transport and resolve the session. The store this returns is
/// already settled; nothing downstream ever sees a loading state.
async fn connect(args: &Args, config: &Config) -> Result<(HttpTransport, SessionStore), Box<dyn Error>> {
    let base_url = args.server.as_deref().unwrap_or_else(|| config.server_url());
    let transport = HttpTransport::new(base_url)?;
    let store = bootstrap_session(&transport).await;
    Ok((transport, store))
}

fn print_status(store: &SessionStore) {
    match store.user() {
        Some(user) => println!("Logged in as {} (id {}).", user.username, user.id),
        None => println!("Not logged in."),
    }
}

fn apply_set(config: &mut Config, key: &str, value: &str) -> Result<String, Box<dyn Error>> {
    match key {
        "server-url" => {
            config.server_url = Some(value.trim_end_matches('/').to_string());
            Ok(format!("server-url set to {}", config.server_url()))
        }
        _ => Err(format!("Unknown configuration key: {key} (expected 'server-url')").into()),
    }
}

fn apply_unset(config: &mut Config, key: &str) -> Result<String, Box<dyn Error>> {
    match key {
        "server-url" => {
            config.server_url = None;
            Ok(format!("server-url unset (using {})", config.server_url()))
        }
        _ => Err(format!("Unknown configuration key: {key} (expected 'server-url')").into()),
    }
}

fn prompt_password() -> Result<String, Box<dyn Error>> {
    if !io::stdin().is_terminal() {
        // Piped input: read the password from stdin without a prompt.
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        return Ok(input.trim_end_matches(['\r', '\n']).to_string());
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FLUENCE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
