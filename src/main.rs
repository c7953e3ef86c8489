use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use companion_chat::catalog::{Catalog, PLANS};
use companion_chat::commands::{self, Command, HELP};
use companion_chat::config::AppConfig;
use companion_chat::logging::init_logging;
use companion_chat::reply::{CannedReplies, RemoteReplies, ReplyResolver};
use companion_chat::screens;
use companion_chat::session::{SessionLimits, SessionState};
use companion_chat::store::SessionStore;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/ and companion.* lookups)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Reply endpoint; replies are canned when omitted
        #[arg(short, long)]
        remote: Option<String>,

        /// Override the number of free messages
        #[arg(long)]
        free_messages: Option<u32>,
    },
    /// List the available characters
    Characters,
    /// List the subscription plans
    Plans,
    /// Print the effective configuration as YAML
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| config.get_log_level());
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _guard = init_logging(
        Some(&level),
        log_file.as_deref(),
        config.logging.format == "json",
    )?;

    match cli.command.unwrap_or(Commands::Chat {
        remote: None,
        free_messages: None,
    }) {
        Commands::Chat {
            remote,
            free_messages,
        } => {
            if let Some(endpoint) = remote {
                config.use_remote(&endpoint)?;
            }
            if let Some(quota) = free_messages {
                config.session.free_message_quota = quota;
            }
            run_chat(&config).await?;
        }
        Commands::Characters => {
            for character in Catalog::default().characters() {
                println!(
                    "{:>2}  {}, {} — {}",
                    character.id, character.name, character.age, character.description
                );
            }
        }
        Commands::Plans => {
            for plan in PLANS {
                println!("{:<10} {:>5} ₽  {}", plan.id, plan.price_rub, plan.features.join(", "));
            }
        }
        Commands::ShowConfig => print!("{}", config.to_yaml()?),
    }

    Ok(())
}

fn build_resolver(config: &AppConfig) -> Result<Arc<dyn ReplyResolver>> {
    let resolver: Arc<dyn ReplyResolver> = match (config.reply.mode.as_str(), &config.reply.endpoint) {
        ("remote", Some(endpoint)) => Arc::new(
            RemoteReplies::new(endpoint.clone(), config.reply_timeout())
                .context("Failed to build reply client")?,
        ),
        _ => Arc::new(CannedReplies::new(config.canned_delay())),
    };
    info!(resolver = resolver.name(), "Reply resolver ready");
    Ok(resolver)
}

async fn run_chat(config: &AppConfig) -> Result<()> {
    let limits = SessionLimits {
        free_message_quota: config.session.free_message_quota,
        max_message_length: config.session.max_message_length,
    };
    let state = SessionState::new(Catalog::default(), limits);
    let mut store = SessionStore::new(state, build_resolver(config)?);

    let input = BufReader::new(tokio::io::stdin());
    run_session(&mut store, input, &mut std::io::stdout()).await?;

    info!(metrics = ?store.state().metrics(), "Session ended");
    Ok(())
}

/// Feed input lines to the store and print the current screen after each change
async fn run_session<R, W>(store: &mut SessionStore, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "{}", screens::render(store.state()))?;
    out.flush()?;

    loop {
        let pending = store.state().has_pending_replies();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    // Input closed: let outstanding replies land before exiting
                    if store.state().has_pending_replies() {
                        store.settle().await;
                        write!(out, "{}", screens::render(store.state()))?;
                    }
                    break;
                };
                match commands::parse(&line) {
                    Command::Quit => break,
                    Command::Empty => continue,
                    Command::Help => {
                        writeln!(out, "{HELP}")?;
                        continue;
                    }
                    Command::Invalid(reason) => {
                        writeln!(out, "  ! {reason}")?;
                        continue;
                    }
                    Command::Dispatch(action) => {
                        debug!(?action, "Input");
                        store.dispatch(action);
                    }
                }
            }
            applied = store.next_completion(), if pending => {
                if !applied {
                    continue;
                }
            }
        }
        write!(out, "{}", screens::render(store.state()))?;
        out.flush()?;
    }

    out.flush()?;
    store.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_chat::models::Sender;
    use std::time::Duration;

    fn canned_store() -> SessionStore {
        let state = SessionState::new(Catalog::default(), SessionLimits::default());
        SessionStore::new(state, Arc::new(CannedReplies::new(Duration::from_millis(1200))))
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_waits_for_pending_reply() {
        let mut store = canned_store();
        let script: &[u8] = b"/yes\n/start\nhello there\n";
        let mut out = Vec::new();

        run_session(&mut store, script, &mut out).await.unwrap();

        let senders: Vec<_> = store.state().log().all().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Ai]);
        let reply = &store.state().log().all()[1].text;
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(&format!("Sofia: {reply}")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_cancels_pending_reply() {
        let mut store = canned_store();
        let script: &[u8] = b"/yes\n/start\nhello\n/quit\n";
        let mut out = Vec::new();

        run_session(&mut store, script, &mut out).await.unwrap();

        assert_eq!(store.state().log().len(), 1);
        assert_eq!(store.in_flight(), 0);
    }
}
