use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use secrecy::SecretString;
use zenflow_core::sync::{connect, pull_into_store, push_now, transport_from_settings};
use zenflow_core::{KeyValueStore, ReplaceOutcome, StudioStore, SyncStatusBoard};

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    /// Turn background push after edits on or off.
    Autosave { state: Toggle },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Verify an endpoint by pulling from it, then remember it.
    Connect {
        url: String,
        #[arg(long, env = "ZENFLOW_SYNC_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Upload all local data now.
    Push,
    /// Replace local data with the remote copy.
    Pull,
}

pub fn run_settings<S: KeyValueStore>(store: &StudioStore<S>, command: SettingsCommand) -> Result<()> {
    let mut settings = store.settings()?;
    match command {
        SettingsCommand::Show => {
            println!(
                "remote url: {}",
                settings.remote_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "secret:     {}",
                if settings.shared_secret.is_some() { "(set)" } else { "(not set)" }
            );
            println!("autosave:   {}", if settings.autosave { "on" } else { "off" });
        }
        SettingsCommand::Autosave { state } => {
            settings.autosave = matches!(state, Toggle::On);
            store.save_settings(&settings)?;
            println!("Autosave {}.", if settings.autosave { "enabled" } else { "disabled" });
        }
    }
    Ok(())
}

pub async fn run_sync<S: KeyValueStore>(store: &mut StudioStore<S>, command: SyncCommand) -> Result<()> {
    let board = SyncStatusBoard::new();
    match command {
        SyncCommand::Connect { url, secret } => {
            connect(store, &url, SecretString::new(secret), &board)
                .await
                .context("connection failed; settings were not changed")?;
            print_counts("Connected. Pulled", store);
        }
        SyncCommand::Push => {
            let settings = store.settings()?;
            let (transport, secret) = transport_from_settings(&settings)?;
            push_now(store, &transport, &secret, &board).await?;
            print_counts("Pushed", store);
        }
        SyncCommand::Pull => {
            let settings = store.settings()?;
            let (transport, secret) = transport_from_settings(&settings)?;
            match pull_into_store(store, &transport, &secret, &board).await? {
                ReplaceOutcome::Applied { .. } => print_counts("Pulled", store),
                ReplaceOutcome::Stale { .. } => bail!("local data changed during pull; try again"),
            }
        }
    }
    Ok(())
}

fn print_counts<S: KeyValueStore>(prefix: &str, store: &StudioStore<S>) {
    let snapshot = store.snapshot();
    println!(
        "{prefix} {} members, {} classes, {} records, {} templates.",
        snapshot.members.len(),
        snapshot.classes.len(),
        snapshot.records.len(),
        snapshot.templates.len()
    );
}
