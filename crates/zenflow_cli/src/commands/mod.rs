//! Subcommand definitions and dispatch.
//!
//! Commands that edit studio data run with the autosave worker attached when
//! autosave is enabled and a remote is configured. The worker is cancelled
//! once the command returns, which flushes the edit in a single push.

mod attend;
mod class;
mod member;
mod report;
mod sync;
mod template;

use anyhow::{bail, Result};
use clap::Subcommand;
use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use zenflow_core::sync::transport_from_settings;
use zenflow_core::{KeyValueStore, StudioStore, SyncStatus, SyncStatusBoard, SyncWorker};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage members and their credit.
    #[command(subcommand)]
    Member(member::MemberCommand),
    /// Schedule classes and view rosters.
    #[command(subcommand)]
    Class(class::ClassCommand),
    /// Check members in and out of classes.
    #[command(subcommand)]
    Attend(attend::AttendCommand),
    /// Attendance history, newest first.
    Records {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Reusable class presets.
    #[command(subcommand)]
    Template(template::TemplateCommand),
    /// Today's overview.
    Dashboard,
    /// Show or change sync settings.
    #[command(subcommand)]
    Settings(sync::SettingsCommand),
    /// Back up to and restore from the spreadsheet endpoint.
    #[command(subcommand)]
    Sync(sync::SyncCommand),
    /// Delete all local data and settings.
    Reset {
        /// Confirm the wipe.
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    fn edits_studio_data(&self) -> bool {
        match self {
            Self::Member(command) => command.is_mutating(),
            Self::Class(command) => command.is_mutating(),
            Self::Attend(_) => true,
            Self::Template(command) => command.is_mutating(),
            Self::Records { .. }
            | Self::Dashboard
            | Self::Settings(_)
            | Self::Sync(_)
            | Self::Reset { .. } => false,
        }
    }
}

pub async fn run<S: KeyValueStore>(store: &mut StudioStore<S>, command: Command) -> Result<()> {
    let autosave = if command.edits_studio_data() {
        Autosave::start(store)?
    } else {
        None
    };

    let result = dispatch(store, command).await;

    if let Some(autosave) = autosave {
        autosave.finish().await;
    }
    if let Some(message) = store.last_save_error() {
        eprintln!("warning: changes were not saved to disk: {message}");
    }
    result
}

async fn dispatch<S: KeyValueStore>(store: &mut StudioStore<S>, command: Command) -> Result<()> {
    match command {
        Command::Member(command) => member::run(store, command),
        Command::Class(command) => class::run(store, command),
        Command::Attend(command) => attend::run(store, command),
        Command::Records { limit } => {
            report::records(store, limit);
            Ok(())
        }
        Command::Template(command) => template::run(store, command),
        Command::Dashboard => {
            report::dashboard(store);
            Ok(())
        }
        Command::Settings(command) => sync::run_settings(store, command),
        Command::Sync(command) => sync::run_sync(store, command).await,
        Command::Reset { yes } => {
            if !yes {
                bail!("refusing to wipe data without --yes");
            }
            store.reset()?;
            println!("All local data and settings removed.");
            Ok(())
        }
    }
}

/// Background push attached to one editing command.
struct Autosave {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
    board: SyncStatusBoard,
}

impl Autosave {
    fn start<S: KeyValueStore>(store: &StudioStore<S>) -> Result<Option<Self>> {
        let settings = store.settings()?;
        if !settings.autosave || !settings.is_configured() {
            return Ok(None);
        }
        let (transport, secret) = transport_from_settings(&settings)?;

        let board = SyncStatusBoard::new();
        let shutdown = CancellationToken::new();
        let handle = SyncWorker::new(
            Arc::new(transport),
            secret,
            store.subscribe(),
            board.clone(),
            shutdown.clone(),
        )
        .spawn();
        Ok(Some(Self {
            shutdown,
            handle,
            board,
        }))
    }

    async fn finish(self) {
        self.shutdown.cancel();
        if let Err(err) = self.handle.await {
            eprintln!("warning: autosave worker stopped abnormally: {err}");
            return;
        }
        let report = self.board.current();
        info!(
            "event=autosave module=cli status={} revision={}",
            report.status, report.revision
        );
        match report.status {
            SyncStatus::Success => println!("Synced to remote."),
            SyncStatus::Error => eprintln!(
                "warning: remote backup failed: {}",
                report.message.as_deref().unwrap_or("unknown error")
            ),
            SyncStatus::Idle | SyncStatus::Syncing => {}
        }
    }
}
