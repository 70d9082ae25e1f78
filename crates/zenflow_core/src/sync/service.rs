//! Foreground sync operations: connect, pull and manual push.

use super::http::HttpSyncTransport;
use super::status::{SyncStatus, SyncStatusBoard};
use super::transport::SyncTransport;
use super::SyncError;
use crate::repo::kv_store::KeyValueStore;
use crate::repo::settings::SyncSettings;
use crate::store::{ReplaceOutcome, StudioStore};
use log::info;
use secrecy::{ExposeSecret, SecretString};

/// Builds the HTTP transport from stored settings.
pub fn transport_from_settings(
    settings: &SyncSettings,
) -> Result<(HttpSyncTransport, SecretString), SyncError> {
    let url = settings
        .remote_url
        .as_deref()
        .ok_or(SyncError::MissingRemoteUrl)?;
    let secret = settings
        .shared_secret
        .clone()
        .ok_or(SyncError::MissingSecret)?;
    Ok((HttpSyncTransport::new(url)?, secret))
}

/// Pulls the remote snapshot and installs it unless local edits landed meanwhile.
pub async fn pull_into_store<S, T>(
    store: &mut StudioStore<S>,
    transport: &T,
    secret: &SecretString,
    board: &SyncStatusBoard,
) -> Result<ReplaceOutcome, SyncError>
where
    S: KeyValueStore,
    T: SyncTransport + ?Sized,
{
    let started_revision = store.revision();
    board.publish(started_revision, SyncStatus::Syncing, None);

    let snapshot = match transport.pull(secret).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            board.publish(started_revision, SyncStatus::Error, Some(err.to_string()));
            return Err(err.into());
        }
    };

    let outcome = store.replace_snapshot_if_current(started_revision, snapshot);
    match outcome {
        ReplaceOutcome::Applied { revision } => {
            board.publish(revision, SyncStatus::Success, None);
        }
        ReplaceOutcome::Stale { current, .. } => {
            board.publish(
                current,
                SyncStatus::Error,
                Some("local changes landed during pull".to_string()),
            );
        }
    }
    Ok(outcome)
}

/// Pushes the current snapshot immediately, bypassing the debounce.
pub async fn push_now<S, T>(
    store: &StudioStore<S>,
    transport: &T,
    secret: &SecretString,
    board: &SyncStatusBoard,
) -> Result<(), SyncError>
where
    S: KeyValueStore,
    T: SyncTransport + ?Sized,
{
    let revision = store.revision();
    board.publish(revision, SyncStatus::Syncing, None);
    match transport.push(secret, store.snapshot()).await {
        Ok(()) => {
            board.publish(revision, SyncStatus::Success, None);
            Ok(())
        }
        Err(err) => {
            board.publish(revision, SyncStatus::Error, Some(err.to_string()));
            Err(err.into())
        }
    }
}

/// Validates the endpoint, pulls from it and only then stores the settings.
///
/// A failed pull leaves both the settings and the local data untouched.
pub async fn connect<S: KeyValueStore>(
    store: &mut StudioStore<S>,
    url: &str,
    secret: SecretString,
    board: &SyncStatusBoard,
) -> Result<ReplaceOutcome, SyncError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(SyncError::MissingRemoteUrl);
    }
    if secret.expose_secret().trim().is_empty() {
        return Err(SyncError::MissingSecret);
    }

    let transport = HttpSyncTransport::new(url)?;
    let outcome = pull_into_store(store, &transport, &secret, board).await?;

    let mut settings = store.settings()?;
    settings.remote_url = Some(url.to_string());
    settings.shared_secret = Some(secret);
    store.save_settings(&settings)?;

    info!("event=sync_connect module=sync status=ok outcome={outcome:?}");
    Ok(outcome)
}
