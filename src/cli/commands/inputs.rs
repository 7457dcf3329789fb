//! Handlers for `aocx inputs …`.

use time::OffsetDateTime;

use crate::config::Credentials;
use crate::fetch::{HttpTransport, RateLimitedClient, TransportError};
use crate::paths::{Workspace, atomic_write};
use crate::sync::{SyncOptions, sync_inputs, sync_universe};
use crate::{Error, Result, archive};

pub fn download(force: bool) -> Result<()> {
    let workspace = Workspace::discover()?;
    let credentials = Credentials::new();
    let session = credentials.session()?;

    let transport = HttpTransport::new(session).map_err(transport_setup)?;
    let mut client = RateLimitedClient::new(transport);

    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let universe = sync_universe(now);
    let outcome = sync_inputs(&mut client, &workspace, &universe, SyncOptions { force })?;
    println!(
        "downloaded {} inputs ({} cached, {} not yet available)",
        outcome.fetched, outcome.cached, outcome.unavailable
    );

    // Keep the committable archive in step with the refreshed tree.
    encrypt()
}

pub fn encrypt() -> Result<()> {
    let workspace = Workspace::discover()?;
    let recipient = Credentials::new().recipient()?;

    let bytes = archive::pack_and_encrypt(&workspace.inputs_dir(), &recipient)?;
    atomic_write(&workspace.archive_path(), &bytes)?;
    println!("encrypted inputs to {}", workspace.archive_path().display());
    Ok(())
}

pub fn decrypt() -> Result<()> {
    let workspace = Workspace::discover()?;
    let identity = Credentials::new().identity()?;

    let bytes = archive::read_archive(&workspace.archive_path())?;
    archive::decrypt_and_unpack(&bytes, &identity, &workspace.inputs_dir())?;
    println!("decrypted inputs to {}", workspace.inputs_dir().display());
    Ok(())
}

fn transport_setup(e: TransportError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}
