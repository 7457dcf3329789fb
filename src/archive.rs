//! The encrypted inputs archive (`inputs.tar.gz.age`).
//!
//! Pack: deterministic tar of the inputs tree, gzip, age-encrypt to one
//! x25519 recipient. Unpack is the exact inverse. The archive is the
//! durable, committable form of the corpus; the decrypted tree is a
//! regenerable cache.
//!
//! Determinism: entries are appended in sorted relative-path order with
//! normalized metadata (mtime 0, fixed mode), so packing an unchanged
//! tree produces identical ciphertext input. Permissions and timestamps
//! are not contract-relevant and are not preserved.

use std::fs;
use std::io::{self, Read, Write};
use std::iter;
use std::path::{Component, Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

/// Errors from packing, unpacking, or locating the archive.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("inputs directory not found: {0}")]
    SourceTreeMissing(PathBuf),

    #[error("archive not found: {0}")]
    ArchiveMissing(PathBuf),

    #[error("decryption failed: wrong identity or corrupt archive")]
    DecryptionFailed,

    #[error("archive entry `{0}` escapes the destination root")]
    PathEscape(PathBuf),

    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("archive I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Tar the tree rooted at `source_tree`, compress, and encrypt for
/// exactly one recipient.
pub fn pack_and_encrypt(
    source_tree: &Path,
    recipient: &age::x25519::Recipient,
) -> Result<Vec<u8>, ArchiveError> {
    let compressed = pack_tree(source_tree)?;
    encrypt(&compressed, recipient)
}

/// Deterministic tar+gzip of the tree. Split out so determinism is
/// testable below the (ephemeral-keyed, non-deterministic) age layer.
fn pack_tree(source_tree: &Path) -> Result<Vec<u8>, ArchiveError> {
    if !source_tree.is_dir() {
        return Err(ArchiveError::SourceTreeMissing(source_tree.to_path_buf()));
    }

    let files = collect_files(source_tree)?;
    tracing::debug!(files = files.len(), "packing inputs tree");

    let mut tar = tar::Builder::new(Vec::new());
    for relative in &files {
        let data = fs::read(source_tree.join(relative))?;
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        tar.append_data(&mut header, relative, data.as_slice())?;
    }
    let tar_bytes = tar.into_inner()?;

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(&tar_bytes)?;
    Ok(gz.finish()?)
}

/// Decrypt, decompress, and extract under `destination_root`,
/// reconstructing the relative-path layout used at pack time.
pub fn decrypt_and_unpack(
    archive_bytes: &[u8],
    identity: &age::x25519::Identity,
    destination_root: &Path,
) -> Result<(), ArchiveError> {
    let compressed = decrypt(archive_bytes, identity)?;

    let mut tar_bytes = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut tar_bytes)?;

    let mut tar = tar::Archive::new(tar_bytes.as_slice());
    for entry in tar.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type() != tar::EntryType::Regular {
            continue;
        }
        let relative = entry.path()?.into_owned();
        let destination = safe_join(destination_root, &relative)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        fs::write(&destination, contents)?;
    }
    Ok(())
}

/// Read the archive file, distinguishing absence from corruption.
pub fn read_archive(path: &Path) -> Result<Vec<u8>, ArchiveError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ArchiveError::ArchiveMissing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

fn encrypt(plaintext: &[u8], recipient: &age::x25519::Recipient) -> Result<Vec<u8>, ArchiveError> {
    let encryptor = age::Encryptor::with_recipients(vec![Box::new(recipient.clone())])
        .expect("recipient list is non-empty");
    let mut ciphertext = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut ciphertext)
        .map_err(|e| ArchiveError::Encrypt(e.to_string()))?;
    writer.write_all(plaintext)?;
    writer.finish()?;
    Ok(ciphertext)
}

fn decrypt(ciphertext: &[u8], identity: &age::x25519::Identity) -> Result<Vec<u8>, ArchiveError> {
    let decryptor = match age::Decryptor::new(ciphertext) {
        Ok(age::Decryptor::Recipients(d)) => d,
        Ok(age::Decryptor::Passphrase(_)) | Err(_) => return Err(ArchiveError::DecryptionFailed),
    };
    let mut reader = decryptor
        .decrypt(iter::once(identity as &dyn age::Identity))
        .map_err(|_| ArchiveError::DecryptionFailed)?;
    let mut plaintext = Vec::new();
    reader
        .read_to_end(&mut plaintext)
        .map_err(|_| ArchiveError::DecryptionFailed)?;
    Ok(plaintext)
}

/// Relative file paths under `root`, sorted for stable enumeration.
fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                stack.push(path);
            } else {
                let relative = path
                    .strip_prefix(root)
                    .expect("walked path is under root")
                    .to_path_buf();
                files.push(relative);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Join an archive entry path onto the root, rejecting anything that
/// would resolve outside it (absolute paths, `..` components).
fn safe_join(root: &Path, relative: &Path) -> Result<PathBuf, ArchiveError> {
    let mut joined = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            _ => return Err(ArchiveError::PathEscape(relative.to_path_buf())),
        }
    }
    Ok(joined)
}
