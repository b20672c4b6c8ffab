//! Release artifact download with integrity verification.
use std::{
    fs::{self, File},
    io::{self, Read},
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::constants::PARTIAL_DOWNLOAD_SUFFIX;
use crate::error::DeployError;

/// Places a remote file at a local path, verifying its sha256 digest.
pub trait Fetcher {
    /// Downloads `url` to `destination` with permission bits `mode`.
    ///
    /// Fails with [`DeployError::ChecksumMismatch`] or [`DeployError::Transfer`].
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        mode: u32,
        expected_checksum: &str,
    ) -> Result<(), DeployError>;
}

/// Hex-encoded sha256 digest of everything `reader` yields.
pub fn sha256_hex<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fetches artifacts over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeployError> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            DeployError::Transfer {
                url: String::new(),
                destination: PathBuf::new(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self { client })
    }

    /// Wraps a preconfigured client (proxies, TLS roots, timeouts).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn transfer_error(url: &str, destination: &Path, reason: impl ToString) -> DeployError {
        DeployError::Transfer {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Whether `destination` already holds the expected content.
    fn already_installed(destination: &Path, expected_checksum: &str) -> bool {
        let Ok(file) = File::open(destination) else {
            return false;
        };
        match sha256_hex(file) {
            Ok(actual) => actual.eq_ignore_ascii_case(expected_checksum),
            Err(err) => {
                warn!(
                    "Could not hash existing {}: {err}; downloading again",
                    destination.display()
                );
                false
            }
        }
    }

    fn partial_path(destination: &Path) -> PathBuf {
        let mut name = destination
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(PARTIAL_DOWNLOAD_SUFFIX);
        destination.with_file_name(name)
    }

    fn download(&self, url: &str, partial: &Path, destination: &Path) -> Result<(), DeployError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| Self::transfer_error(url, destination, err))?;

        if let Some(parent) = partial.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| Self::transfer_error(url, destination, err))?;
        }
        let mut file =
            File::create(partial).map_err(|err| Self::transfer_error(url, destination, err))?;
        let written = response
            .copy_to(&mut file)
            .map_err(|err| Self::transfer_error(url, destination, err))?;
        file.sync_all()
            .map_err(|err| Self::transfer_error(url, destination, err))?;

        debug!("Downloaded {written} bytes from {url}");
        Ok(())
    }

    fn verify_and_install(
        url: &str,
        partial: &Path,
        destination: &Path,
        mode: u32,
        expected_checksum: &str,
    ) -> Result<(), DeployError> {
        let file =
            File::open(partial).map_err(|err| Self::transfer_error(url, destination, err))?;
        let actual =
            sha256_hex(file).map_err(|err| Self::transfer_error(url, destination, err))?;

        if !actual.eq_ignore_ascii_case(expected_checksum) {
            return Err(DeployError::ChecksumMismatch {
                url: url.to_string(),
                expected: expected_checksum.to_string(),
                actual,
            });
        }

        fs::set_permissions(partial, fs::Permissions::from_mode(mode))
            .map_err(|err| Self::transfer_error(url, destination, err))?;
        fs::rename(partial, destination)
            .map_err(|err| Self::transfer_error(url, destination, err))?;
        Ok(())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        destination: &Path,
        mode: u32,
        expected_checksum: &str,
    ) -> Result<(), DeployError> {
        if Self::already_installed(destination, expected_checksum) {
            info!(
                "{} already matches checksum {expected_checksum}; skipping download",
                destination.display()
            );
            fs::set_permissions(destination, fs::Permissions::from_mode(mode))
                .map_err(|err| Self::transfer_error(url, destination, err))?;
            return Ok(());
        }

        info!("Fetching {url} into {}", destination.display());
        let partial = Self::partial_path(destination);

        let result = self
            .download(url, &partial, destination)
            .and_then(|()| {
                Self::verify_and_install(url, &partial, destination, mode, expected_checksum)
            });

        if result.is_err()
            && partial.exists()
            && let Err(err) = fs::remove_file(&partial)
        {
            warn!("Failed to remove partial download {}: {err}", partial.display());
        }

        result
    }
}
