//! Verification of package signatures through external tools.

use std::{fmt::Debug, path::Path, process::Command};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The available types of package verification.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationType {
    /// Verification using `pacman-key --verify`.
    PacmanKey,
}

/// An interface for verifying a package file against a detached signature.
///
/// The invocation details of the verifying tool are opaque to the rest of
/// the system.
pub trait SignatureVerifier: Debug {
    /// Verifies `package` against the detached signature at `signature`.
    ///
    /// Returns `true` if the signature is valid for the package.
    ///
    /// # Errors
    ///
    /// Returns an error if the verifying tool can not be invoked.
    fn verify(&self, package: &Path, signature: &Path) -> Result<bool, Error>;
}

/// A [`SignatureVerifier`] using `pacman-key`.
#[derive(Clone, Debug)]
pub struct PacmanKeyVerifier {
    command: std::path::PathBuf,
}

impl PacmanKeyVerifier {
    /// Creates a new [`PacmanKeyVerifier`].
    ///
    /// # Errors
    ///
    /// Returns an error if the `pacman-key` executable can not be found.
    pub fn new() -> Result<Self, Error> {
        let command = which::which("pacman-key")
            .map_err(|error| Error::Validation(format!("pacman-key is not available: {error}")))?;
        Ok(PacmanKeyVerifier { command })
    }
}

impl SignatureVerifier for PacmanKeyVerifier {
    /// Verifies `package` against `signature` using `pacman-key --verify`.
    fn verify(&self, package: &Path, signature: &Path) -> Result<bool, Error> {
        debug!("Verifying package {package:?} with signature {signature:?} using pacman-key...");
        let status = Command::new(&self.command)
            .arg("--verify")
            .arg(signature)
            .status()
            .map_err(|source| Error::File {
                path: self.command.clone(),
                context: "invoking pacman-key",
                source,
            })?;
        Ok(status.success())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A verifier with a fixed answer, for tests.
    #[derive(Clone, Debug)]
    pub(crate) struct StaticVerifier(pub bool);

    impl SignatureVerifier for StaticVerifier {
        fn verify(&self, _package: &Path, _signature: &Path) -> Result<bool, Error> {
            Ok(self.0)
        }
    }
}
