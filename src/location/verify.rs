//! Filesystem verification of recorded size and checksum.

use std::fs;
use std::path::Path;

use crate::checksum::compute_checksum;
use crate::location::{Location, LocationError};

impl Location {
    /// Check that the file at `path` has the recorded size.
    ///
    /// Fails with [`LocationError::SizeMismatch`] carrying expected and
    /// actual values.
    pub fn verify_size(&self, path: &Path) -> Result<(), LocationError> {
        let actual = fs::metadata(path)?.len();
        if actual != self.size {
            return Err(LocationError::SizeMismatch {
                path: path.display().to_string(),
                expected: self.size,
                actual,
            });
        }
        Ok(())
    }

    /// Check that the file at `path` hashes to the recorded checksum, using
    /// the recorded algorithm.
    ///
    /// Fails with [`LocationError::ChecksumMismatch`] carrying expected and
    /// actual values.
    pub fn verify_checksum(&self, path: &Path) -> Result<(), LocationError> {
        let actual = compute_checksum(path, self.checksum.algorithm())?;
        if actual != self.checksum {
            return Err(LocationError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Check size then checksum, short-circuiting on the first failure.
    /// Size goes first because it is the cheaper check.
    pub fn verify(&self, path: &Path) -> Result<(), LocationError> {
        self.verify_size(path)?;
        self.verify_checksum(path)?;
        Ok(())
    }
}
