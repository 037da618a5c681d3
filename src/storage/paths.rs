// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the local data directory.

use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory.
pub const DATA_ROOT: &str = "./data";

/// File name of the transaction queue database.
pub const QUEUE_DB_FILE: &str = "queue.redb";

/// Storage path utilities for the local data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all local data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the transaction queue database.
    pub fn queue_db(&self) -> PathBuf {
        self.root.join(QUEUE_DB_FILE)
    }

    /// Whether the root directory exists.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}
