// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::storage::{QueueResult, StoragePaths, TransactionQueue};

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<TransactionQueue>,
    pub paths: StoragePaths,
}

impl AppState {
    pub fn new(queue: Arc<TransactionQueue>, paths: StoragePaths) -> Self {
        Self { queue, paths }
    }

    /// Open the queue database under `paths`.
    pub fn open(paths: StoragePaths) -> QueueResult<Self> {
        let queue = TransactionQueue::open(&paths.queue_db())?;
        Ok(Self::new(Arc::new(queue), paths))
    }
}
