// Board registry - Known devices and the active selection
use crate::application::active_board::ActiveBoard;
use crate::application::channel_controller::ChannelController;
use crate::application::history_store::{DeviceDirectory, HistoryStore};
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::domain::board::Board;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct BoardRegistry {
    store: Arc<dyn HistoryStore>,
    controller: Arc<ChannelController>,
    scheduler: Arc<RefreshScheduler>,
    active: ActiveBoard,
    known: watch::Sender<Vec<String>>,
    history_suffix: String,
    store_wait: Duration,
}

impl BoardRegistry {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        controller: Arc<ChannelController>,
        scheduler: Arc<RefreshScheduler>,
        active: ActiveBoard,
        history_suffix: impl Into<String>,
        store_wait: Duration,
    ) -> Self {
        let (known, _rx) = watch::channel(Vec::new());
        Self {
            store,
            controller,
            scheduler,
            active,
            known,
            history_suffix: history_suffix.into(),
            store_wait,
        }
    }

    /// Board ids in the order the directory delivered them
    pub fn boards(&self) -> Vec<String> {
        self.known.borrow().clone()
    }

    /// Sorted ids, as shown in the admin list
    pub fn admin_list(&self) -> Vec<String> {
        let mut ids = self.boards();
        ids.sort();
        ids
    }

    pub fn active(&self) -> Option<Board> {
        self.active.current()
    }

    /// Publish a new device set and pick the first one if nothing is active yet.
    pub async fn on_devices(&self, ids: Vec<String>) {
        let first = ids.first().cloned();
        let changed = self.known.send_if_modified(|known| {
            if *known == ids {
                return false;
            }
            *known = ids;
            true
        });
        if changed {
            tracing::debug!("Device list now has {} boards", self.known.borrow().len());
        }

        if let Some(first) = first {
            if self.active.current().is_none() {
                self.select(&first).await;
            }
        }
    }

    /// Make `id` the active board, reset every channel and force a refresh.
    pub async fn select(&self, id: &str) -> Board {
        let board = Board::new(id, &self.history_suffix);
        tracing::info!("Selected board {} ({})", board.id, board.root);
        self.active.set(board.clone());
        self.controller.reset_all().await;
        self.scheduler.start(true);
        board
    }

    /// Degraded discovery: list the top-level keys of the raw history collection.
    pub async fn discover_fallback(&self) {
        match self.store.list_roots().await {
            Ok(ids) => {
                tracing::info!("Fallback discovery found {} boards", ids.len());
                self.on_devices(ids).await;
            }
            Err(e) => tracing::warn!("Fallback board discovery failed: {:#}", e),
        }
    }

    /// Follow the live device list until it ends. An unreachable directory,
    /// an empty list or a failed update all fall back to discovery; later
    /// updates are still followed.
    pub async fn run(&self, directory: &dyn DeviceDirectory) {
        let mut updates = match tokio::time::timeout(self.store_wait, directory.watch()).await {
            Ok(Ok(updates)) => updates,
            Ok(Err(e)) => {
                tracing::warn!("Device directory unavailable: {:#}", e);
                return self.discover_fallback().await;
            }
            Err(_) => {
                tracing::warn!("Device directory not ready after {:?}", self.store_wait);
                return self.discover_fallback().await;
            }
        };

        while let Some(update) = updates.next().await {
            match update {
                Ok(ids) if !ids.is_empty() => self.on_devices(ids).await,
                Ok(_) => {
                    self.known.send_replace(Vec::new());
                    self.discover_fallback().await;
                }
                Err(e) => {
                    tracing::warn!("Device listener failed: {:#}", e);
                    self.discover_fallback().await;
                }
            }
        }
    }
}
