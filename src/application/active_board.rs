// Shared handle on the currently selected board
use crate::domain::board::Board;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Clone)]
pub struct ActiveBoard {
    tx: Arc<watch::Sender<Option<Board>>>,
}

impl Default for ActiveBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<Board> {
        self.tx.borrow().clone()
    }

    pub fn set(&self, board: Board) {
        self.tx.send_replace(Some(board));
    }

    /// Wait until a board is selected, giving up after `limit`.
    pub async fn wait(&self, limit: Duration) -> Option<Board> {
        let mut rx = self.tx.subscribe();
        let waited = tokio::time::timeout(limit, rx.wait_for(Option::is_some)).await;
        match waited {
            Ok(Ok(board)) => board.clone(),
            _ => {
                tracing::warn!("No board selected after {:?}", limit);
                None
            }
        }
    }
}
