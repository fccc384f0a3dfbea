// Admin service - Authenticated board provisioning
use crate::application::board_registry::BoardRegistry;
use crate::application::error::EngineError;
use crate::domain::board::Board;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves once the auth state has settled, with the signed-in user if any
    async fn settled_user(&self) -> Option<User>;
}

/// Outcome of checking a PIN against the one issued to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCheck {
    Accepted,
    NotIssued,
    AlreadyUsed,
    Expired,
    Mismatch,
}

#[async_trait]
pub trait PinVerifier: Send + Sync {
    async fn issue(&self, user: &User) -> anyhow::Result<()>;

    /// Check `pin` and consume it when accepted
    async fn verify(&self, user: &User, pin: &str) -> anyhow::Result<PinCheck>;
}

#[async_trait]
pub trait BoardProvisioner: Send + Sync {
    async fn register(&self, board_id: &str) -> anyhow::Result<()>;

    async fn remove(&self, board_id: &str) -> anyhow::Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid board id: {0:?}")]
    InvalidBoardId(String),
    #[error("PIN must be six digits")]
    InvalidPin,
    #[error("PIN rejected: {0:?}")]
    PinRejected(PinCheck),
    #[error("provisioning failed: {0:#}")]
    Provisioning(anyhow::Error),
}

pub struct AdminService {
    auth: Arc<dyn AuthProvider>,
    pins: Arc<dyn PinVerifier>,
    provisioner: Arc<dyn BoardProvisioner>,
    registry: Arc<BoardRegistry>,
}

impl AdminService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        pins: Arc<dyn PinVerifier>,
        provisioner: Arc<dyn BoardProvisioner>,
        registry: Arc<BoardRegistry>,
    ) -> Self {
        Self {
            auth,
            pins,
            provisioner,
            registry,
        }
    }

    async fn require_user(&self) -> Result<User, AdminError> {
        self.auth
            .settled_user()
            .await
            .ok_or(AdminError::Engine(EngineError::NotAuthenticated))
    }

    pub async fn issue_pin(&self) -> Result<(), AdminError> {
        let user = self.require_user().await?;
        self.pins
            .issue(&user)
            .await
            .map_err(AdminError::Provisioning)?;
        tracing::info!("PIN issued for {}", user.uid);
        Ok(())
    }

    /// Register a new board once its PIN checks out, then make it active.
    pub async fn add_board(&self, board_id: &str, pin: &str) -> Result<Board, AdminError> {
        let board_id = board_id.trim();
        if !Board::is_valid_id(board_id) {
            return Err(AdminError::InvalidBoardId(board_id.to_string()));
        }
        if pin.len() != 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(AdminError::InvalidPin);
        }

        let user = self.require_user().await?;
        match self
            .pins
            .verify(&user, pin)
            .await
            .map_err(AdminError::Provisioning)?
        {
            PinCheck::Accepted => {}
            rejected => return Err(AdminError::PinRejected(rejected)),
        }

        self.provisioner
            .register(board_id)
            .await
            .map_err(AdminError::Provisioning)?;
        tracing::info!("Board {} registered by {}", board_id, user.uid);
        Ok(self.registry.select(board_id).await)
    }

    pub async fn remove_board(&self, board_id: &str) -> Result<(), AdminError> {
        self.require_user().await?;
        self.provisioner
            .remove(board_id)
            .await
            .map_err(AdminError::Provisioning)
    }
}
