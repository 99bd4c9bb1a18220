use anyhow::{Result, anyhow};
use log::{debug, info};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
}

/// Outcome of checking the session before rendering a dashboard view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Render(Session),
    RedirectToAuth,
}

/// Holds the signed-in session. Created once at startup and handed to
/// whatever needs it.
#[derive(Debug)]
pub struct SessionContext {
    tx: watch::Sender<Option<Session>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn sign_in(&self, session: Session) {
        info!("Signed in as {}", session.user_id);
        self.tx.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("Signed out");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn require(&self) -> Result<Session> {
        self.current().ok_or_else(|| anyhow!("not signed in"))
    }

    pub fn gate(&self) -> Gate {
        match self.current() {
            Some(session) => Gate::Render(session),
            None => Gate::RedirectToAuth,
        }
    }

    /// Dropping the returned subscription unsubscribes.
    pub fn subscribe(&self) -> SessionSubscription {
        debug!("New session subscriber");
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

pub struct SessionSubscription {
    rx: watch::Receiver<Option<Session>>,
}

impl SessionSubscription {
    /// Waits for the next sign-in or sign-out and returns the new state.
    pub async fn changed(&mut self) -> Result<Option<Session>> {
        self.rx
            .changed()
            .await
            .map_err(|_| anyhow!("session context was dropped"))?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
