//! Launch flow controller: `idle → launching → room_created | error`, and
//! `error → idle` on reset.

use std::{sync::Arc, time::Duration};

use shared::{
    domain::{LaunchAttemptId, LaunchResult, SessionDraft},
    error::LaunchError,
    protocol::StartBotRequest,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::transport::BotLaunchTransport;

/// Deadline for the bot launch service to answer one launch.
pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    Idle,
    Launching,
    RoomCreated,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Launching {
        attempt: LaunchAttemptId,
    },
    RoomCreated {
        attempt: LaunchAttemptId,
        room_url: String,
        token: Option<String>,
    },
    Error {
        attempt: LaunchAttemptId,
        error: LaunchError,
    },
}

impl LaunchState {
    pub fn phase(&self) -> LaunchPhase {
        match self {
            Self::Idle => LaunchPhase::Idle,
            Self::Launching { .. } => LaunchPhase::Launching,
            Self::RoomCreated { .. } => LaunchPhase::RoomCreated,
            Self::Error { .. } => LaunchPhase::Error,
        }
    }

    /// The settled outcome, if the current attempt has one.
    pub fn result(&self) -> Option<LaunchResult> {
        match self {
            Self::Idle | Self::Launching { .. } => None,
            Self::RoomCreated {
                room_url, token, ..
            } => Some(LaunchResult::Room {
                room_url: room_url.clone(),
                token: token.clone(),
            }),
            Self::Error { error, .. } => Some(LaunchResult::Failure {
                kind: error.kind(),
                message: error.user_message(),
            }),
        }
    }

    pub fn attempt(&self) -> Option<LaunchAttemptId> {
        match self {
            Self::Idle => None,
            Self::Launching { attempt }
            | Self::RoomCreated { attempt, .. }
            | Self::Error { attempt, .. } => Some(*attempt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    StateChanged(LaunchState),
}

/// What a call to [`LaunchController::launch`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchAttempt {
    /// The controller was not idle; no request was issued.
    Ignored { phase: LaunchPhase },
    /// A request was issued and settled into this state.
    Finished(LaunchState),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("session draft is frozen while a launch is in flight")]
    DraftFrozen,
}

struct ControllerState {
    state: LaunchState,
    draft: SessionDraft,
}

pub struct LaunchController {
    transport: Arc<dyn BotLaunchTransport>,
    timeout: Duration,
    inner: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<LaunchEvent>,
}

impl LaunchController {
    pub fn new(transport: Arc<dyn BotLaunchTransport>) -> Arc<Self> {
        Self::new_with_options(transport, SessionDraft::default(), LAUNCH_TIMEOUT)
    }

    pub fn new_with_options(
        transport: Arc<dyn BotLaunchTransport>,
        draft: SessionDraft,
        timeout: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            transport,
            timeout,
            inner: Arc::new(Mutex::new(ControllerState {
                state: LaunchState::Idle,
                draft,
            })),
            events,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn state(&self) -> LaunchState {
        self.inner.lock().await.state.clone()
    }

    pub async fn draft(&self) -> SessionDraft {
        self.inner.lock().await.draft.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LaunchEvent> {
        self.events.subscribe()
    }

    pub async fn set_draft(&self, draft: SessionDraft) -> Result<(), ControllerError> {
        let mut guard = self.inner.lock().await;
        if guard.state.phase() == LaunchPhase::Launching {
            return Err(ControllerError::DraftFrozen);
        }
        guard.draft = draft;
        Ok(())
    }

    /// Issues one launch request for `draft` if the controller is idle.
    ///
    /// Any other phase makes this a no-op, so repeated submits never put a
    /// second request in flight. The request runs on a task owned by the
    /// controller: dropping the returned future does not cancel it, and the
    /// attempt still settles into `room_created` or `error`.
    pub async fn launch(&self, draft: SessionDraft) -> LaunchAttempt {
        let (attempt, request) = {
            let mut guard = self.inner.lock().await;
            let phase = guard.state.phase();
            if phase != LaunchPhase::Idle {
                debug!(?phase, "launch ignored: controller is not idle");
                return LaunchAttempt::Ignored { phase };
            }

            let attempt = LaunchAttemptId::new();
            guard.draft = draft;
            let request = StartBotRequest::from(&guard.draft);
            transition(&self.events, &mut guard, LaunchState::Launching { attempt });
            (attempt, request)
        };

        info!(
            %attempt,
            name = request.name.as_deref().unwrap_or_default(),
            sprite_folder = request.sprite_folder.as_deref().unwrap_or_default(),
            "launching bot"
        );

        let worker = tokio::spawn(run_attempt(
            self.transport.clone(),
            self.timeout,
            attempt,
            request,
            self.inner.clone(),
            self.events.clone(),
        ));

        match worker.await {
            Ok(settled) => LaunchAttempt::Finished(settled),
            Err(join_err) => {
                let error = LaunchError::Network(format!("launch task failed: {join_err}"));
                warn!(%attempt, %error, "bot launch task died");
                let settled = LaunchState::Error { attempt, error };
                let mut guard = self.inner.lock().await;
                if guard.state.attempt() == Some(attempt)
                    && guard.state.phase() == LaunchPhase::Launching
                {
                    transition(&self.events, &mut guard, settled.clone());
                }
                LaunchAttempt::Finished(guard.state.clone())
            }
        }
    }

    /// Returns to idle from `error`, dropping the failed result. Returns
    /// `false` without changing anything from any other phase.
    pub async fn reset(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.state.phase() != LaunchPhase::Error {
            debug!(phase = ?guard.state.phase(), "reset ignored: controller is not in error");
            return false;
        }
        transition(&self.events, &mut guard, LaunchState::Idle);
        true
    }
}

async fn run_attempt(
    transport: Arc<dyn BotLaunchTransport>,
    timeout: Duration,
    attempt: LaunchAttemptId,
    request: StartBotRequest,
    inner: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<LaunchEvent>,
) -> LaunchState {
    let next = match tokio::time::timeout(timeout, transport.start_bot(&request)).await {
        Ok(Ok(response)) => {
            info!(%attempt, room_url = %response.room_url, "bot room created");
            LaunchState::RoomCreated {
                attempt,
                room_url: response.room_url,
                token: response.token,
            }
        }
        Ok(Err(error)) => {
            warn!(%attempt, kind = ?error.kind(), %error, "bot launch failed");
            LaunchState::Error { attempt, error }
        }
        Err(_) => {
            let error = LaunchError::Timeout { after: timeout };
            warn!(%attempt, %error, "bot launch abandoned");
            LaunchState::Error { attempt, error }
        }
    };

    let mut guard = inner.lock().await;
    transition(&events, &mut guard, next.clone());
    next
}

fn transition(
    events: &broadcast::Sender<LaunchEvent>,
    guard: &mut ControllerState,
    next: LaunchState,
) {
    debug!(from = ?guard.state.phase(), to = ?next.phase(), "launch state transition");
    guard.state = next.clone();
    let _ = events.send(LaunchEvent::StateChanged(next));
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
