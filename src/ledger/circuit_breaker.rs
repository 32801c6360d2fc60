//! Circuit Breaker
//!
//! Single paused/running flag gating the balance-affecting operations.
//! Pausing is always allowed; resuming requires the bridge to be paused.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Breaker position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerState {
    #[default]
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CircuitBreaker {
    state: BreakerState,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_paused(paused: bool) -> Self {
        Self {
            state: if paused {
                BreakerState::Paused
            } else {
                BreakerState::Running
            },
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == BreakerState::Paused
    }

    /// Moves to `Paused`. Re-pausing an already paused breaker succeeds.
    pub fn pause(&mut self) {
        self.state = BreakerState::Paused;
    }

    /// Moves `Paused -> Running`; fails with `InvalidBridgeStatus` when running.
    pub fn resume(&mut self) -> BridgeResult<()> {
        if self.state != BreakerState::Paused {
            return Err(BridgeError::InvalidBridgeStatus);
        }
        self.state = BreakerState::Running;
        Ok(())
    }

    /// Forces `Running` without the paused precondition (bridge initialization).
    pub(crate) fn reset(&mut self) {
        self.state = BreakerState::Running;
    }

    /// Guard used by every balance-affecting operation.
    pub fn ensure_running(&self) -> BridgeResult<()> {
        match self.state {
            BreakerState::Running => Ok(()),
            BreakerState::Paused => Err(BridgeError::BridgePaused),
        }
    }
}
