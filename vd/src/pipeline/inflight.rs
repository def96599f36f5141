//! Single-slot in-flight token
//!
//! At most one command may be between planning and the end of its dispatch.
//! A cycle takes the token before it starts and drops it when it finishes,
//! successfully or not.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::dispatch::DispatchError;

/// Shared one-permit gate; clones refer to the same slot
#[derive(Debug, Clone)]
pub struct InFlight {
    slot: Arc<Semaphore>,
}

/// Proof of holding the slot; released on drop
#[derive(Debug)]
pub struct InFlightToken {
    _permit: OwnedSemaphorePermit,
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the slot without waiting
    pub fn try_acquire(&self) -> Result<InFlightToken, DispatchError> {
        match Arc::clone(&self.slot).try_acquire_owned() {
            Ok(permit) => {
                debug!("InFlight::try_acquire: acquired");
                Ok(InFlightToken { _permit: permit })
            }
            Err(_) => {
                debug!("InFlight::try_acquire: busy");
                Err(DispatchError::Busy)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }
}
