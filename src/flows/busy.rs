use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};

/// Marks a mutating action as in flight so the triggering control can be
/// disabled. Cloning shares the flag.
#[derive(Debug, Clone)]
pub struct BusyFlag {
    action: &'static str,
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Set the flag, or fail with [`Error::Busy`] if it is already set.
    /// The flag clears when the guard drops, whether the action succeeded,
    /// failed or was cancelled.
    pub fn acquire(&self) -> Result<BusyGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy(self.action));
        }
        debug!("{} started", self.action);
        Ok(BusyGuard { flag: self.clone() })
    }
}

#[must_use = "the busy flag clears as soon as the guard is dropped"]
pub struct BusyGuard {
    flag: BusyFlag,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
        debug!("{} finished", self.flag.action);
    }
}
