//! Shared resources and the synchronization mode used to arbitrate them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// A named resource with a fixed number of concurrent holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub capacity: u32,
}

impl Resource {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Resource {
            name: name.into(),
            capacity,
        }
    }

    /// A capacity-1 resource.
    pub fn mutex(name: impl Into<String>) -> Self {
        Self::new(name, 1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SimError::InvalidParameter(format!(
                "resource {:?} must have capacity of at least 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// How the arbiter grants access.
///
/// In `Mutex` mode every resource is exclusive regardless of its declared
/// capacity, and resources an action names without declaring are created
/// on the fly with capacity 1. In `Semaphore` mode up to `capacity` actions
/// hold a resource at once and every resource must be declared.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    #[default]
    Mutex,
    Semaphore,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Mutex => f.write_str("mutex"),
            SyncMode::Semaphore => f.write_str("semaphore"),
        }
    }
}
