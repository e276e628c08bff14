use tracing::info;

use crate::model::{Candidate, SourceRef};

/// Everything the focus collaborator needs to bring a candidate forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationTarget {
    Window {
        pid: u32,
        handle: u64,
    },
    Tab {
        app_id: String,
        pid: u32,
        window_index: u64,
        tab_index: usize,
    },
    /// A tab reference that lost its sub-item coordinates; focus the app only.
    Application {
        app_id: String,
        pid: u32,
    },
}

impl From<&Candidate> for ActivationTarget {
    fn from(candidate: &Candidate) -> Self {
        match (&candidate.source_ref, candidate.sub_item) {
            (SourceRef::Window { pid, handle }, _) => Self::Window {
                pid: *pid,
                handle: *handle,
            },
            (SourceRef::Tab { app_id, pid }, Some(sub_item)) => Self::Tab {
                app_id: app_id.clone(),
                pid: *pid,
                window_index: sub_item.parent_ref,
                tab_index: sub_item.sub_index,
            },
            (SourceRef::Tab { app_id, pid }, None) => Self::Application {
                app_id: app_id.clone(),
                pid: *pid,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error("activation failed: {0}")]
    Failed(String),
}

/// Platform hook that focuses a window or tab.
pub trait Activator: Send + Sync {
    fn activate(&self, target: &ActivationTarget) -> Result<(), ActivationError>;
}

/// Records activation requests in the log without touching the desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogActivator;

impl Activator for LogActivator {
    fn activate(&self, target: &ActivationTarget) -> Result<(), ActivationError> {
        info!(?target, "activation requested");
        Ok(())
    }
}
