use tokio::sync::RwLock;

use crate::types::PushAlert;

/// Single-slot holder of the most recent externally-pushed detection event.
///
/// Process-lifetime only: the slot is lost on restart. Writers and readers
/// may race; last-write-wins is acceptable for advisory telemetry, so there
/// is no history and no queue behind it.
#[derive(Debug, Default)]
pub struct AlertStore {
    slot: RwLock<Option<PushAlert>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally replace the stored event.
    pub async fn replace(&self, alert: PushAlert) {
        *self.slot.write().await = Some(alert);
    }

    /// The current event, `None` if nothing has been pushed since startup.
    pub async fn latest(&self) -> Option<PushAlert> {
        self.slot.read().await.clone()
    }
}
