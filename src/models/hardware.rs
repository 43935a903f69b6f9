use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HardwareStatus {
    #[default]
    Idle,
    Occupied,
}

/// An RFID reader or tracker unit. `status` is `Occupied` exactly when
/// `attached_to_shift` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hardware {
    pub id: Uuid,
    pub hardware_id: String,
    /// Device credential; never rendered in responses.
    #[serde(skip_serializing, default)]
    pub secret: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: HardwareStatus,
    pub attached_to_shift: Option<Uuid>,
}

impl Hardware {
    pub fn is_idle(&self) -> bool {
        self.status == HardwareStatus::Idle && self.attached_to_shift.is_none()
    }

    pub fn attach(&mut self, shift_id: Uuid) {
        self.status = HardwareStatus::Occupied;
        self.attached_to_shift = Some(shift_id);
    }

    pub fn release(&mut self) {
        self.status = HardwareStatus::Idle;
        self.attached_to_shift = None;
    }
}
