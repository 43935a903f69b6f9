use serde::Serialize;
use uuid::Uuid;

/// Why a candidate could not join a shift: they already hold an overlapping one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShiftClash {
    pub sid: Uuid,
    pub clashing_shift: Uuid,
    pub clashing_shift_name: String,
    pub clashing_shift_duty: Uuid,
}

/// Disjoint buckets; together they cover every distinct requested id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonnelAdded {
    pub sid_added: Vec<Uuid>,
    pub sid_already_assigned: Vec<Uuid>,
    pub sid_not_added: Vec<Uuid>,
    pub sid_not_added_because_clashing_shifts: Vec<ShiftClash>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonnelRemoved {
    pub personnel_removed: Vec<Uuid>,
    pub personnel_not_removed: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HardwareAdded {
    pub hardware_added: Vec<Uuid>,
    pub hardware_already_attached: Vec<Uuid>,
    pub hardware_not_added: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HardwareRemoved {
    pub hardware_removed: Vec<Uuid>,
    pub hardware_not_removed: Vec<Uuid>,
}
