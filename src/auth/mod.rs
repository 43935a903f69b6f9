//! Bearer-token identity and role gating.
//!
//! Roles never appear in handlers as strings: each role resolves to a fixed
//! capability set and handlers ask for the capability they need.

mod extractor;
pub mod jwt;

use serde::{Deserialize, Serialize};

pub use extractor::AuthUser;
pub use jwt::{Claims, JwtService};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    /// Superintendent of police.
    #[serde(rename = "SP")]
    Sp,
    /// Deputy superintendent of police.
    #[serde(rename = "DSP")]
    Dsp,
    #[serde(rename = "personnel")]
    Personnel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageDuties,
    ManageRoster,
    ManagePersonnel,
    ManageHardware,
    ViewReports,
    PerformDuty,
}

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ManageDuties,
    Capability::ManageRoster,
    Capability::ManagePersonnel,
    Capability::ManageHardware,
    Capability::ViewReports,
];

const SUPERVISOR_CAPABILITIES: &[Capability] = &[
    Capability::ManageDuties,
    Capability::ManageRoster,
    Capability::ViewReports,
];

const PERSONNEL_CAPABILITIES: &[Capability] = &[Capability::PerformDuty];

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Admin => ADMIN_CAPABILITIES,
            Role::Sp | Role::Dsp => SUPERVISOR_CAPABILITIES,
            Role::Personnel => PERSONNEL_CAPABILITIES,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}
