//! Authenticated actor context.
//!
//! The HTTP layer builds an [`Actor`] from a verified session token. Services
//! never see the raw actor; they take a [`StationAccess`] capability, which can
//! only be obtained through the checks below.

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, ValidationError};
use crate::ids::{StaffId, StationId};

/// Staff role within a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Supervisor,
    Accountant,
    Cashier,
    Attendant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Accountant => "accountant",
            Role::Cashier => "cashier",
            Role::Attendant => "attendant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "supervisor" => Ok(Role::Supervisor),
            "accountant" => Ok(Role::Accountant),
            "cashier" => Ok(Role::Cashier),
            "attendant" => Ok(Role::Attendant),
            _ => Err(ValidationError::invalid_value("role", s)),
        }
    }
}

/// Identity of the caller, as asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub staff_id: StaffId,
    pub role: Role,
    pub station: Option<StationId>,
}

impl Actor {
    pub fn new(staff_id: StaffId, role: Role, station: Option<StationId>) -> Self {
        Self {
            staff_id,
            role,
            station,
        }
    }

    /// Grants access for any staff member affiliated with a station.
    pub fn station_access(&self) -> Result<StationAccess, AccessError> {
        let station = self.station.ok_or(AccessError::NoStation)?;
        Ok(StationAccess {
            staff_id: self.staff_id,
            role: self.role,
            station,
        })
    }

    /// Grants access only to a manager affiliated with a station.
    pub fn manager_access(&self) -> Result<StationAccess, AccessError> {
        if self.role != Role::Manager {
            return Err(AccessError::NotManager);
        }
        self.station_access()
    }
}

/// Capability to act on one station's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationAccess {
    staff_id: StaffId,
    role: Role,
    station: StationId,
}

impl StationAccess {
    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn station(&self) -> StationId {
        self.station
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// Fails unless the capability covers `station`.
    pub fn ensure_station(&self, station: StationId) -> Result<(), AccessError> {
        if self.station == station {
            Ok(())
        } else {
            Err(AccessError::OtherStation)
        }
    }

    /// Builds a manager capability directly. Intended for tests and tools.
    pub fn manager(staff_id: StaffId, station: StationId) -> Self {
        Self {
            staff_id,
            role: Role::Manager,
            station,
        }
    }
}
