use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::ids::{StaffId, StationId};
use crate::record::Record;

/// A registered filling station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub zip_code: String,
    pub license_number: String,
    pub tax_id: String,
    pub establishment_date: DateTime<Utc>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub business_type: String,
    #[serde(default)]
    pub number_of_pumps: u32,
    #[serde(default)]
    pub operation_hours: String,
    #[serde(default)]
    pub tank_capacity: String,
    #[serde(default)]
    pub average_monthly_revenue: String,
    #[serde(default)]
    pub fuel_types_offered: Vec<String>,
    #[serde(default)]
    pub additional_services: Vec<String>,
    #[serde(default)]
    pub staff: Vec<StaffId>,
}

impl Record for Station {
    const COLLECTION: &'static str = "stations";

    fn key(&self) -> DocumentId {
        self.id.document_id()
    }
}

impl Station {
    /// Adds a staff member to the roster once.
    pub fn enlist(&mut self, staff: StaffId) {
        if !self.staff.contains(&staff) {
            self.staff.push(staff);
        }
    }

    /// Removes a staff member from the roster, returning whether they were on it.
    pub fn discharge(&mut self, staff: StaffId) -> bool {
        let before = self.staff.len();
        self.staff.retain(|id| *id != staff);
        self.staff.len() != before
    }

    /// License numbers are compared without surrounding whitespace or case.
    pub fn normalize_license(license: &str) -> String {
        license.trim().to_uppercase()
    }
}
