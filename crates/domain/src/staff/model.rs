use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::actor::Role;
use crate::error::ValidationError;
use crate::ids::{StaffId, StationId};
use crate::record::{Record, Versioned};
use crate::validation::{check_password, email, non_blank, required};

/// Which channels and topics a staff member wants to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
    pub push: bool,
    pub low_stock: bool,
    pub mail: bool,
    pub sales: bool,
    pub staffs: bool,
}

/// Everything about a staff member that may be shown back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDetails {
    pub first_name: String,
    pub last_name: String,
    /// Stored trimmed and lowercased.
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub image: String,
    pub role: Role,
    pub station: Option<StationId>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub shift_type: Option<String>,
    #[serde(default)]
    pub responsibility: Vec<String>,
    #[serde(default)]
    pub on_duty: bool,
    #[serde(default)]
    pub add_sale_target: bool,
    #[serde(default)]
    pub pay_type: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub two_factor_auth_enabled: bool,
    #[serde(default)]
    pub notification_preferences: NotificationPreferences,
}

/// A staff account as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: StaffId,
    #[serde(flatten)]
    pub details: StaffDetails,
    pub password_hash: String,
}

impl Record for Staff {
    const COLLECTION: &'static str = "staff";

    fn key(&self) -> DocumentId {
        self.id.document_id()
    }
}

/// A staff account without its credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub id: StaffId,
    #[serde(flatten)]
    pub details: StaffDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Versioned<Staff>> for StaffProfile {
    fn from(staff: Versioned<Staff>) -> Self {
        Self {
            id: staff.record.id,
            details: staff.record.details,
            created_at: staff.created_at,
            updated_at: staff.updated_at,
        }
    }
}

/// Request to create a staff account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub emergency_contact: Option<String>,
    pub shift_type: Option<String>,
    pub responsibility: Option<Vec<String>>,
    pub on_duty: Option<bool>,
    pub add_sale_target: Option<bool>,
    pub pay_type: Option<String>,
    pub amount: Option<f64>,
    pub two_factor_auth_enabled: Option<bool>,
    pub notification_preferences: Option<NotificationPreferences>,
}

impl NewStaff {
    /// Returns the account details and the plaintext password.
    pub(crate) fn validate(
        &self,
        station: StationId,
    ) -> Result<(StaffDetails, String), ValidationError> {
        let mut errors = Vec::new();
        let mut take = |result: Result<String, ValidationError>| {
            result.map_err(|e| errors.push(e)).unwrap_or_default()
        };

        let first_name = take(required("firstName", self.first_name.as_deref()));
        let last_name = take(required("lastName", self.last_name.as_deref()));
        let email = take(email("email", self.email.as_deref()));
        let phone = take(required("phone", self.phone.as_deref()));
        let role = take(required("role", self.role.as_deref()));
        let password = take(
            required("password", self.password.as_deref())
                .and_then(|p| check_password(&p).map(|()| p)),
        );

        let role = match role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                if !role.is_empty() {
                    errors.push(err);
                }
                None
            }
        };
        if let Some(amount) = self.amount
            && !(amount.is_finite() && amount >= 0.0)
        {
            errors.push(ValidationError::invalid_number("amount", amount));
        }

        ValidationError::collect(errors)?;
        let role = role.ok_or_else(|| ValidationError::required("role"))?;

        Ok((
            StaffDetails {
                first_name,
                last_name,
                email,
                phone,
                image: non_blank(self.image.as_deref()).unwrap_or_default(),
                role,
                station: Some(station),
                address: non_blank(self.address.as_deref()),
                city: non_blank(self.city.as_deref()),
                state: non_blank(self.state.as_deref()),
                zip_code: non_blank(self.zip_code.as_deref()),
                emergency_contact: non_blank(self.emergency_contact.as_deref()),
                shift_type: non_blank(self.shift_type.as_deref()),
                responsibility: self.responsibility.clone().unwrap_or_default(),
                on_duty: self.on_duty.unwrap_or(false),
                add_sale_target: self.add_sale_target.unwrap_or(false),
                pay_type: non_blank(self.pay_type.as_deref()),
                amount: self.amount.unwrap_or(0.0),
                two_factor_auth_enabled: self.two_factor_auth_enabled.unwrap_or(false),
                notification_preferences: self.notification_preferences.unwrap_or_default(),
            },
            password,
        ))
    }
}

/// Request to edit a staff account. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub shift_type: Option<String>,
    pub responsibility: Option<Vec<String>>,
    pub on_duty: Option<bool>,
    pub add_sale_target: Option<bool>,
    pub pay_type: Option<String>,
    pub amount: Option<f64>,
    pub two_factor_auth_enabled: Option<bool>,
    pub notification_preferences: Option<NotificationPreferences>,
}

/// Validated form of [`StaffUpdate`].
#[derive(Debug, Clone, Default)]
pub(crate) struct StaffChanges {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
    pub amount: Option<f64>,
}

impl StaffUpdate {
    pub(crate) fn validate(&self) -> Result<StaffChanges, ValidationError> {
        let email = match non_blank(self.email.as_deref()) {
            Some(value) => Some(email("email", Some(&value))?),
            None => None,
        };
        let role = non_blank(self.role.as_deref())
            .map(|r| r.parse::<Role>())
            .transpose()?;
        let password = match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => {
                check_password(p)?;
                Some(p.to_string())
            }
            None => None,
        };
        if let Some(amount) = self.amount
            && !(amount.is_finite() && amount >= 0.0)
        {
            return Err(ValidationError::invalid_number("amount", amount));
        }

        Ok(StaffChanges {
            email,
            role,
            password,
            amount: self.amount,
        })
    }

    /// Overwrites the plain descriptive fields that are present.
    pub(crate) fn apply(&self, changes: &StaffChanges, details: &mut StaffDetails) {
        if let Some(v) = non_blank(self.first_name.as_deref()) {
            details.first_name = v;
        }
        if let Some(v) = non_blank(self.last_name.as_deref()) {
            details.last_name = v;
        }
        if let Some(v) = &changes.email {
            details.email = v.clone();
        }
        if let Some(v) = non_blank(self.phone.as_deref()) {
            details.phone = v;
        }
        if let Some(v) = &self.image {
            details.image = v.trim().to_string();
        }
        if let Some(role) = changes.role {
            details.role = role;
        }
        if let Some(v) = &self.shift_type {
            details.shift_type = non_blank(Some(v));
        }
        if let Some(v) = &self.responsibility {
            details.responsibility = v.clone();
        }
        if let Some(v) = self.on_duty {
            details.on_duty = v;
        }
        if let Some(v) = self.add_sale_target {
            details.add_sale_target = v;
        }
        if let Some(v) = &self.pay_type {
            details.pay_type = non_blank(Some(v));
        }
        if let Some(v) = changes.amount {
            details.amount = v;
        }
        if let Some(v) = self.two_factor_auth_enabled {
            details.two_factor_auth_enabled = v;
        }
        if let Some(v) = self.notification_preferences {
            details.notification_preferences = v;
        }
    }
}
