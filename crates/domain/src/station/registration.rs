//! The public sign-up form: personal, station, operational and security details.

use serde::Deserialize;

use crate::actor::Role;
use crate::dates::parse_date;
use crate::error::ValidationError;
use crate::ids::{StaffId, StationId};
use crate::staff::{NotificationPreferences, StaffDetails};
use crate::validation::{check_password, email, non_blank, required};

use super::Station;

/// Everything needed to open a station and its manager account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    // Manager
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub emergency_contact: Option<String>,
    pub image: Option<String>,

    // Station
    pub station_name: Option<String>,
    pub station_address: Option<String>,
    pub station_email: Option<String>,
    pub station_phone: Option<String>,
    pub station_city: Option<String>,
    pub station_country: Option<String>,
    pub station_zip_code: Option<String>,
    pub license_number: Option<String>,
    pub tax_id: Option<String>,
    pub establishment_date: Option<String>,
    pub station_image: Option<String>,

    // Operations
    pub business_type: Option<String>,
    pub number_of_pumps: Option<u32>,
    pub operation_hours: Option<String>,
    pub tank_capacity: Option<String>,
    pub average_monthly_revenue: Option<String>,
    pub fuel_types_offered: Option<Vec<String>>,
    pub additional_services: Option<Vec<String>>,

    // Security
    pub password: Option<String>,
    pub two_factor_auth_enabled: Option<bool>,
    pub notification_preferences: Option<NotificationPreferences>,
}

/// A validated form, ready to be stored.
#[derive(Debug, Clone)]
pub(crate) struct ValidRegistration {
    pub station: Station,
    pub manager: StaffDetails,
    pub manager_id: StaffId,
    pub password: String,
}

impl RegistrationForm {
    /// Checks every field and reports all problems at once.
    pub(crate) fn validate(&self) -> Result<ValidRegistration, ValidationError> {
        let mut errors = Vec::new();
        let mut field = |result: Result<String, ValidationError>| {
            result.map_err(|e| errors.push(e)).unwrap_or_default()
        };

        let first_name = field(required("firstName", self.first_name.as_deref()));
        let last_name = field(required("lastName", self.last_name.as_deref()));
        let manager_email = field(email("email", self.email.as_deref()));
        let phone = field(required("phone", self.phone.as_deref()));
        let address = field(required("address", self.address.as_deref()));
        let city = field(required("city", self.city.as_deref()));
        let state = field(required("state", self.state.as_deref()));
        let zip_code = field(required("zipCode", self.zip_code.as_deref()));
        let emergency_contact =
            field(required("emergencyContact", self.emergency_contact.as_deref()));

        let name = field(required("stationName", self.station_name.as_deref()));
        let station_address = field(required("stationAddress", self.station_address.as_deref()));
        let station_email = field(email("stationEmail", self.station_email.as_deref()));
        let station_phone = field(required("stationPhone", self.station_phone.as_deref()));
        let station_city = field(required("stationCity", self.station_city.as_deref()));
        let country = field(required("stationCountry", self.station_country.as_deref()));
        let license_number = field(required("licenseNumber", self.license_number.as_deref()));
        let tax_id = field(required("taxId", self.tax_id.as_deref()));
        let establishment_date = field(required(
            "establishmentDate",
            self.establishment_date.as_deref(),
        ));
        let password = field(
            required("password", self.password.as_deref())
                .and_then(|p| check_password(&p).map(|()| p)),
        );

        let establishment_date = if establishment_date.is_empty() {
            None
        } else {
            parse_date("establishmentDate", &establishment_date)
                .map_err(|e| errors.push(e))
                .ok()
        };

        ValidationError::collect(errors)?;
        let establishment_date =
            establishment_date.ok_or_else(|| ValidationError::required("establishmentDate"))?;

        let station_id = StationId::new();
        let manager_id = StaffId::new();
        let station = Station {
            id: station_id,
            name,
            address: station_address,
            email: station_email,
            phone: station_phone,
            city: station_city,
            country,
            zip_code: non_blank(self.station_zip_code.as_deref()).unwrap_or_default(),
            license_number: Station::normalize_license(&license_number),
            tax_id,
            establishment_date,
            image: non_blank(self.station_image.as_deref()),
            business_type: non_blank(self.business_type.as_deref()).unwrap_or_default(),
            number_of_pumps: self.number_of_pumps.unwrap_or(0),
            operation_hours: non_blank(self.operation_hours.as_deref()).unwrap_or_default(),
            tank_capacity: non_blank(self.tank_capacity.as_deref()).unwrap_or_default(),
            average_monthly_revenue: non_blank(self.average_monthly_revenue.as_deref())
                .unwrap_or_default(),
            fuel_types_offered: self.fuel_types_offered.clone().unwrap_or_default(),
            additional_services: self.additional_services.clone().unwrap_or_default(),
            staff: vec![manager_id],
        };

        let manager = StaffDetails {
            first_name,
            last_name,
            email: manager_email,
            phone,
            image: non_blank(self.image.as_deref()).unwrap_or_default(),
            role: Role::Manager,
            station: Some(station_id),
            address: Some(address),
            city: Some(city),
            state: Some(state),
            zip_code: Some(zip_code),
            emergency_contact: Some(emergency_contact),
            shift_type: None,
            responsibility: Vec::new(),
            on_duty: false,
            add_sale_target: false,
            pay_type: None,
            amount: 0.0,
            two_factor_auth_enabled: self.two_factor_auth_enabled.unwrap_or(false),
            notification_preferences: self.notification_preferences.unwrap_or_default(),
        };

        Ok(ValidRegistration {
            station,
            manager,
            manager_id,
            password,
        })
    }
}
