//! Station service: registration, lookup, profile edits and cascading removal.

use document_store::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::actor::StationAccess;
use crate::delivery::Delivery;
use crate::error::{DomainError, ValidationError};
use crate::ids::StationId;
use crate::pump::PumpBank;
use crate::record::{Record, Repository, Versioned, retry_on_conflict};
use crate::staff::{PasswordHasher, PasswordReset, Staff, StaffError, StaffProfile};
use crate::tank::TankInventory;
use crate::validation::{email, non_blank};

use super::{RegistrationForm, Station, StationError};

/// A newly registered station and its manager.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub station: Versioned<Station>,
    pub manager: StaffProfile,
}

/// A station with its staff profiles.
#[derive(Debug, Clone, Serialize)]
pub struct StationDetails {
    pub station: Versioned<Station>,
    pub staff: Vec<StaffProfile>,
}

/// Request to edit a station's descriptive fields. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub tax_id: Option<String>,
    pub image: Option<String>,
    pub business_type: Option<String>,
    pub number_of_pumps: Option<u32>,
    pub operation_hours: Option<String>,
    pub tank_capacity: Option<String>,
    pub average_monthly_revenue: Option<String>,
    pub fuel_types_offered: Option<Vec<String>>,
    pub additional_services: Option<Vec<String>>,
}

impl StationUpdate {
    fn validate(&self) -> Result<Option<String>, ValidationError> {
        match non_blank(self.email.as_deref()) {
            Some(value) => email("email", Some(&value)).map(Some),
            None => Ok(None),
        }
    }

    fn apply(&self, email: Option<&String>, station: &mut Station) {
        let text = |value: &Option<String>, target: &mut String| {
            if let Some(v) = non_blank(value.as_deref()) {
                *target = v;
            }
        };
        text(&self.name, &mut station.name);
        text(&self.address, &mut station.address);
        text(&self.phone, &mut station.phone);
        text(&self.city, &mut station.city);
        text(&self.country, &mut station.country);
        text(&self.zip_code, &mut station.zip_code);
        text(&self.tax_id, &mut station.tax_id);
        text(&self.business_type, &mut station.business_type);
        text(&self.operation_hours, &mut station.operation_hours);
        text(&self.tank_capacity, &mut station.tank_capacity);
        text(&self.average_monthly_revenue, &mut station.average_monthly_revenue);

        if let Some(email) = email {
            station.email = email.clone();
        }
        if let Some(image) = &self.image {
            station.image = non_blank(Some(image));
        }
        if let Some(n) = self.number_of_pumps {
            station.number_of_pumps = n;
        }
        if let Some(v) = &self.fuel_types_offered {
            station.fuel_types_offered = v.clone();
        }
        if let Some(v) = &self.additional_services {
            station.additional_services = v.clone();
        }
    }
}

/// Service for station registration and lifecycle.
pub struct StationService<S: DocumentStore> {
    repo: Repository<S>,
    hasher: PasswordHasher,
}

impl<S: DocumentStore> StationService<S> {
    /// Creates a new station service.
    pub fn new(store: S, hasher: PasswordHasher) -> Self {
        Self {
            repo: Repository::new(store),
            hasher,
        }
    }

    /// Registers a station and its first manager in one commit.
    #[tracing::instrument(skip(self, form))]
    pub async fn register(&self, form: RegistrationForm) -> Result<Registration, DomainError> {
        let valid = form.validate()?;

        let license = &valid.station.license_number;
        if self
            .repo
            .find_one::<Station>(Station::query().field_eq("licenseNumber", license.as_str()))
            .await?
            .is_some()
        {
            return Err(StationError::DuplicateLicense {
                license_number: license.clone(),
            }
            .into());
        }
        if self
            .repo
            .find_one::<Staff>(Staff::query().field_eq("email", valid.manager.email.as_str()))
            .await?
            .is_some()
        {
            return Err(StaffError::DuplicateEmail {
                email: valid.manager.email,
            }
            .into());
        }

        let manager = Staff {
            id: valid.manager_id,
            details: valid.manager,
            password_hash: self.hasher.hash(&valid.password).await?,
        };
        self.repo
            .commit(vec![valid.station.insert_op()?, manager.insert_op()?])
            .await?;

        tracing::info!(
            station_id = %valid.station.id,
            manager_id = %manager.id,
            "station registered"
        );
        Ok(Registration {
            station: Versioned::inserted(valid.station),
            manager: Versioned::inserted(manager).into(),
        })
    }

    async fn load(&self, id: StationId) -> Result<Versioned<Station>, DomainError> {
        self.repo
            .load::<Station>(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Filling station", id))
    }

    /// Returns a station with its staff. Any staff member of the station may read it.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn get_station(
        &self,
        access: &StationAccess,
        id: StationId,
    ) -> Result<StationDetails, DomainError> {
        let station = self.load(id).await?;
        access.ensure_station(id)?;

        let staff = self
            .repo
            .find::<Staff>(Staff::query().field_eq("station", id.to_string()))
            .await?
            .into_iter()
            .map(StaffProfile::from)
            .collect();
        Ok(StationDetails { station, staff })
    }

    /// Edits the station's descriptive fields.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn update_station(
        &self,
        access: &StationAccess,
        id: StationId,
        input: StationUpdate,
    ) -> Result<Versioned<Station>, DomainError> {
        let email = input.validate()?;
        access.ensure_station(id)?;
        let (input, email) = (&input, email.as_ref());

        retry_on_conflict("update_station", move || async move {
            let mut current = self.load(id).await?;
            input.apply(email, &mut current.record);
            self.repo.commit(vec![current.replace_op()?]).await?;
            Ok(current.committed())
        })
        .await
    }

    /// Deletes the station together with its staff, tanks, pumps,
    /// deliveries and pending password resets.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn delete_station(
        &self,
        access: &StationAccess,
        id: StationId,
    ) -> Result<(), DomainError> {
        access.ensure_station(id)?;
        let removed = retry_on_conflict("delete_station", move || self.try_delete_station(id))
            .await?;
        tracing::info!(station_id = %id, documents = removed, "station deleted");
        Ok(())
    }

    async fn try_delete_station(&self, id: StationId) -> Result<usize, DomainError> {
        let station = self.load(id).await?;
        let by_station = id.to_string();

        let staff = self
            .repo
            .find::<Staff>(Staff::query().field_eq("station", by_station.as_str()))
            .await?;
        let resets = if staff.is_empty() {
            Vec::new()
        } else {
            self.repo
                .find::<PasswordReset>(
                    PasswordReset::query()
                        .field_in("staffId", staff.iter().map(|s| s.record.id.to_string())),
                )
                .await?
        };
        let banks = self
            .repo
            .find::<PumpBank>(PumpBank::query().field_eq("stationId", by_station.as_str()))
            .await?;
        let deliveries = self
            .repo
            .find::<Delivery>(Delivery::query().field_eq("stationId", by_station.as_str()))
            .await?;
        let inventory = self.repo.load::<TankInventory>(id).await?;

        let mut ops = vec![station.delete_op()];
        ops.extend(staff.iter().map(Versioned::delete_op));
        ops.extend(resets.iter().map(Versioned::delete_op));
        ops.extend(banks.iter().map(Versioned::delete_op));
        ops.extend(deliveries.iter().map(Versioned::delete_op));
        ops.extend(inventory.iter().map(Versioned::delete_op));

        let count = ops.len();
        self.repo.commit(ops).await?;
        Ok(count)
    }
}
