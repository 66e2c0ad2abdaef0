//! Domain layer for the filling-station back office.
//!
//! This crate provides:
//! - Tank inventories with the capacity invariant `0 <= current <= limit`
//! - Pump banks, price propagation by fuel type and sales reporting
//! - Deliveries whose completion fills the tank in the same atomic commit
//! - Station registration, staff accounts and password resets
//!
//! Services are generic over [`document_store::DocumentStore`] and take an
//! explicit [`StationAccess`] capability instead of raw caller identity.

pub mod actor;
pub mod contact;
pub mod dates;
pub mod delivery;
pub mod error;
pub mod fuel;
pub mod ids;
pub mod notifier;
pub mod pump;
pub mod record;
pub mod staff;
pub mod station;
pub mod tank;
pub mod validation;
pub mod values;

pub use actor::{Actor, Role, StationAccess};
pub use contact::{ContactMessage, ContactService};
pub use delivery::{
    Delivery, DeliveryError, DeliveryService, DeliveryStatus, DeliveryUpdate, DeliveryView,
    NewDelivery,
};
pub use error::{AccessError, DomainError, ErrorCategory, ValidationError};
pub use fuel::FuelType;
pub use ids::{DeliveryId, PumpId, ResetTokenId, StaffId, StationId, TankId};
pub use notifier::{InMemoryNotifier, LogNotifier, Notification, Notifier, NotifierError};
pub use pump::{
    AddedPump, FuelPriceUpdate, NewPump, PriceUpdate, PumpBank, PumpError, PumpService,
    PumpStatus, PumpUpdate, PumpView, SalesReport, SubPump,
};
pub use record::{MAX_CONFLICT_RETRIES, Record, Repository, Versioned, retry_on_conflict};
pub use staff::{
    ForgotPassword, LoginOutcome, LoginRequest, NewStaff, PasswordHasher, ResetPasswordRequest,
    StaffError, StaffProfile, StaffService, StaffUpdate,
};
pub use station::{
    Registration, RegistrationForm, Station, StationDetails, StationError, StationService,
    StationUpdate,
};
pub use tank::{NewTank, SubTank, TankError, TankInventory, TankListing, TankService, TankUpdate};
pub use values::{Liters, PricePerLiter};
