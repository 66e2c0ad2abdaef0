//! Typed identifiers for every addressable entity.

common::define_id!(
    /// Identifies a filling station.
    StationId
);

common::define_id!(
    /// Identifies a staff account.
    StaffId
);

common::define_id!(
    /// Identifies a sub-tank inside a station's tank inventory.
    TankId
);

common::define_id!(
    /// Identifies a sub-pump inside a tank's pump bank.
    PumpId
);

common::define_id!(
    /// Identifies a fuel delivery.
    DeliveryId
);

common::define_id!(
    /// Identifies a password reset request.
    ResetTokenId
);
