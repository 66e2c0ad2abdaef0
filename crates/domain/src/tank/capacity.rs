use crate::values::Liters;

use super::TankError;

/// Checks that adding `proposed` to `current` stays within `limit`.
///
/// Returns the new total on success.
pub fn check_capacity(current: Liters, limit: Liters, proposed: Liters) -> Result<Liters, TankError> {
    let new_total = current + proposed;
    if new_total > limit {
        return Err(TankError::CapacityExceeded {
            attempted: proposed.value(),
            current: current.value(),
            limit: limit.value(),
        });
    }
    Ok(new_total)
}
