use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::ids::{DeliveryId, StationId, TankId};
use crate::record::Record;
use crate::values::{Liters, PricePerLiter};

use super::DeliveryStatus;

/// A fuel delivery into one sub-tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub station_id: StationId,
    #[serde(rename = "tank")]
    pub tank_id: TankId,
    pub price_per_ltr: PricePerLiter,
    pub quantity: Liters,
    pub supplier: String,
    pub delivery_date: DateTime<Utc>,
    #[serde(default)]
    pub status: DeliveryStatus,
}

impl Record for Delivery {
    const COLLECTION: &'static str = "deliveries";

    fn key(&self) -> DocumentId {
        self.id.document_id()
    }
}

impl Delivery {
    /// Total cost of the delivery.
    pub fn cost(&self) -> f64 {
        self.price_per_ltr.total_for(self.quantity)
    }
}
