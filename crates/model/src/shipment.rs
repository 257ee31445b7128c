use std::fmt;

use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    fleet::{Device, Driver},
    product::Product,
    route::RouteRecord,
    user::User,
};

/// Lifecycle of a shipment as reported by the backend. Transitions are
/// decided by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    #[serde(rename = "SC")]
    SellerCreated,
    #[serde(rename = "DA")]
    DriverApproved,
    #[serde(rename = "SS")]
    SellerStarted,
    #[serde(rename = "OP")]
    OnProgress,
    #[serde(rename = "DR")]
    DestinationReached,
    #[serde(rename = "SV")]
    SellerVerified,
    #[serde(rename = "PC")]
    ProcessCompleted,
    #[serde(rename = "OB")]
    OnBidding,
    #[serde(rename = "BC")]
    BiddingCompleted,
}

impl ShipmentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SellerCreated => "SC",
            Self::DriverApproved => "DA",
            Self::SellerStarted => "SS",
            Self::OnProgress => "OP",
            Self::DestinationReached => "DR",
            Self::SellerVerified => "SV",
            Self::ProcessCompleted => "PC",
            Self::OnBidding => "OB",
            Self::BiddingCompleted => "BC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SellerCreated => "Seller Created",
            Self::DriverApproved => "Driver Approved",
            Self::SellerStarted => "Seller Started",
            Self::OnProgress => "On Progress",
            Self::DestinationReached => "Destination Reached",
            Self::SellerVerified => "Seller Verified",
            Self::ProcessCompleted => "Process Completed",
            Self::OnBidding => "On Bidding",
            Self::BiddingCompleted => "Bidding Completed",
        }
    }

    /// The shipment is on the road and can be tracked on the map.
    pub fn is_trackable(&self) -> bool {
        matches!(self, Self::OnProgress)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The part a user plays in a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Seller,
    Driver,
    Buyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub seller_id: Id<User>,
    pub buyer_id: Id<User>,
    /// Drivers are matched by their driver record, not their user account.
    pub driver_id: Id<Driver>,
    pub device_id: Id<Device>,
    pub product_id: Id<Product>,
    pub route_id: Id<RouteRecord>,
    pub status: ShipmentStatus,
}

impl HasId for Shipment {
    type IdType = u64;
}

impl Shipment {
    /// Returns how `user` takes part in this shipment. A driver is identified
    /// through `driver`, the driver record belonging to the user, if any.
    pub fn participant(
        &self,
        user: &Id<User>,
        driver: Option<&Id<Driver>>,
    ) -> Option<Participant> {
        if self.seller_id == *user {
            Some(Participant::Seller)
        } else if driver.is_some_and(|driver| self.driver_id == *driver) {
            Some(Participant::Driver)
        } else if self.buyer_id == *user {
            Some(Participant::Buyer)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ShipmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WithId;

    const SHIPMENTS: &str = r#"[
        {"id": 1, "seller_id": "3", "buyer_id": "8", "driver_id": "2",
         "device_id": "5", "product_id": "11", "route_id": "21", "status": "SC"},
        {"id": 2, "seller_id": 4, "buyer_id": 3, "driver_id": 6,
         "device_id": 7, "product_id": 12, "route_id": 22, "status": "OP"}
    ]"#;

    #[test]
    fn shipments_with_mixed_id_types() {
        let shipments: Vec<WithId<Shipment>> = serde_json::from_str(SHIPMENTS).unwrap();
        assert_eq!(shipments.len(), 2);
        assert_eq!(shipments[0].content.route_id.raw(), 21);
        assert_eq!(shipments[1].content.status, ShipmentStatus::OnProgress);
        assert!(shipments[1].content.status.is_trackable());
        assert!(!shipments[0].content.status.is_trackable());
    }

    #[test]
    fn participants() {
        let shipments: Vec<WithId<Shipment>> = serde_json::from_str(SHIPMENTS).unwrap();
        let user = Id::<User>::new(3);
        assert_eq!(
            shipments[0].content.participant(&user, None),
            Some(Participant::Seller)
        );
        assert_eq!(
            shipments[1].content.participant(&user, None),
            Some(Participant::Buyer)
        );
        assert_eq!(
            shipments[1]
                .content
                .participant(&Id::new(40), Some(&Id::new(6))),
            Some(Participant::Driver)
        );
        assert_eq!(shipments[0].content.participant(&Id::new(40), None), None);
    }

    #[test]
    fn status_codes_and_labels() {
        let status: ShipmentStatus = serde_json::from_str("\"DR\"").unwrap();
        assert_eq!(status, ShipmentStatus::DestinationReached);
        assert_eq!(status.code(), "DR");
        assert_eq!(status.to_string(), "Destination Reached");
        assert_eq!(
            serde_json::to_string(&StatusUpdate {
                status: ShipmentStatus::DriverApproved
            })
            .unwrap(),
            r#"{"status":"DA"}"#
        );
        assert!(serde_json::from_str::<ShipmentStatus>("\"XX\"").is_err());
    }
}
