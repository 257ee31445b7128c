use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{user::User, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Available,
    Assigned,
    #[serde(other)]
    Unknown,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub user_id: Id<User>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub license_number: String,
    /// Years of driving experience.
    #[serde(deserialize_with = "utility::serde::lenient")]
    pub experience: u32,
    pub status: DriverStatus,
}

impl HasId for Driver {
    type IdType = u64;
}

impl Driver {
    /// A driver registering for the first time starts out available.
    pub fn register<L: Into<String>>(
        user_id: Id<User>,
        license_number: L,
        experience: u32,
    ) -> Result<Self, ValidationError> {
        let license_number: String = license_number.into();
        if license_number.trim().is_empty() {
            return Err(ValidationError::new(
                "license_number",
                "license number is missing",
            ));
        }
        if experience == 0 {
            return Err(ValidationError::new(
                "experience",
                "experience must be a positive number",
            ));
        }
        Ok(Self {
            user_id,
            name: None,
            phone: None,
            license_number,
            experience,
            status: DriverStatus::Available,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == DriverStatus::Available
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverStatusUpdate {
    pub status: DriverStatus,
}

/// `stop` means the tracking device is idle and can be attached to a new
/// shipment, `set` means it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Stop,
    Set,
    #[serde(other)]
    Unknown,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub name: Option<String>,
    pub status: DeviceStatus,
}

impl HasId for Device {
    type IdType = u64;
}

impl Device {
    pub fn is_available(&self) -> bool {
        self.status == DeviceStatus::Stop
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatusUpdate {
    pub status: DeviceStatus,
}
