use model::{
    fleet::{Device, DeviceStatus, DeviceStatusUpdate, Driver, DriverStatus, DriverStatusUpdate},
    user::{Role, User},
    WithId,
};
use utility::id::Id;

use crate::{
    auth::set_role, client::BackendClient, session::SessionManager, ApiError, ApiResult,
};

pub async fn get_drivers(client: &BackendClient) -> ApiResult<Vec<WithId<Driver>>> {
    client.get("drivers/").await
}

pub async fn get_driver(client: &BackendClient, id: &Id<Driver>) -> ApiResult<WithId<Driver>> {
    client.get(&format!("drivers/{id}/")).await
}

/// The driver record of `user`, if they registered as a driver.
pub async fn driver_for_user(
    client: &BackendClient,
    user: &Id<User>,
) -> ApiResult<Option<WithId<Driver>>> {
    Ok(get_drivers(client)
        .await?
        .into_iter()
        .find(|driver| driver.content.user_id == *user))
}

pub async fn get_available_drivers(client: &BackendClient) -> ApiResult<Vec<WithId<Driver>>> {
    Ok(get_drivers(client)
        .await?
        .into_iter()
        .filter(|driver| driver.content.is_available())
        .collect())
}

/// Registers `user` as a driver and makes them one. The session is cleared
/// afterwards, so the next login picks up the driver record.
pub async fn register_driver(
    client: &BackendClient,
    sessions: &SessionManager,
    user: &Id<User>,
    license_number: &str,
    experience: u32,
) -> ApiResult<WithId<Driver>> {
    let driver = Driver::register(user.clone(), license_number, experience)?;
    let driver: WithId<Driver> = client
        .post("drivers/", &driver)
        .await
        .map_err(ApiError::into_rejection)?;
    set_role(client, sessions, user, Role::Driver).await?;
    sessions.clear().await;
    log::info!("User {user} registered as driver {}.", driver.id);
    Ok(driver)
}

pub async fn set_driver_status(
    client: &BackendClient,
    id: &Id<Driver>,
    status: DriverStatus,
) -> ApiResult<WithId<Driver>> {
    client
        .patch(&format!("drivers/{id}/"), &DriverStatusUpdate { status })
        .await
}

pub async fn get_device(client: &BackendClient, id: &Id<Device>) -> ApiResult<WithId<Device>> {
    client.get(&format!("devices/{id}/")).await
}

pub async fn set_device_status(
    client: &BackendClient,
    id: &Id<Device>,
    status: DeviceStatus,
) -> ApiResult<WithId<Device>> {
    client
        .patch(&format!("devices/{id}/"), &DeviceStatusUpdate { status })
        .await
}
