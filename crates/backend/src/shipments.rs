use model::{
    fleet::{Device, Driver},
    product::Product,
    shipment::{Participant, Shipment, ShipmentStatus, StatusUpdate},
    user::User,
    WithId,
};
use utility::id::Id;

use crate::{client::BackendClient, fleet, marketplace, session::Session, ApiResult};

pub async fn get_shipments(client: &BackendClient) -> ApiResult<Vec<WithId<Shipment>>> {
    client.get("shipment/").await
}

pub async fn create_shipment(
    client: &BackendClient,
    shipment: &Shipment,
) -> ApiResult<WithId<Shipment>> {
    client.post("shipment/", shipment).await
}

pub async fn set_status(
    client: &BackendClient,
    id: &Id<Shipment>,
    status: ShipmentStatus,
) -> ApiResult<WithId<Shipment>> {
    log::info!("Shipment {id} -> {status}.");
    client
        .patch(&format!("shipment/{id}/"), &StatusUpdate { status })
        .await
}

/// Shipments in which the user takes the given part, in backend order.
pub fn involving<'a>(
    shipments: &'a [WithId<Shipment>],
    user: &'a Id<User>,
    driver: Option<&'a Id<Driver>>,
    part: Participant,
) -> impl Iterator<Item = &'a WithId<Shipment>> + 'a {
    shipments
        .iter()
        .filter(move |s| s.content.participant(user, driver) == Some(part))
}

/// The first shipment on the road that the user takes any part in.
pub fn find_active<'a>(
    shipments: &'a [WithId<Shipment>],
    user: &Id<User>,
    driver: Option<&Id<Driver>>,
) -> Option<&'a WithId<Shipment>> {
    shipments.iter().find(|shipment| {
        shipment.content.status.is_trackable()
            && shipment.content.participant(user, driver).is_some()
    })
}

pub async fn active_shipment(
    client: &BackendClient,
    session: &Session,
) -> ApiResult<Option<WithId<Shipment>>> {
    let shipments = get_shipments(client).await?;
    Ok(find_active(&shipments, session.user_id(), session.driver.as_ref()).cloned())
}

/// Everything shown for a single shipment.
#[derive(Debug, Clone)]
pub struct ShipmentDetails {
    pub shipment: WithId<Shipment>,
    pub product: WithId<Product>,
    pub driver: WithId<Driver>,
    pub device: WithId<Device>,
}

pub async fn get_details(
    client: &BackendClient,
    shipment: WithId<Shipment>,
) -> ApiResult<ShipmentDetails> {
    let (product, driver, device) = futures::try_join!(
        marketplace::get_product(client, &shipment.content.product_id),
        fleet::get_driver(client, &shipment.content.driver_id),
        fleet::get_device(client, &shipment.content.device_id),
    )?;
    Ok(ShipmentDetails {
        shipment,
        product,
        driver,
        device,
    })
}
