use model::{
    fleet::{Device, DeviceStatus, Driver, DriverStatus},
    geo::GeoPoint,
    product::Product,
    route::RouteRecord,
    shipment::{Shipment, ShipmentStatus},
    user::{Role, User},
    WithId,
};
use utility::id::Id;

use crate::{
    auth::set_role,
    client::BackendClient,
    fleet::{get_device, get_driver, set_device_status, set_driver_status},
    marketplace::create_product,
    routes::create_route,
    session::SessionManager,
    shipments, ApiError, ApiResult,
};

/// Everything a seller enters to send a product to a buyer.
#[derive(Debug, Clone)]
pub struct ShipmentOrder {
    pub product: Product,
    pub buyer: Id<User>,
    pub driver: Id<Driver>,
    pub device: Id<Device>,
    pub source: GeoPoint,
    pub destination: GeoPoint,
    pub halts: Vec<GeoPoint>,
}

impl ShipmentOrder {
    fn validate(&self) -> ApiResult<()> {
        self.product.validate()?;
        self.source.validate()?;
        self.destination.validate()?;
        for halt in &self.halts {
            halt.validate()?;
        }
        Ok(())
    }
}

/// Fails with `Unavailable` unless both the driver and the device are free.
pub async fn check_availability(
    client: &BackendClient,
    driver: &Id<Driver>,
    device: &Id<Device>,
) -> ApiResult<()> {
    let (driver, device) =
        futures::try_join!(get_driver(client, driver), get_device(client, device))?;
    if !driver.content.is_available() {
        return Err(ApiError::Unavailable(format!("driver {}", driver.id)));
    }
    if !device.content.is_available() {
        return Err(ApiError::Unavailable(format!("device {}", device.id)));
    }
    Ok(())
}

/// Registers a new shipment for the logged in seller: product, route, roles,
/// driver and device assignment, and finally the shipment itself in state
/// `SC`.
pub async fn create_shipment(
    client: &BackendClient,
    sessions: &SessionManager,
    order: ShipmentOrder,
) -> ApiResult<WithId<Shipment>> {
    let session = sessions.require().await?;
    order.validate()?;
    check_availability(client, &order.driver, &order.device).await?;

    let mut product = order.product;
    product.seller_id = Some(session.user_id().clone());
    product.device_id = Some(order.device.clone());
    let product = create_product(client, &product).await?;

    let route = RouteRecord::new(order.source, order.destination, &order.halts);
    let route = create_route(client, &route).await?;

    futures::try_join!(
        set_role(client, sessions, session.user_id(), Role::Seller),
        set_role(client, sessions, &order.buyer, Role::Buyer),
        set_driver_status(client, &order.driver, DriverStatus::Assigned),
        set_device_status(client, &order.device, DeviceStatus::Set),
    )?;

    let shipment = Shipment {
        seller_id: session.user_id().clone(),
        buyer_id: order.buyer,
        driver_id: order.driver,
        device_id: order.device,
        product_id: product.id,
        route_id: route.id,
        status: ShipmentStatus::SellerCreated,
    };
    let shipment = shipments::create_shipment(client, &shipment).await?;
    log::info!(
        "Created shipment {} of '{}'.",
        shipment.id,
        product.content.name
    );
    Ok(shipment)
}
