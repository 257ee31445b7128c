use async_trait::async_trait;
use backend::{
    directions::DirectionsClient,
    marketplace, model::directions::Directions,
    routes, shipments, ApiResult, BackendClient, SessionManager,
};
use model::{
    geo::GeoPoint,
    product::{Bid, Product},
    route::RouteRecord,
    shipment::Shipment,
    WithId,
};
use utility::id::Id;

/// Where the tracking refresher gets its data from.
#[async_trait]
pub trait TrackingSource: Send + Sync {
    /// The first shipment on the road that the logged in user takes part in.
    async fn active_shipment(&self) -> ApiResult<Option<WithId<Shipment>>>;

    async fn route_record(&self, id: &Id<RouteRecord>) -> ApiResult<WithId<RouteRecord>>;

    /// Road geometry between two points. `None` if no routing provider is
    /// configured.
    async fn directions(
        &self,
        start: &GeoPoint,
        end: &GeoPoint,
    ) -> Option<ApiResult<Directions>>;
}

#[async_trait]
pub trait MarketplaceSource: Send + Sync {
    async fn products(&self) -> ApiResult<Vec<WithId<Product>>>;
    async fn bids(&self) -> ApiResult<Vec<WithId<Bid>>>;
}

/// The live backend, seen through the current session.
#[derive(Debug, Clone)]
pub struct BackendSource {
    pub client: BackendClient,
    pub sessions: SessionManager,
    pub directions: Option<DirectionsClient>,
}

#[async_trait]
impl TrackingSource for BackendSource {
    async fn active_shipment(&self) -> ApiResult<Option<WithId<Shipment>>> {
        let session = self.sessions.require().await?;
        shipments::active_shipment(&self.client, &session).await
    }

    async fn route_record(&self, id: &Id<RouteRecord>) -> ApiResult<WithId<RouteRecord>> {
        routes::get_route(&self.client, id).await
    }

    async fn directions(
        &self,
        start: &GeoPoint,
        end: &GeoPoint,
    ) -> Option<ApiResult<Directions>> {
        let directions = self.directions.as_ref()?;
        Some(directions.route(start, end).await)
    }
}

#[async_trait]
impl MarketplaceSource for BackendSource {
    async fn products(&self) -> ApiResult<Vec<WithId<Product>>> {
        marketplace::get_products(&self.client).await
    }

    async fn bids(&self) -> ApiResult<Vec<WithId<Bid>>> {
        marketplace::get_bids(&self.client).await
    }
}
