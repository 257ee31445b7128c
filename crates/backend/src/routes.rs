use model::{route::RouteRecord, WithId};
use utility::id::Id;

use crate::{client::BackendClient, ApiResult};

pub async fn get_route(
    client: &BackendClient,
    id: &Id<RouteRecord>,
) -> ApiResult<WithId<RouteRecord>> {
    client.get(&format!("routes/{id}/")).await
}

pub async fn create_route(
    client: &BackendClient,
    route: &RouteRecord,
) -> ApiResult<WithId<RouteRecord>> {
    client.post("routes/", route).await
}
