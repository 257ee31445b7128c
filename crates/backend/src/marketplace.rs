use model::{
    product::{bid_listings, Bid, BidListing, Product},
    user::User,
    WithId,
};
use serde_json::Value;
use utility::id::Id;

use crate::{client::BackendClient, ApiError, ApiResult};

pub async fn get_products(client: &BackendClient) -> ApiResult<Vec<WithId<Product>>> {
    client.get("products/").await
}

pub async fn get_product(
    client: &BackendClient,
    id: &Id<Product>,
) -> ApiResult<WithId<Product>> {
    client.get(&format!("products/{id}/")).await
}

pub async fn create_product(
    client: &BackendClient,
    product: &Product,
) -> ApiResult<WithId<Product>> {
    product.validate()?;
    client
        .post("products/", product)
        .await
        .map_err(ApiError::into_rejection)
}

/// The first product the user put up for sale.
pub async fn order_of_seller(
    client: &BackendClient,
    seller: &Id<User>,
) -> ApiResult<Option<WithId<Product>>> {
    Ok(get_products(client)
        .await?
        .into_iter()
        .find(|product| product.content.seller_id.as_ref() == Some(seller)))
}

pub async fn get_bids(client: &BackendClient) -> ApiResult<Vec<WithId<Bid>>> {
    client.get("bids/").await
}

/// Fetches products and bids concurrently and joins them.
pub async fn get_bid_listings(client: &BackendClient) -> ApiResult<Vec<BidListing>> {
    let (products, bids) = futures::try_join!(get_products(client), get_bids(client))?;
    Ok(bid_listings(&bids, &products))
}

/// Places a bid on `listing`. Amounts that do not outbid the current bid
/// are refused before anything is sent.
pub async fn place_bid(
    client: &BackendClient,
    listing: &BidListing,
    amount: f64,
) -> ApiResult<()> {
    let bid = listing.bid(amount)?;
    let _: Value = client
        .post("bids/", &bid)
        .await
        .map_err(ApiError::into_rejection)?;
    log::info!(
        "Placed bid of {amount} on '{}'.",
        listing.product.content.name
    );
    Ok(())
}
