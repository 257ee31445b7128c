use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{fleet::Device, user::User, ValidationError, WithId};

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub details: String,
    /// Kilograms.
    #[serde(deserialize_with = "utility::serde::lenient")]
    pub quantity: f64,
    /// Rating out of 10.
    #[serde(default, deserialize_with = "utility::serde::lenient_option")]
    pub quality: Option<f64>,
    #[serde(default)]
    pub seller_id: Option<Id<User>>,
    #[serde(default)]
    pub device_id: Option<Id<Device>>,
}

impl HasId for Product {
    type IdType = u64;
}

impl Product {
    pub fn new<N: Into<String>, D: Into<String>>(
        name: N,
        details: D,
        quantity: f64,
    ) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
            quantity,
            quality: None,
            seller_id: None,
            device_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "product name is missing"));
        }
        if self.details.trim().is_empty() {
            return Err(ValidationError::new("details", "product details are missing"));
        }
        if self.quantity.is_nan() || self.quantity <= 0.0 {
            return Err(ValidationError::new(
                "quantity",
                "quantity must be a positive number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub product_id: Id<Product>,
    #[serde(deserialize_with = "utility::serde::lenient")]
    pub current_bid: f64,
}

impl HasId for Bid {
    type IdType = u64;
}

/// Body of a new bid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceBid {
    pub product_id: Id<Product>,
    pub bid_amount: f64,
}

/// A product open for bidding together with its highest bid.
#[derive(Debug, Clone, Serialize)]
pub struct BidListing {
    pub product: WithId<Product>,
    pub current_bid: f64,
}

impl BidListing {
    /// Checks that `amount` outbids the current bid.
    pub fn bid(&self, amount: f64) -> Result<PlaceBid, ValidationError> {
        if !amount.is_finite() || amount <= self.current_bid {
            return Err(ValidationError::new(
                "bid_amount",
                format!("bid must be higher than the current bid of {}", self.current_bid),
            ));
        }
        Ok(PlaceBid {
            product_id: self.product.id.clone(),
            bid_amount: amount,
        })
    }
}

/// Joins bids with the products they are placed on. Listings appear in the
/// order of the first bid per product and carry the highest bid. Bids on
/// unknown products are dropped.
pub fn bid_listings(
    bids: &[WithId<Bid>],
    products: &[WithId<Product>],
) -> Vec<BidListing> {
    let mut listings: IndexMap<Id<Product>, BidListing> = IndexMap::new();
    for bid in bids {
        let product_id = &bid.content.product_id;
        if let Some(listing) = listings.get_mut(product_id) {
            listing.current_bid = listing.current_bid.max(bid.content.current_bid);
            continue;
        }
        let Some(product) = products.iter().find(|product| product.id == *product_id)
        else {
            continue;
        };
        listings.insert(
            product_id.clone(),
            BidListing {
                product: product.clone(),
                current_bid: bid.content.current_bid,
            },
        );
    }
    listings.into_values().collect()
}
