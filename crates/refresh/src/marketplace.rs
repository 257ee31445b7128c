use std::{fmt, time::Duration};

use async_trait::async_trait;
use backend::ApiError;
use model::product::{bid_listings, BidListing};

use crate::{
    refresher::{Continuation, Refresher, DEFAULT_TICK},
    source::MarketplaceSource,
    Publisher,
};

#[derive(Debug, Clone, Default)]
pub enum MarketView {
    #[default]
    Loading,
    Ready(Vec<BidListing>),
    Failed(String),
}

impl fmt::Display for MarketView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading..."),
            Self::Ready(listings) if listings.is_empty() => write!(f, "No bids yet."),
            Self::Ready(listings) => {
                for listing in listings {
                    let product = &listing.product.content;
                    writeln!(
                        f,
                        "{}: {} KG, current bid {} INR",
                        product.name.to_uppercase(),
                        product.quantity,
                        listing.current_bid
                    )?;
                }
                Ok(())
            }
            Self::Failed(why) => write!(f, "{why}"),
        }
    }
}

/// Keeps the list of products open for bidding up to date.
pub struct MarketplaceRefresher<S> {
    source: S,
    publisher: Publisher<MarketView>,
    tick: Duration,
}

impl<S: MarketplaceSource> MarketplaceRefresher<S> {
    pub fn new(source: S, publisher: Publisher<MarketView>) -> Self {
        Self {
            source,
            publisher,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

#[async_trait]
impl<S: MarketplaceSource> Refresher for MarketplaceRefresher<S> {
    type Error = ApiError;

    fn name(&self) -> &'static str {
        "marketplace"
    }

    async fn run(&mut self) -> Result<Continuation, Self::Error> {
        let fetched = futures::try_join!(self.source.products(), self.source.bids());
        match fetched {
            Ok((products, bids)) => {
                self.publisher
                    .publish(MarketView::Ready(bid_listings(&bids, &products)));
                Ok(Continuation::Continue)
            }
            Err(why) => {
                self.publisher.publish(MarketView::Failed(why.to_string()));
                Err(why)
            }
        }
    }

    fn tick(&self) -> Duration {
        self.tick
    }
}
