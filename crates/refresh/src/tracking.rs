use std::{fmt, sync::Arc, time::Duration};

use ::tracking::{RemainingPolicy, RouteProgressTracker};
use async_trait::async_trait;
use backend::{ApiError, ApiResult};
use model::{
    geo::{GeoPoint, LiveFix},
    progress::ProgressState,
    route::{Route, RouteRecord},
    shipment::Shipment,
};
use utility::id::Id;

use crate::{
    refresher::{Continuation, Refresher, DEFAULT_TICK},
    source::TrackingSource,
    Publisher,
};

/// What the map shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TrackingView {
    #[default]
    Loading,
    /// None of the user's shipments is on the road.
    NotStarted,
    Ready {
        shipment: Id<Shipment>,
        route: Arc<Route>,
        fix: LiveFix,
        progress: ProgressState,
    },
    Failed(String),
}

impl fmt::Display for TrackingView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading..."),
            Self::NotStarted => write!(f, "The shipment has not begun."),
            Self::Ready { progress, .. } => write!(f, "{progress}"),
            Self::Failed(why) => write!(f, "{why}"),
        }
    }
}

/// Follows the user's active shipment: on each tick it fetches the route
/// record, takes its current location as the live fix and publishes the
/// progress along the route.
pub struct TrackingRefresher<S> {
    source: S,
    publisher: Publisher<TrackingView>,
    policy: RemainingPolicy,
    tick: Duration,
    tracker: Option<RouteProgressTracker>,
    cached: Option<((GeoPoint, GeoPoint), Arc<Route>)>,
}

impl<S: TrackingSource> TrackingRefresher<S> {
    pub fn new(source: S, publisher: Publisher<TrackingView>) -> Self {
        Self {
            source,
            publisher,
            policy: RemainingPolicy::default(),
            tick: DEFAULT_TICK,
            tracker: None,
            cached: None,
        }
    }

    pub fn with_policy(mut self, policy: RemainingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Road route between the record's source and destination with the
    /// record's current halts, or the direct path if no road route can be had.
    /// Only the bare road geometry is kept per source/destination pair, halts
    /// are taken fresh from the record on every tick.
    async fn route_for(&mut self, record: &RouteRecord) -> ApiResult<Arc<Route>> {
        let (start, end) = (record.source()?, record.destination()?);
        let halts = record.halts()?;
        let cached = self
            .cached
            .as_ref()
            .filter(|(key, _)| *key == (start, end))
            .map(|(_, road)| road.clone());
        let road = match cached {
            Some(road) => Some(road),
            None => self.fetch_road(start, end).await,
        };
        let route = match road {
            Some(road) => Route::clone(&road).with_halts(halts),
            None => record.direct_route()?,
        };
        Ok(Arc::new(route))
    }

    /// Asks the provider for a road route. Nothing is cached unless the
    /// provider answered with a usable route, so it is asked again next tick.
    async fn fetch_road(&mut self, start: GeoPoint, end: GeoPoint) -> Option<Arc<Route>> {
        match self.source.directions(&start, &end).await? {
            Ok(directions) if !directions.route.is_empty() => {
                log::debug!(
                    "road route from {start} to {end}: {} points, {:.0} m",
                    directions.route.len(),
                    directions.distance_meters
                );
                let road = Arc::new(directions.route);
                self.cached = Some(((start, end), road.clone()));
                Some(road)
            }
            Ok(_) => {
                log::warn!("empty road route from {start} to {end}, using direct path");
                None
            }
            Err(why) => {
                log::warn!("no road route from {start} to {end}, using direct path: {why}");
                None
            }
        }
    }

    async fn refresh(&mut self) -> ApiResult<TrackingView> {
        let Some(shipment) = self.source.active_shipment().await? else {
            return Ok(TrackingView::NotStarted);
        };
        let record = self.source.route_record(&shipment.content.route_id).await?;
        let fix = LiveFix::new(record.content.current_location()?);
        let route = self.route_for(&record.content).await?;

        let policy = self.policy;
        let tracker = self
            .tracker
            .get_or_insert_with(|| RouteProgressTracker::new(route.clone()).with_policy(policy));
        if tracker.reset(route) {
            log::info!("shipment {} follows a new route", shipment.id);
        }
        let progress = tracker.update(&fix)?;
        Ok(TrackingView::Ready {
            shipment: shipment.id,
            route: tracker.route().clone(),
            fix,
            progress,
        })
    }
}

#[async_trait]
impl<S: TrackingSource> Refresher for TrackingRefresher<S> {
    type Error = ApiError;

    fn name(&self) -> &'static str {
        "shipment tracking"
    }

    async fn run(&mut self) -> Result<Continuation, Self::Error> {
        match self.refresh().await {
            Ok(view) => {
                self.publisher.publish(view);
                Ok(Continuation::Continue)
            }
            Err(why) => {
                self.publisher.publish(TrackingView::Failed(why.to_string()));
                Err(why)
            }
        }
    }

    fn tick(&self) -> Duration {
        self.tick
    }
}
