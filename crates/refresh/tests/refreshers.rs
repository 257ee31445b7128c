use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use backend::{model::directions::Directions, shipments::find_active, ApiError, ApiResult};
use model::{
    geo::GeoPoint,
    product::{Bid, Product},
    route::{Route, RouteRecord},
    shipment::Shipment,
    WithId,
};
use refresh::{
    channel,
    marketplace::{MarketView, MarketplaceRefresher},
    source::{MarketplaceSource, TrackingSource},
    spawn,
    tracking::{TrackingRefresher, TrackingView},
    Continuation, Refresher,
};
use tracking::RemainingPolicy;
use utility::id::Id;

const USER: u64 = 3;

#[derive(Default)]
struct State {
    shipments: Vec<WithId<Shipment>>,
    record: Option<WithId<RouteRecord>>,
    directions: Option<Result<Directions, String>>,
    directions_calls: usize,
    offline: bool,
}

#[derive(Clone, Default)]
struct FakeSource(Arc<Mutex<State>>);

impl FakeSource {
    fn with(&self, change: impl FnOnce(&mut State)) {
        change(&mut self.0.lock().unwrap());
    }

    fn directions_calls(&self) -> usize {
        self.0.lock().unwrap().directions_calls
    }

    fn check_online(&self) -> ApiResult<()> {
        if self.0.lock().unwrap().offline {
            return Err(ApiError::Unavailable("backend".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackingSource for FakeSource {
    async fn active_shipment(&self) -> ApiResult<Option<WithId<Shipment>>> {
        self.check_online()?;
        let state = self.0.lock().unwrap();
        Ok(find_active(&state.shipments, &Id::new(USER), None).cloned())
    }

    async fn route_record(&self, id: &Id<RouteRecord>) -> ApiResult<WithId<RouteRecord>> {
        self.check_online()?;
        let state = self.0.lock().unwrap();
        state
            .record
            .clone()
            .filter(|record| record.id == *id)
            .ok_or_else(|| ApiError::Unavailable(format!("route {id}")))
    }

    async fn directions(
        &self,
        _start: &GeoPoint,
        _end: &GeoPoint,
    ) -> Option<ApiResult<Directions>> {
        let mut state = self.0.lock().unwrap();
        let answer = state.directions.clone()?;
        state.directions_calls += 1;
        Some(answer.map_err(ApiError::Rejected))
    }
}

#[async_trait]
impl MarketplaceSource for FakeSource {
    async fn products(&self) -> ApiResult<Vec<WithId<Product>>> {
        self.check_online()?;
        Ok(serde_json::from_str(
            r#"[{"id": 1, "name": "Rice", "details": "Ponni", "quantity": "500"},
                {"id": 2, "name": "Turmeric", "details": "Erode", "quantity": 120}]"#,
        )
        .unwrap())
    }

    async fn bids(&self) -> ApiResult<Vec<WithId<Bid>>> {
        self.check_online()?;
        Ok(serde_json::from_str(
            r#"[{"id": 7, "product_id": 2, "current_bid": "4000"},
                {"id": 8, "product_id": 2, "current_bid": 4500}]"#,
        )
        .unwrap())
    }
}

fn shipment(status: &str) -> Vec<WithId<Shipment>> {
    serde_json::from_str(&format!(
        r#"[{{"id": 9, "seller_id": "{USER}", "buyer_id": "8", "driver_id": "2",
              "device_id": "5", "product_id": "11", "route_id": "21", "status": "{status}"}}]"#
    ))
    .unwrap()
}

fn record(destination: GeoPoint, fix: GeoPoint) -> WithId<RouteRecord> {
    let mut record = RouteRecord::new(GeoPoint::new(0.0, 0.0), destination, &[]);
    record.current_location = fix.into();
    WithId::new(Id::new(21), record)
}

fn on_the_road() -> FakeSource {
    let source = FakeSource::default();
    source.with(|state| {
        state.shipments = shipment("OP");
        state.record = Some(record(GeoPoint::new(0.0, 1.0), GeoPoint::new(0.0, 0.25)));
    });
    source
}

fn road() -> Directions {
    let points = (0..=4)
        .map(|i| GeoPoint::new(0.0, i as f64 * 0.25))
        .collect();
    Directions {
        route: Route::new(points),
        distance_meters: 111_195.0,
    }
}

#[tokio::test]
async fn no_shipment_on_the_road() {
    let source = FakeSource::default();
    source.with(|state| state.shipments = shipment("SC"));
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source, publisher);

    assert_eq!(*view.borrow(), TrackingView::Loading);
    assert_eq!(refresher.run().await.unwrap(), Continuation::Continue);
    assert_eq!(*view.borrow(), TrackingView::NotStarted);
    assert_eq!(view.borrow().to_string(), "The shipment has not begun.");
}

#[tokio::test]
async fn direct_path_without_provider() {
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(on_the_road(), publisher)
        .with_policy(RemainingPolicy::TraveledSubtraction);
    refresher.run().await.unwrap();

    let TrackingView::Ready {
        shipment,
        route,
        fix,
        progress,
    } = view.borrow().clone()
    else {
        panic!("expected a ready view");
    };
    assert_eq!(shipment.raw(), 9);
    assert_eq!(route.len(), 2);
    assert_eq!(fix.position, GeoPoint::new(0.0, 0.25));
    assert_eq!(progress.closest_route_index, 0);
    assert_eq!(progress.remaining_distance_meters, route.length_meters());
    assert!(view.borrow().to_string().starts_with("Remaining Distance: "));
}

#[tokio::test]
async fn road_routes_are_cached() {
    let source = on_the_road();
    source.with(|state| state.directions = Some(Ok(road())));
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source.clone(), publisher);

    refresher.run().await.unwrap();
    refresher.run().await.unwrap();
    assert_eq!(source.directions_calls(), 1);

    let TrackingView::Ready { route, progress, .. } = view.borrow().clone() else {
        panic!("expected a ready view");
    };
    assert_eq!(route.len(), 5);
    assert_eq!(progress.closest_route_index, 1);
    let expected = GeoPoint::new(0.0, 0.25).distance_to(&GeoPoint::new(0.0, 1.0));
    assert!((progress.remaining_distance_meters - expected).abs() < 1e-6);
}

#[tokio::test]
async fn provider_failure_falls_back_to_direct_path() {
    let source = on_the_road();
    source.with(|state| state.directions = Some(Err("quota exceeded".to_owned())));
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source.clone(), publisher);

    refresher.run().await.unwrap();
    refresher.run().await.unwrap();
    assert_eq!(source.directions_calls(), 2);
    assert!(matches!(&*view.borrow(), TrackingView::Ready { route, .. } if route.len() == 2));
}

#[tokio::test]
async fn new_destination_replaces_the_route() {
    let source = on_the_road();
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source.clone(), publisher);
    refresher.run().await.unwrap();

    source.with(|state| {
        state.record = Some(record(GeoPoint::new(0.0, 2.0), GeoPoint::new(0.0, 0.25)))
    });
    refresher.run().await.unwrap();
    let TrackingView::Ready { route, .. } = view.borrow().clone() else {
        panic!("expected a ready view");
    };
    assert_eq!(route.destination(), Some(&GeoPoint::new(0.0, 2.0)));
}

fn add_halt(source: &FakeSource) {
    source.with(|state| {
        let mut record = RouteRecord::new(
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            &[GeoPoint::new(0.1, 0.5)],
        );
        record.current_location = GeoPoint::new(0.0, 0.25).into();
        state.record = Some(WithId::new(Id::new(21), record));
    });
}

fn ready_route(view: &TrackingView) -> Arc<Route> {
    let TrackingView::Ready { route, .. } = view else {
        panic!("expected a ready view");
    };
    route.clone()
}

#[tokio::test]
async fn new_halts_show_on_the_direct_path() {
    let source = on_the_road();
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source.clone(), publisher);
    refresher.run().await.unwrap();
    assert!(ready_route(&view.borrow()).halts().is_empty());

    add_halt(&source);
    refresher.run().await.unwrap();
    assert_eq!(
        ready_route(&view.borrow()).halts(),
        &[GeoPoint::new(0.1, 0.5)]
    );
}

#[tokio::test]
async fn new_halts_show_on_a_cached_road() {
    let source = on_the_road();
    source.with(|state| state.directions = Some(Ok(road())));
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source.clone(), publisher);
    refresher.run().await.unwrap();
    assert!(ready_route(&view.borrow()).halts().is_empty());

    add_halt(&source);
    refresher.run().await.unwrap();
    let route = ready_route(&view.borrow());
    assert_eq!(source.directions_calls(), 1);
    assert_eq!(route.len(), 5);
    assert_eq!(route.halts(), &[GeoPoint::new(0.1, 0.5)]);
}

#[tokio::test]
async fn failures_are_published() {
    let source = on_the_road();
    source.with(|state| state.offline = true);
    let (publisher, view) = channel(TrackingView::default());
    let mut refresher = TrackingRefresher::new(source, publisher);

    assert!(refresher.run().await.is_err());
    assert_eq!(
        *view.borrow(),
        TrackingView::Failed("backend is not available".to_owned())
    );
}

#[tokio::test]
async fn spawned_refresher_publishes_until_stopped() {
    let source = on_the_road();
    let (publisher, mut view) = channel(TrackingView::default());
    let handle = spawn(move || {
        TrackingRefresher::new(source.clone(), publisher.clone())
            .with_tick(Duration::from_millis(10))
    });

    tokio::time::timeout(
        Duration::from_secs(5),
        view.wait_for(|view| matches!(view, TrackingView::Ready { .. })),
    )
    .await
    .expect("no ready view published")
    .unwrap();

    handle.stop();
    handle.join().await;
}

#[tokio::test]
async fn marketplace_lists_highest_bids() {
    let source = FakeSource::default();
    let (publisher, view) = channel(MarketView::default());
    let mut refresher = MarketplaceRefresher::new(source.clone(), publisher);

    refresher.run().await.unwrap();
    match &*view.borrow() {
        MarketView::Ready(listings) => {
            assert_eq!(listings.len(), 1);
            assert_eq!(listings[0].product.content.name, "Turmeric");
            assert_eq!(listings[0].current_bid, 4500.0);
        }
        other => panic!("unexpected view {other:?}"),
    }

    source.with(|state| state.offline = true);
    assert!(refresher.run().await.is_err());
    assert!(matches!(&*view.borrow(), MarketView::Failed(_)));
}
