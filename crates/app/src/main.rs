use app::{
    config::AppConfig,
    display::{market_screen, shipment_list, tracking_screen},
};
use backend::{
    auth, directions::DirectionsClient, shipments, BackendClient, SessionManager,
};
use refresh::{
    channel,
    marketplace::{MarketView, MarketplaceRefresher},
    source::BackendSource,
    spawn,
    tracking::{TrackingRefresher, TrackingView},
};

#[tokio::main]
async fn main() {
    env_logger::init();

    // configuration
    let config = AppConfig::from_env()
        .expect("expected BACKEND_URL, LOGIN_PHONE and LOGIN_PASSWORD in env.");
    let client = BackendClient::new(&config.backend).expect("could not build http client.");
    let directions = match &config.directions {
        Some(directions) => Some(
            DirectionsClient::new(directions).expect("could not build directions client."),
        ),
        None => {
            log::info!("No DIRECTIONS_API_KEY set, tracking along direct paths.");
            None
        }
    };

    // session
    let sessions = SessionManager::new();
    let session = match auth::login(&client, &sessions, &config.credentials).await {
        Ok(session) => session,
        Err(why) => {
            eprintln!("Login failed: {why}");
            return;
        }
    };
    match shipments::get_shipments(&client).await {
        Ok(all) => {
            let mine = all.iter().filter_map(|shipment| {
                shipment
                    .content
                    .participant(session.user_id(), session.driver.as_ref())
                    .map(|part| (shipment, part))
            });
            println!("{}", shipment_list(mine));
        }
        Err(why) => log::error!("could not list shipments: {why}"),
    }

    // refreshers
    let source = BackendSource {
        client,
        sessions: sessions.clone(),
        directions,
    };
    let tick = config.poll_interval;
    let policy = config.policy;
    let (tracking_publisher, mut tracking_view) = channel(TrackingView::default());
    let tracking = {
        let source = source.clone();
        spawn(move || {
            TrackingRefresher::new(source.clone(), tracking_publisher.clone())
                .with_policy(policy)
                .with_tick(tick)
        })
    };
    let (market_publisher, mut market_view) = channel(MarketView::default());
    let marketplace = spawn(move || {
        MarketplaceRefresher::new(source.clone(), market_publisher.clone()).with_tick(tick)
    });

    // display
    loop {
        tokio::select! {
            Ok(()) = tracking_view.changed() => {
                println!("{}", tracking_screen(&tracking_view.borrow_and_update()));
            }
            Ok(()) = market_view.changed() => {
                println!("{}", market_screen(&market_view.borrow_and_update()));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracking.stop();
    marketplace.stop();
    tracking.join().await;
    marketplace.join().await;
    auth::logout(&sessions).await;
}
