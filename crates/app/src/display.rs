use itertools::Itertools;
use model::{
    shipment::{Participant, Shipment},
    WithId,
};
use refresh::{marketplace::MarketView, tracking::TrackingView};

/// Text of the tracking screen. Everything except a ready view is a single
/// status line.
pub fn tracking_screen(view: &TrackingView) -> String {
    let TrackingView::Ready {
        shipment,
        route,
        fix,
        progress,
    } = view
    else {
        return view.to_string();
    };
    let mut lines = vec![
        format!("Shipment {shipment}"),
        format!(
            "Current location: {} ({})",
            fix.position,
            fix.received_at.format("%H:%M:%S")
        ),
    ];
    if let Some(bounds) = route.bounds() {
        lines.push(format!("Map center: {}", bounds.center()));
    }
    if !route.halts().is_empty() {
        lines.push(format!(
            "Halts: {}",
            route.halts().iter().map(|halt| format!("({halt})")).join(" ")
        ));
    }
    lines.push(progress.to_string());
    lines.join("\n")
}

pub fn market_screen(view: &MarketView) -> String {
    view.to_string().trim_end().to_owned()
}

/// One line per shipment with the part the user plays in it.
pub fn shipment_list<'a, I>(shipments: I) -> String
where
    I: IntoIterator<Item = (&'a WithId<Shipment>, Participant)>,
{
    shipments
        .into_iter()
        .map(|(shipment, part)| {
            format!(
                "#{} as {:?}: {}",
                shipment.id, part, shipment.content.status
            )
        })
        .join("\n")
}
