//! Text and map rendering of a finished itinerary

use std::fmt::Write;

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::models::{Itinerary, Location};

/// Heading date, e.g. `Monday, June 02, 2025`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}

/// One card per day with the places in visiting order
#[must_use]
pub fn day_cards(itinerary: &Itinerary) -> String {
    let mut out = String::new();

    for day in itinerary.days() {
        let _ = writeln!(out, "Day {} - {}", day.day_index, format_date(day.date));

        if day.is_empty() {
            let _ = writeln!(out, "  Free day, nothing planned");
        }

        for (position, place) in day.places.iter().enumerate() {
            let _ = write!(out, "  {}. {} ({})", position + 1, place.name, place.category);
            if let Some(rating) = place.rating {
                let _ = write!(out, " {rating:.1}/5");
            }
            let _ = writeln!(out, ", ~{} min", place.visit_minutes);

            if let Some(hours) = &place.opening_hours {
                let _ = writeln!(out, "     Hours: {hours}");
            }
            if let Some(address) = &place.address {
                let _ = writeln!(out, "     Address: {address}");
            }
        }

        if !day.is_empty() {
            let _ = writeln!(
                out,
                "  Estimated cost: ${:.2} ({} min on site)",
                day.estimated_cost,
                day.total_visit_minutes()
            );
        }
        if let Some(notes) = &day.notes {
            let _ = writeln!(out, "  {notes}");
        }
        out.push('\n');
    }

    out
}

/// Budget table: breakdown, total, what is left and the per-person share
#[must_use]
pub fn cost_summary(itinerary: &Itinerary) -> String {
    let breakdown = itinerary.cost_breakdown();
    let mut rows: Vec<(&str, String)> = vec![
        ("Activities", format!("${:.2}", breakdown.activities)),
        ("Meals", format!("${:.2}", breakdown.meals)),
        ("Transport", format!("${:.2}", breakdown.transport)),
        ("Total", format!("${:.2}", itinerary.total_cost())),
        ("Budget", format!("${:.2}", itinerary.budget())),
    ];

    if itinerary.is_within_budget() {
        rows.push(("Remaining", format!("${:.2}", itinerary.budget_remaining())));
    } else {
        rows.push(("Over budget", format!("${:.2}", itinerary.overage())));
    }
    rows.push((
        "Budget used",
        format!("{:.1}%", itinerary.budget_used_percentage()),
    ));
    rows.push(("Per person", format!("${:.2}", itinerary.cost_per_person())));

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    let mut out = String::from("Cost summary\n");
    for (label, value) in &rows {
        let _ = writeln!(out, "  {label:<label_width$}  {value:>value_width$}");
    }

    let _ = writeln!(out, "Planned by: {}", itinerary.strategy());
    let _ = writeln!(out, "{}", itinerary.notes());
    out
}

/// GeoJSON `FeatureCollection`: the destination, every place as a point and
/// each day's route as a line
#[must_use]
pub fn map_geojson(itinerary: &Itinerary, center: &Location) -> Value {
    let mut features = vec![json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [center.longitude, center.latitude]},
        "properties": {"kind": "destination", "name": center.name},
    })];

    for (day, place) in itinerary.places() {
        features.push(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [place.longitude, place.latitude]},
            "properties": {
                "kind": "place",
                "id": place.id,
                "name": place.name,
                "category": place.category,
                "day": day.day_index,
            },
        }));
    }

    for day in itinerary.days().iter().filter(|d| d.place_count() > 1) {
        let route: Vec<[f64; 2]> = day
            .places
            .iter()
            .map(|p| [p.longitude, p.latitude])
            .collect();
        features.push(json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": route},
            "properties": {"kind": "route", "day": day.day_index, "date": day.date},
        }));
    }

    json!({"type": "FeatureCollection", "features": features})
}
