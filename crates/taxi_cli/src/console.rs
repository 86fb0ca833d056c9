//! Console rendering of trip events.

use std::io::Write;
use std::sync::Mutex;

use taxi_core::clock::minute_to_clock;
use taxi_core::events::{TripCompleted, TripObserver, TripStarted};
use taxi_core::registry::FleetStatus;
use tracing::warn;

const RULE_WIDTH: usize = 70;

/// `(free, busy)` listings, `None` when a side is empty.
pub fn format_fleet(status: &FleetStatus) -> (String, String) {
    let free: Vec<String> = status.available.iter().map(|id| format!("Taxi-{id}")).collect();
    let busy: Vec<String> = status
        .busy
        .iter()
        .map(|(taxi, client)| format!("Taxi-{taxi}(Client-{client})"))
        .collect();
    (join_or_none(&free), join_or_none(&busy))
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

pub fn render_started<W: Write>(
    out: &mut W,
    event: &TripStarted,
    day_minutes: u64,
) -> std::io::Result<()> {
    let (free, busy) = format_fleet(&event.fleet);
    writeln!(out)?;
    writeln!(out, "Taxi-{} starts service with Client-{}", event.taxi_id, event.client_id)?;
    writeln!(out, "Start time: {}", minute_to_clock(event.start_minute, day_minutes))?;
    writeln!(out, "Expected end: {}", minute_to_clock(event.expected_end_minute, day_minutes))?;
    writeln!(
        out,
        "Origin: ({:.2}, {:.2}) -> Destination: ({:.2}, {:.2})",
        event.origin.x, event.origin.y, event.destination.x, event.destination.y
    )?;
    writeln!(
        out,
        "Distance: {:.2} km | Duration: {} min",
        event.distance, event.duration_minutes
    )?;
    writeln!(out, "Free taxis: {free}")?;
    writeln!(out, "Busy taxis: {busy}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

pub fn render_completed<W: Write>(
    out: &mut W,
    event: &TripCompleted,
    day_minutes: u64,
) -> std::io::Result<()> {
    let (free, busy) = format_fleet(&event.fleet);
    writeln!(
        out,
        "Service finished | Client-{} -> Taxi-{}",
        event.client_id, event.taxi_id
    )?;
    writeln!(out, "End time: {}", minute_to_clock(event.end_minute, day_minutes))?;
    writeln!(out, "Fare: {:.2} € | Rating: {}", event.fare, event.rating)?;
    writeln!(out, "Free taxis: {free}")?;
    writeln!(out, "Busy taxis: {busy}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Writes each event as one uninterrupted block.
///
/// Times past `day_minutes` carry a day suffix.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
    day_minutes: u64,
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W, day_minutes: u64) -> Self {
        Self {
            out: Mutex::new(out),
            day_minutes,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().expect("console mutex poisoned")
    }

    fn emit<F>(&self, render: F)
    where
        F: FnOnce(&mut W) -> std::io::Result<()>,
    {
        let mut out = self.out.lock().expect("console mutex poisoned");
        if let Err(err) = render(&mut *out).and_then(|()| out.flush()) {
            warn!(%err, "failed to write trip event");
        }
    }
}

impl<W: Write + Send> TripObserver for ConsoleReporter<W> {
    fn trip_started(&self, event: &TripStarted) {
        self.emit(|out| render_started(out, event, self.day_minutes));
    }

    fn trip_completed(&self, event: &TripCompleted) {
        self.emit(|out| render_completed(out, event, self.day_minutes));
    }
}
