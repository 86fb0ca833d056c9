//! End-of-day summary built from the final fleet snapshot.

use std::io::Write;

use serde::Serialize;
use taxi_core::registry::{Taxi, TaxiId};
use taxi_core::runner::SimulationOutcome;

/// One row of the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxiSummary {
    pub taxi_id: TaxiId,
    pub services: u32,
    pub earnings: f64,
    pub average_rating: f64,
}

impl From<&Taxi> for TaxiSummary {
    fn from(taxi: &Taxi) -> Self {
        Self {
            taxi_id: taxi.id,
            services: taxi.services,
            earnings: taxi.earnings,
            average_rating: taxi.average_rating(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalReport {
    pub seed: u64,
    pub final_minute: u64,
    pub total_trips: u32,
    pub total_earnings: f64,
    pub dispatch_misses: u32,
    pub taxis: Vec<TaxiSummary>,
    pub top_earner: Option<TaxiId>,
    pub top_rated: Option<TaxiId>,
}

impl FinalReport {
    pub fn from_outcome(outcome: &SimulationOutcome) -> Self {
        let taxis: Vec<TaxiSummary> = outcome.taxis.iter().map(TaxiSummary::from).collect();
        let top_earner = first_max_by(&taxis, |row| row.earnings);
        let top_rated = first_max_by(&taxis, |row| row.average_rating);
        Self {
            seed: outcome.seed,
            final_minute: outcome.final_minute,
            total_trips: outcome.total_trips(),
            total_earnings: outcome.total_earnings(),
            dispatch_misses: outcome.total_dispatch_misses(),
            taxis,
            top_earner,
            top_rated,
        }
    }

    fn row(&self, taxi_id: TaxiId) -> Option<&TaxiSummary> {
        self.taxis.iter().find(|row| row.taxi_id == taxi_id)
    }

    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "FINAL DAY SUMMARY")?;
        writeln!(out, "{}", "=".repeat(70))?;
        for row in &self.taxis {
            writeln!(
                out,
                "Taxi-{} | Services: {} | Earnings: {:.2} € | Average rating: {:.2}",
                row.taxi_id, row.services, row.earnings, row.average_rating
            )?;
        }
        writeln!(out, "{}", "-".repeat(70))?;
        writeln!(
            out,
            "Trips: {} | Revenue: {:.2} € | Dispatch misses: {} | Seed: {}",
            self.total_trips, self.total_earnings, self.dispatch_misses, self.seed
        )?;
        if let Some(row) = self.top_earner.and_then(|id| self.row(id)) {
            writeln!(out, "Top earner: Taxi-{} ({:.2} €)", row.taxi_id, row.earnings)?;
        }
        if let Some(row) = self.top_rated.and_then(|id| self.row(id)) {
            writeln!(
                out,
                "Top rated: Taxi-{} ({:.2})",
                row.taxi_id, row.average_rating
            )?;
        }
        Ok(())
    }
}

/// Earliest row holding the strict maximum of `key`.
fn first_max_by<F>(rows: &[TaxiSummary], key: F) -> Option<TaxiId>
where
    F: Fn(&TaxiSummary) -> f64,
{
    let mut best: Option<(&TaxiSummary, f64)> = None;
    for row in rows {
        let value = key(row);
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((row, value)),
        }
    }
    best.map(|(row, _)| row.taxi_id)
}
