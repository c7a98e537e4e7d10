//! JSON representation of a transit network.
//!
//! Trips in constrained transfers are referenced by route index and trip
//! label, since timetable indices only exist after sorting.

use serde::Deserialize;

use crate::domain::{
    ClockTime, ConstrainedTransfer, Transfer, TransferDisposition, TripPattern, TripRef,
    TripSchedule,
};
use crate::rangeraptor::COST_UNIT;

use super::{NetworkError, TransitNetworkBuilder};

/// A whole network as read from JSON.
#[derive(Debug, Deserialize)]
pub struct NetworkDto {
    /// Stop names; a stop's index is its position in this list.
    pub stops: Vec<String>,

    #[serde(default)]
    pub routes: Vec<RouteDto>,

    #[serde(default)]
    pub transfers: Vec<TransferDto>,

    #[serde(default)]
    pub constrained_transfers: Vec<ConstrainedTransferDto>,
}

/// A pattern and its trips.
#[derive(Debug, Deserialize)]
pub struct RouteDto {
    pub label: String,

    /// Stop indices in visiting order.
    pub stops: Vec<usize>,

    #[serde(default)]
    pub slack_index: usize,

    pub priority_group: Option<u32>,

    /// Per-position boarding permission; defaults to everywhere.
    pub boarding: Option<Vec<bool>>,

    /// Per-position alighting permission; defaults to everywhere.
    pub alighting: Option<Vec<bool>>,

    pub trips: Vec<TripDto>,
}

/// One trip. Either `times` (arrival equals departure) or both `arrivals`
/// and `departures`.
#[derive(Debug, Deserialize)]
pub struct TripDto {
    pub label: String,

    #[serde(default)]
    pub times: Vec<ClockTime>,

    #[serde(default)]
    pub arrivals: Vec<ClockTime>,

    #[serde(default)]
    pub departures: Vec<ClockTime>,
}

/// A walk between two stops.
#[derive(Debug, Deserialize)]
pub struct TransferDto {
    pub from_stop: usize,
    pub to_stop: usize,
    /// Duration in seconds.
    pub duration: i32,
    /// Defaults to one cost unit per second walked.
    pub c1: Option<i32>,
}

/// A constrained transfer between two trips.
#[derive(Debug, Deserialize)]
pub struct ConstrainedTransferDto {
    pub from_route: usize,
    pub from_trip: String,
    pub from_stop_pos: usize,
    pub to_route: usize,
    pub to_trip: String,
    pub to_stop_pos: usize,
    pub disposition: TransferDisposition,
}

impl NetworkDto {
    /// Validate and convert into a builder.
    pub fn into_builder(self) -> Result<TransitNetworkBuilder, NetworkError> {
        let mut builder = TransitNetworkBuilder::new();
        for name in self.stops {
            builder.add_stop(name);
        }
        for route in self.routes {
            let pattern = route.pattern(builder.next_route_index())?;
            let trips = route
                .trips
                .iter()
                .map(|trip| trip.schedule(&route.label))
                .collect::<Result<Vec<_>, _>>()?;
            builder.add_route(pattern, trips)?;
        }
        for transfer in self.transfers {
            let c1 = transfer
                .c1
                .unwrap_or_else(|| transfer.duration.saturating_mul(COST_UNIT));
            builder.add_transfer(Transfer::new(
                transfer.from_stop,
                transfer.to_stop,
                transfer.duration,
                c1,
            ))?;
        }
        for transfer in self.constrained_transfers {
            let from_trip = trip_ref(&builder, transfer.from_route, &transfer.from_trip)?;
            let to_trip = trip_ref(&builder, transfer.to_route, &transfer.to_trip)?;
            builder.add_constrained_transfer(ConstrainedTransfer {
                from_trip,
                from_stop_pos: transfer.from_stop_pos,
                to_trip,
                to_stop_pos: transfer.to_stop_pos,
                disposition: transfer.disposition,
            })?;
        }
        Ok(builder)
    }
}

impl RouteDto {
    fn pattern(&self, index: usize) -> Result<TripPattern, NetworkError> {
        let mut pattern =
            TripPattern::new(index, self.stops.clone(), self.slack_index, &self.label)?;
        if self.boarding.is_some() || self.alighting.is_some() {
            let n = self.stops.len();
            pattern = pattern.with_restrictions(
                self.boarding.clone().unwrap_or_else(|| vec![true; n]),
                self.alighting.clone().unwrap_or_else(|| vec![true; n]),
            )?;
        }
        if let Some(group) = self.priority_group {
            pattern = pattern.with_priority_group(group);
        }
        Ok(pattern)
    }
}

impl TripDto {
    fn schedule(&self, route: &str) -> Result<TripSchedule, NetworkError> {
        let seconds = |times: &[ClockTime]| {
            times
                .iter()
                .map(ClockTime::seconds)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| NetworkError::Time {
                    route: route.to_string(),
                    source,
                })
        };
        let schedule = if self.times.is_empty() {
            TripSchedule::new(
                self.label.as_str(),
                seconds(&self.arrivals)?,
                seconds(&self.departures)?,
            )?
        } else {
            TripSchedule::from_times(self.label.as_str(), seconds(&self.times)?)?
        };
        Ok(schedule)
    }
}

fn trip_ref(
    builder: &TransitNetworkBuilder,
    route: usize,
    label: &str,
) -> Result<TripRef, NetworkError> {
    let trip = builder
        .route(route)?
        .trip_index_by_label(label)
        .ok_or_else(|| NetworkError::UnknownTrip {
            route,
            trip: label.to_string(),
        })?;
    Ok(TripRef::new(route, trip))
}
