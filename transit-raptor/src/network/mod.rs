//! In-memory transit network.
//!
//! A read-only implementation of [`TransitDataProvider`] built with
//! [`TransitNetworkBuilder`] or loaded from JSON.

mod builder;
mod dto;
mod error;

use std::path::Path;

use crate::domain::{ConstrainedTransferIndex, Route, Transfer};
use crate::rangeraptor::TransitDataProvider;

pub use builder::TransitNetworkBuilder;
pub use dto::{ConstrainedTransferDto, NetworkDto, RouteDto, TransferDto, TripDto};
pub use error::NetworkError;

/// Stops, routes and transfers, indexed for the search.
#[derive(Debug, Clone)]
pub struct TransitNetwork {
    stop_names: Vec<String>,
    routes: Vec<Route>,
    routes_by_stop: Vec<Vec<usize>>,
    transfers_from: Vec<Vec<Transfer>>,
    transfers_to: Vec<Vec<Transfer>>,
    constrained: ConstrainedTransferIndex,
}

impl TransitNetwork {
    fn new(
        stop_names: Vec<String>,
        routes: Vec<Route>,
        transfers: Vec<Transfer>,
        constrained: ConstrainedTransferIndex,
    ) -> Self {
        let n = stop_names.len();
        let mut routes_by_stop = vec![Vec::new(); n];
        for (index, route) in routes.iter().enumerate() {
            for &stop in route.pattern().stops() {
                // Loops visit a stop twice; list the route once.
                if routes_by_stop[stop].last() != Some(&index) {
                    routes_by_stop[stop].push(index);
                }
            }
        }

        let mut transfers_from = vec![Vec::new(); n];
        let mut transfers_to = vec![Vec::new(); n];
        for transfer in transfers {
            transfers_from[transfer.from_stop].push(transfer);
            transfers_to[transfer.to_stop].push(transfer);
        }

        Self {
            stop_names,
            routes,
            routes_by_stop,
            transfers_from,
            transfers_to,
            constrained,
        }
    }

    pub fn builder() -> TransitNetworkBuilder {
        TransitNetworkBuilder::new()
    }

    /// Parse and validate a network from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, NetworkError> {
        let dto: NetworkDto = serde_json::from_str(json)?;
        Ok(dto.into_builder()?.build())
    }

    /// Read a network from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find a stop index by name.
    pub fn stop_index(&self, name: &str) -> Option<usize> {
        self.stop_names.iter().position(|s| s == name)
    }
}

impl TransitDataProvider for TransitNetwork {
    fn number_of_stops(&self) -> usize {
        self.stop_names.len()
    }

    fn route_indexes_for_stops(&self, stops: &[usize]) -> Vec<usize> {
        let mut seen = vec![false; self.routes.len()];
        for &stop in stops {
            for &route in &self.routes_by_stop[stop] {
                seen[route] = true;
            }
        }
        seen.iter()
            .enumerate()
            .filter(|&(_, &s)| s)
            .map(|(route, _)| route)
            .collect()
    }

    fn number_of_routes(&self) -> usize {
        self.routes.len()
    }

    fn route(&self, index: usize) -> &Route {
        &self.routes[index]
    }

    fn transfers_from_stop(&self, stop: usize) -> &[Transfer] {
        &self.transfers_from[stop]
    }

    fn transfers_to_stop(&self, stop: usize) -> &[Transfer] {
        &self.transfers_to[stop]
    }

    fn constrained_transfers(&self) -> Option<&ConstrainedTransferIndex> {
        Some(&self.constrained)
    }

    fn stop_name(&self, stop: usize) -> String {
        self.stop_names
            .get(stop)
            .cloned()
            .unwrap_or_else(|| format!("S{stop}"))
    }
}
