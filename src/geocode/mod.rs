//! Reverse geocoding against Nominatim.

mod client;
mod response;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::{build_session, GeocodeClient};
pub use response::{AddressDetails, ReverseResponse};

use async_trait::async_trait;

use crate::models::{Coordinate, LookupResult};

/// Resolves a coordinate to a street/neighborhood pair.
///
/// Implementations never fail: unresolvable coordinates produce the
/// not-found placeholders.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn lookup(&self, coordinate: Coordinate) -> LookupResult;
}
