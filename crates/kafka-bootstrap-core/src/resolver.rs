//! Seed broker resolution.
//!
//! A [`SeedResolver`] turns a [`BrokerSource`] into one broker address per
//! call:
//!
//! - Static sources are shuffled exactly once at construction, then rotated
//!   through with an atomic cursor so repeated connection attempts spread
//!   across all seeds without re-randomizing.
//! - Dynamic and discovery sources re-invoke their callback on every call
//!   and make an independent random choice from the fresh list; no state
//!   persists between calls.
//!
//! An explicit target bypasses all of the above.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::SaslConfig;
use crate::error::{ConfigError, ConfigResult, ConnectionError, Result};
use crate::source::{BrokerAddress, BrokerLookup, BrokerSource, ClusterDiscovery, TargetBroker};

/// Permutation primitive applied to candidate lists.
///
/// The default shuffles uniformly via `rand::thread_rng()`; tests pin a
/// no-op to make the order deterministic.
pub type ShuffleFn = fn(&mut [BrokerAddress]);

fn thread_rng_shuffle(brokers: &mut [BrokerAddress]) {
    brokers.shuffle(&mut rand::thread_rng());
}

/// Outcome of a single resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The broker to contact.
    pub address: BrokerAddress,
    /// Auth settings scoped to the connection built from this resolution.
    /// Only ever set by discovery sources.
    pub auth_override: Option<SaslConfig>,
}

impl Resolution {
    fn address_only(address: BrokerAddress) -> Self {
        Self {
            address,
            auth_override: None,
        }
    }
}

/// Strategy-specific state, fixed at construction.
enum SourceState {
    Static {
        /// Permutation of the seeds, computed once and never recomputed.
        order: Vec<BrokerAddress>,
        /// Rotation cursor; capture-and-increment is a single atomic step.
        cursor: AtomicUsize,
    },
    Dynamic(Arc<dyn BrokerLookup>),
    Discovery(Arc<dyn ClusterDiscovery>),
}

/// Resolves which broker a client should contact next.
///
/// Constructed once per client session; holds no ownership over the
/// connections built from its resolutions.
pub struct SeedResolver {
    state: SourceState,
    shuffle: ShuffleFn,
}

impl SeedResolver {
    /// Create a resolver with the default uniform shuffle.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoBrokers`] for an empty static seed list and
    /// [`ConfigError::InvalidAddress`] for a malformed static seed. Dynamic
    /// and discovery sources carry no upfront list; their validity is
    /// deferred to the first resolution.
    pub fn new(source: BrokerSource) -> ConfigResult<Self> {
        Self::with_shuffle(source, thread_rng_shuffle)
    }

    /// Create a resolver with an explicit permutation primitive.
    ///
    /// # Errors
    ///
    /// Same as [`SeedResolver::new`].
    pub fn with_shuffle(source: BrokerSource, shuffle: ShuffleFn) -> ConfigResult<Self> {
        let state = match source {
            BrokerSource::Static(seeds) => {
                if seeds.is_empty() {
                    return Err(ConfigError::NoBrokers);
                }
                let mut order = seeds
                    .iter()
                    .map(|s| s.parse::<BrokerAddress>())
                    .collect::<ConfigResult<Vec<_>>>()?;
                shuffle(&mut order);
                SourceState::Static {
                    order,
                    cursor: AtomicUsize::new(0),
                }
            }
            BrokerSource::Dynamic(lookup) => SourceState::Dynamic(lookup),
            BrokerSource::Discovery(discovery) => SourceState::Discovery(discovery),
        };
        Ok(Self { state, shuffle })
    }

    /// Number of seeds in a static rotation, if this resolver rotates.
    #[must_use]
    pub fn seed_count(&self) -> Option<usize> {
        match &self.state {
            SourceState::Static { order, .. } => Some(order.len()),
            _ => None,
        }
    }

    /// Resolve one broker address.
    ///
    /// An explicit `target` is used verbatim and bypasses all source logic,
    /// regardless of the configured source. Otherwise the strategy decides:
    /// static rotation, or a fresh callback invocation for dynamic and
    /// discovery sources. Completes without suspension for explicit targets
    /// and static sources.
    ///
    /// # Errors
    ///
    /// Returns a retriable [`ConnectionError`] when a dynamic or discovery
    /// callback fails, yields no brokers, or yields a malformed address.
    pub async fn resolve(&self, target: Option<&TargetBroker>) -> Result<Resolution> {
        if let Some(target) = target {
            return Ok(Resolution::address_only(target.address()));
        }

        match &self.state {
            SourceState::Static { order, cursor } => {
                let index = cursor.fetch_add(1, Ordering::Relaxed) % order.len();
                let address = order[index].clone();
                debug!(broker = %address, index, "rotated to seed broker");
                Ok(Resolution::address_only(address))
            }
            SourceState::Dynamic(lookup) => {
                let brokers = lookup
                    .lookup()
                    .await
                    .map_err(|source| ConnectionError::Lookup { source })?;
                let address = self.pick_random(brokers)?;
                debug!(broker = %address, "selected dynamic broker");
                Ok(Resolution::address_only(address))
            }
            SourceState::Discovery(discovery) => {
                let response = discovery
                    .discover()
                    .await
                    .map_err(|source| ConnectionError::Lookup { source })?;
                let address = self.pick_random(response.brokers)?;
                debug!(
                    broker = %address,
                    auth_override = response.auth_override.is_some(),
                    "selected discovered broker"
                );
                Ok(Resolution {
                    address,
                    auth_override: response.auth_override,
                })
            }
        }
    }

    /// Parse a fresh candidate list, shuffle it, and take the first entry.
    fn pick_random(&self, brokers: Vec<String>) -> Result<BrokerAddress> {
        if brokers.is_empty() {
            return Err(ConnectionError::NoBrokersAvailable);
        }
        let mut candidates = brokers
            .iter()
            .map(|s| {
                s.parse::<BrokerAddress>()
                    .map_err(|_| ConnectionError::InvalidBrokerAddress(s.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        (self.shuffle)(&mut candidates);
        Ok(candidates.swap_remove(0))
    }
}
