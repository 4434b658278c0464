//! Mutex-guarded network handle for callers that share one network.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::network_error::NetworkError;
use crate::topology::network::Network;

/// Cloneable handle; every read and edit runs under the lock, so no caller
/// observes a half-applied mutation.
#[derive(Clone, Debug)]
pub struct SharedNetwork {
    inner: Arc<Mutex<Network>>,
}

impl SharedNetwork {
    pub fn new(net: Network) -> Self {
        Self {
            inner: Arc::new(Mutex::new(net)),
        }
    }

    /// Run a mutator under the lock.
    pub fn edit<R>(
        &self,
        f: impl FnOnce(&mut Network) -> Result<R, NetworkError>,
    ) -> Result<R, NetworkError> {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Run a query under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Network) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }

    /// Take the network back if this is the last handle.
    pub fn try_unwrap(self) -> Result<Network, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
