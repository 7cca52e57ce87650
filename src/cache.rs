// File-system connection cache
//
// One process-wide cache object owns every open file-system connection,
// keyed by (host, port). A single mutex guards the lookup table; it is
// held across the initial connect (no connection exists yet to wait on)
// and for plain map reads afterwards, never across I/O on an existing
// handle. Teardown closes everything and logs failures instead of
// raising them.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use log::{debug, error};
use parking_lot::Mutex;

use crate::config::Flags;

/// Opens and closes connections to one kind of file system.
pub trait Connector {
    /// Live connection handle.
    type Handle;
    /// Connect/disconnect failure, rendered into logs.
    type Error: Display;

    fn connect(&self, host: &str, port: u16) -> Result<Self::Handle, Self::Error>;
    fn disconnect(&self, host: &str, port: u16, handle: &Self::Handle) -> Result<(), Self::Error>;
}

/// Cache of open connections, one per (host, port).
pub struct ConnectionCache<C: Connector> {
    connector: C,
    default_host: String,
    default_port: u16,
    connections: Mutex<HashMap<(String, u16), Arc<C::Handle>>>,
}

impl<C: Connector> ConnectionCache<C> {
    pub fn new(connector: C, flags: &Flags) -> Self {
        ConnectionCache {
            connector,
            default_host: flags.default_fs_host.clone(),
            default_port: flags.default_fs_port,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// The cached handle for (host, port), connecting on first use.
    pub fn get(&self, host: &str, port: u16) -> Result<Arc<C::Handle>, C::Error> {
        let mut connections = self.connections.lock();
        if let Some(handle) = connections.get(&(host.to_string(), port)) {
            return Ok(Arc::clone(handle));
        }
        debug!("opening connection to {host}:{port}");
        let handle = Arc::new(self.connector.connect(host, port)?);
        connections.insert((host.to_string(), port), Arc::clone(&handle));
        Ok(handle)
    }

    /// The handle for the configured default file system.
    pub fn get_default(&self) -> Result<Arc<C::Handle>, C::Error> {
        let host = self.default_host.clone();
        self.get(&host, self.default_port)
    }

    /// Number of distinct open connections.
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Connector> Drop for ConnectionCache<C> {
    fn drop(&mut self) {
        let mut connections = self.connections.lock();
        for ((host, port), handle) in connections.drain() {
            if let Err(err) = self.connector.disconnect(&host, port, &handle) {
                error!("failed to close connection to {host}:{port}: {err}");
            }
        }
    }
}
