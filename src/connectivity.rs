use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

/// Answers whether a network is reachable right now.
/// Called synchronously before every remote request.
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Treats the host as online if a TCP connection to the probe address succeeds.
///
/// Resolving and connecting block the calling thread for up to `timeout` per
/// address. On a multi-threaded tokio runtime the probe runs under
/// `block_in_place` so other tasks keep moving; on a current-thread runtime
/// it blocks that thread.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    fn probe(&self) -> bool {
        let addrs = match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!(addr = %self.addr, error = %e, "probe address did not resolve");
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        debug!(addr = %self.addr, "probe failed");
        false
    }
}

impl Connectivity for TcpProbe {
    fn is_connected(&self) -> bool {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.probe())
            }
            _ => self.probe(),
        }
    }
}

/// A connectivity flag set by hand (offline mode, tests)
#[derive(Debug, Default)]
pub struct ManualConnectivity(AtomicBool);

impl ManualConnectivity {
    pub fn new(connected: bool) -> Self {
        Self(AtomicBool::new(connected))
    }

    pub fn set(&self, connected: bool) {
        self.0.store(connected, Ordering::SeqCst);
    }
}

impl Connectivity for ManualConnectivity {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
