//! The result delivered for every port that accepted a connection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// An open TCP port on a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpenPort {
    /// Host address in dotted-decimal form.
    pub host: String,
    /// Port that accepted the connection.
    pub port: u16,
}

impl OpenPort {
    pub fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self {
            host: addr.to_string(),
            port,
        }
    }
}

impl fmt::Display for OpenPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} is open.", self.host, self.port)
    }
}
