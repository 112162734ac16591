//! Destination address syntax
//!
//! A destination is a numeric host and a port, or, when the host starts
//! with `unix:`, the filesystem path of a local socket.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use jrpc_core::RpcError;

/// Host prefix selecting a unix-domain socket
pub const UNIX_PREFIX: &str = "unix:";

/// Where to listen or connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Tcp(SocketAddr),
    Unix(PathBuf),
}

impl Address {
    /// Build an address from separate host and port strings
    ///
    /// The port is ignored for `unix:` hosts.
    pub fn parse(host: &str, port: &str) -> Result<Self, RpcError> {
        if let Some(path) = host.strip_prefix(UNIX_PREFIX) {
            return Self::unix(path);
        }
        let ip: IpAddr = host
            .parse()
            .map_err(|_| RpcError::Config(format!("host must be a numeric address: {host}")))?;
        let port: u16 = port
            .parse()
            .map_err(|_| RpcError::Config(format!("invalid port: {port}")))?;
        Ok(Address::Tcp(SocketAddr::new(ip, port)))
    }

    fn unix(path: &str) -> Result<Self, RpcError> {
        if path.is_empty() {
            return Err(RpcError::Config("unix socket path is empty".to_string()));
        }
        Ok(Address::Unix(PathBuf::from(path)))
    }

    pub fn is_unix(&self) -> bool {
        matches!(self, Address::Unix(_))
    }
}

impl FromStr for Address {
    type Err = RpcError;

    /// Parse `host:port`, `[v6]:port`, or `unix:/path`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix(UNIX_PREFIX) {
            return Self::unix(path);
        }
        s.parse::<SocketAddr>()
            .map(Address::Tcp)
            .map_err(|_| RpcError::Config(format!("invalid address: {s}")))
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Address::Tcp(addr)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::Tcp(addr) => write!(f, "{}", addr),
            Address::Unix(path) => write!(f, "{}{}", UNIX_PREFIX, path.display()),
        }
    }
}
