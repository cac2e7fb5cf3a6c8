use crate::id::{Id, NodeId};
use crate::{Error, Result};

use std::net::SocketAddr;

/// Parse a peer description from the format `IP` or `ID@IP` to its ID and address
pub fn parse_id_and_ip(s: &str) -> Result<(NodeId, SocketAddr)> {
    let parts: Vec<&str> = s.split('@').collect();
    if parts.len() == 1 {
        let ip: SocketAddr = parts[0].parse().map_err(|_| Error::PeerParseError)?;
        Ok((Id::from_ip(&ip), ip))
    } else if parts.len() == 2 {
        let id: Id = parts[0].parse().map_err(|_| Error::PeerParseError)?;
        let ip: SocketAddr = parts[1].parse().map_err(|_| Error::PeerParseError)?;
        Ok((id, ip))
    } else {
        Err(Error::PeerParseError)
    }
}
