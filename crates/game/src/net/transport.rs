use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::endpoint::{Datagram, EndpointId};
use super::protocol::MAX_PACKET_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport is not bound")]
    NotBound,
    #[error("cannot resolve endpoint {0}")]
    Resolve(EndpointId),
    #[error("datagram of {actual} bytes exceeds MTU of {max}")]
    Oversized { actual: usize, max: usize },
    #[error("transport rejected datagram to {0}")]
    Rejected(EndpointId),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait Transport {
    fn bind(&mut self, address: &str, port: u16) -> Result<(), TransportError>;

    fn send(&mut self, data: &[u8], destination: &EndpointId) -> Result<usize, TransportError>;

    /// Returns `Ok(None)` once no datagram is pending.
    fn receive(&mut self) -> Result<Option<Datagram>, TransportError>;

    fn create_endpoint(&self) -> EndpointId {
        EndpointId::unspecified()
    }

    fn local_endpoint(&self) -> Option<EndpointId>;
}

pub struct UdpTransport {
    socket: Option<UdpSocket>,
    local_addr: Option<SocketAddr>,
    recv_buffer: [u8; MAX_PACKET_SIZE],
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UdpTransport {
    pub fn new() -> Self {
        Self {
            socket: None,
            local_addr: None,
            recv_buffer: [0u8; MAX_PACKET_SIZE],
        }
    }

    pub fn bound(address: &str, port: u16) -> Result<Self, TransportError> {
        let mut transport = Self::new();
        transport.bind(address, port)?;
        Ok(transport)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    fn resolve(endpoint: &EndpointId) -> Result<SocketAddr, TransportError> {
        (endpoint.address.as_str(), endpoint.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Resolve(endpoint.clone()))
    }
}

impl Transport for UdpTransport {
    fn bind(&mut self, address: &str, port: u16) -> Result<(), TransportError> {
        let socket = UdpSocket::bind((address, port))?;
        socket.set_nonblocking(true)?;

        self.local_addr = Some(socket.local_addr()?);
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&mut self, data: &[u8], destination: &EndpointId) -> Result<usize, TransportError> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(TransportError::Oversized {
                actual: data.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        let socket = self.socket.as_ref().ok_or(TransportError::NotBound)?;
        let addr = Self::resolve(destination)?;
        Ok(socket.send_to(data, addr)?)
    }

    fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotBound)?;

        loop {
            match socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => {
                    let data = self.recv_buffer[..size].to_vec();
                    return Ok(Some(Datagram::new(data, EndpointId::from(addr))));
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                // Windows reports ICMP port-unreachable from an earlier send here.
                Err(ref e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn local_endpoint(&self) -> Option<EndpointId> {
        self.local_addr.map(EndpointId::from)
    }
}
