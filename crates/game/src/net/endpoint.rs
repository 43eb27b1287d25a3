use std::fmt;
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointId {
    pub address: String,
    pub port: u16,
}

impl EndpointId {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn unspecified() -> Self {
        Self::new("0.0.0.0", 0)
    }

    pub fn is_unspecified(&self) -> bool {
        self.port == 0 && self.address == "0.0.0.0"
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl From<SocketAddr> for EndpointId {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub data: Vec<u8>,
    pub endpoint: EndpointId,
}

impl Datagram {
    pub fn new(data: Vec<u8>, endpoint: EndpointId) -> Self {
        Self { data, endpoint }
    }

    pub fn command_byte(&self) -> Option<u8> {
        self.data.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_distinguishes_clients() {
        let a = EndpointId::new("tester", 0);
        let b = EndpointId::new("tester", 1);
        assert_ne!(a, b);
        assert_eq!(a, EndpointId::new(String::from("tester"), 0));
    }

    #[test]
    fn test_from_socket_addr() {
        let addr: SocketAddr = "127.0.0.1:27015".parse().unwrap();
        let endpoint = EndpointId::from(addr);
        assert_eq!(endpoint.to_string(), "127.0.0.1:27015");
        assert!(!endpoint.is_unspecified());
        assert!(EndpointId::unspecified().is_unspecified());
    }
}
