mod connection;
mod endpoint;
mod memory;
mod protocol;
mod stats;
mod tracking;
mod transport;

pub use connection::{ClientSession, DEFAULT_REJOIN_MALUS, Resolution, SessionId, SessionTable};
pub use endpoint::{Datagram, EndpointId};
pub use memory::MemoryTransport;
pub use protocol::{
    Command, DEFAULT_PORT, DEFAULT_TICK_RATE, HEADER_SIZE, MAX_PACKET_SIZE, Packet, PacketError,
    Payload,
};
pub use stats::NetworkStats;
pub use tracking::{AckKey, AckTable, OutstandingAck, Retransmission};
pub use transport::{Transport, TransportError, UdpTransport};
