pub mod net;
pub mod server;
pub mod time;
pub mod world;

pub use net::{
    AckKey, AckTable, ClientSession, Command, DEFAULT_PORT, DEFAULT_REJOIN_MALUS,
    DEFAULT_TICK_RATE, Datagram, EndpointId, MAX_PACKET_SIZE, MemoryTransport, NetworkStats,
    OutstandingAck, Packet, PacketError, Payload, Resolution, SessionId, SessionTable, Transport,
    TransportError, UdpTransport,
};
pub use server::{
    ConfigError, DEFAULT_RETRY_INTERVAL, Dispatch, GameServer, ServerConfig, ServerError,
    ServerEvent, ServerStats, TickReport,
};
pub use time::{Clock, ClockError, ManualClock, MonotonicClock};
pub use world::{GameObject, World};
