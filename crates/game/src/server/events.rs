use crate::net::{Command, EndpointId, PacketError};

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    ClientJoined {
        endpoint: EndpointId,
        object_id: u32,
    },
    ClientRejoined {
        endpoint: EndpointId,
        malus: u32,
    },
    UnauthorizedMutation {
        endpoint: EndpointId,
        object_id: u32,
    },
    MalformedPacket {
        endpoint: EndpointId,
        error: PacketError,
    },
    Retransmitted {
        endpoint: EndpointId,
        command: Command,
        transmissions: u32,
    },
    TransportFault {
        endpoint: Option<EndpointId>,
        message: String,
    },
}
