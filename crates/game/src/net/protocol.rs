use glam::Vec3;

pub const MAX_PACKET_SIZE: usize = 1200;
pub const DEFAULT_PORT: u16 = 27015;
pub const DEFAULT_TICK_RATE: u32 = 60;

pub const HEADER_SIZE: usize = 5;

const OBJECT_PAYLOAD_SIZE: usize = 4 + 3 * 4;
const ACK_PAYLOAD_SIZE: usize = 1 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Command {
    Join = 0,
    Welcome = 1,
    Spawn = 2,
    Update = 3,
    Ack = 4,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Join,
        Command::Welcome,
        Command::Spawn,
        Command::Update,
        Command::Ack,
    ];

    pub fn parse(byte: u8) -> Result<Self, PacketError> {
        match byte {
            0 => Ok(Self::Join),
            1 => Ok(Self::Welcome),
            2 => Ok(Self::Spawn),
            3 => Ok(Self::Update),
            4 => Ok(Self::Ack),
            _ => Err(PacketError::UnknownCommand { command: byte }),
        }
    }

    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub const fn requires_ack(self) -> bool {
        match self {
            Command::Welcome | Command::Spawn => true,
            Command::Join | Command::Update | Command::Ack => false,
        }
    }

    const fn payload_size(self) -> usize {
        match self {
            Command::Join => 0,
            Command::Welcome | Command::Spawn | Command::Update => OBJECT_PAYLOAD_SIZE,
            Command::Ack => ACK_PAYLOAD_SIZE,
        }
    }

    pub const fn encoded_size(self) -> usize {
        HEADER_SIZE + self.payload_size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Join,
    Welcome { object_id: u32, position: Vec3 },
    Spawn { object_id: u32, position: Vec3 },
    Update { object_id: u32, position: Vec3 },
    Ack { command: Command, packet_id: u32 },
}

impl Payload {
    pub fn command(&self) -> Command {
        match self {
            Payload::Join => Command::Join,
            Payload::Welcome { .. } => Command::Welcome,
            Payload::Spawn { .. } => Command::Spawn,
            Payload::Update { .. } => Command::Update,
            Payload::Ack { .. } => Command::Ack,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packet {
    pub id: u32,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("empty datagram")]
    Empty,
    #[error("unknown command byte {command}")]
    UnknownCommand { command: u8 },
    #[error("packet too small: {actual} bytes, need {required}")]
    TooSmall { actual: usize, required: usize },
    #[error("packet has trailing bytes: {actual} bytes, expected {expected}")]
    TrailingBytes { actual: usize, expected: usize },
    #[error("packet exceeds MTU: {actual} bytes, max {max}")]
    Oversized { actual: usize, max: usize },
    #[error("ack references unknown command byte {command}")]
    UnknownAckedCommand { command: u8 },
}

impl Packet {
    pub fn new(id: u32, payload: Payload) -> Self {
        Self { id, payload }
    }

    pub fn join(id: u32) -> Self {
        Self::new(id, Payload::Join)
    }

    pub fn update(id: u32, object_id: u32, position: Vec3) -> Self {
        Self::new(id, Payload::Update { object_id, position })
    }

    pub fn ack(id: u32, command: Command, packet_id: u32) -> Self {
        Self::new(id, Payload::Ack { command, packet_id })
    }

    pub fn command(&self) -> Command {
        self.payload.command()
    }

    pub fn requires_ack(&self) -> bool {
        self.command().requires_ack()
    }

    pub fn encode(&self) -> Vec<u8> {
        let command = self.command();
        let mut buf = Vec::with_capacity(command.encoded_size());
        buf.push(command.as_byte());
        buf.extend_from_slice(&self.id.to_le_bytes());

        match self.payload {
            Payload::Join => {}
            Payload::Welcome {
                object_id,
                position,
            }
            | Payload::Spawn {
                object_id,
                position,
            }
            | Payload::Update {
                object_id,
                position,
            } => {
                buf.extend_from_slice(&object_id.to_le_bytes());
                for coord in position.to_array() {
                    buf.extend_from_slice(&coord.to_le_bytes());
                }
            }
            Payload::Ack { command, packet_id } => {
                buf.push(command.as_byte());
                buf.extend_from_slice(&packet_id.to_le_bytes());
            }
        }

        buf
    }

    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(PacketError::Oversized {
                actual: data.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        let Some(&first) = data.first() else {
            return Err(PacketError::Empty);
        };

        let command = Command::parse(first)?;
        let expected = command.encoded_size();
        if data.len() < expected {
            return Err(PacketError::TooSmall {
                actual: data.len(),
                required: expected,
            });
        }
        if data.len() > expected {
            return Err(PacketError::TrailingBytes {
                actual: data.len(),
                expected,
            });
        }

        let id = read_u32(data, 1);
        let payload = match command {
            Command::Join => Payload::Join,
            Command::Welcome => {
                let (object_id, position) = read_object(data);
                Payload::Welcome {
                    object_id,
                    position,
                }
            }
            Command::Spawn => {
                let (object_id, position) = read_object(data);
                Payload::Spawn {
                    object_id,
                    position,
                }
            }
            Command::Update => {
                let (object_id, position) = read_object(data);
                Payload::Update {
                    object_id,
                    position,
                }
            }
            Command::Ack => {
                let acked = data[HEADER_SIZE];
                let command = Command::parse(acked)
                    .map_err(|_| PacketError::UnknownAckedCommand { command: acked })?;
                Payload::Ack {
                    command,
                    packet_id: read_u32(data, HEADER_SIZE + 1),
                }
            }
        };

        Ok(Self { id, payload })
    }
}

// Callers check lengths before reading.
fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(data, offset))
}

fn read_object(data: &[u8]) -> (u32, Vec3) {
    let object_id = read_u32(data, HEADER_SIZE);
    let position = Vec3::new(
        read_f32(data, HEADER_SIZE + 4),
        read_f32(data, HEADER_SIZE + 8),
        read_f32(data, HEADER_SIZE + 12),
    );
    (object_id, position)
}
