use glam::Vec3;

use crate::net::{Packet, Payload, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    pub id: u32,
    pub owner: SessionId,
    pub position: Vec3,
}

impl GameObject {
    pub fn new(id: u32, owner: SessionId, position: Vec3) -> Self {
        Self {
            id,
            owner,
            position,
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn z(&self) -> f32 {
        self.position.z
    }

    pub fn welcome_packet(&self, packet_id: u32) -> Packet {
        Packet::new(
            packet_id,
            Payload::Welcome {
                object_id: self.id,
                position: self.position,
            },
        )
    }

    pub fn spawn_packet(&self, packet_id: u32) -> Packet {
        Packet::new(
            packet_id,
            Payload::Spawn {
                object_id: self.id,
                position: self.position,
            },
        )
    }

    pub fn update_packet(&self, packet_id: u32) -> Packet {
        Packet::update(packet_id, self.id, self.position)
    }
}
