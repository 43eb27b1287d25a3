use glam::Vec3;
use log::{debug, info, trace, warn};

use crate::net::{AckKey, Command, Datagram, EndpointId, Packet, Payload, Resolution, Transport};
use crate::time::Clock;

use super::GameServer;
use super::events::ServerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    Ignored,
    Dropped,
}

impl<T: Transport, C: Clock> GameServer<T, C> {
    pub(super) fn dispatch(&mut self, datagram: Datagram) -> Dispatch {
        let Datagram { data, endpoint } = datagram;

        // Only a Join creates a session, so decode before resolving the sender.
        let packet = match Packet::decode(&data) {
            Ok(packet) => packet,
            Err(error) => {
                trace!("Dropping malformed datagram from {}: {}", endpoint, error);
                self.stats.malformed_dropped += 1;
                self.pending_events
                    .push_back(ServerEvent::MalformedPacket { endpoint, error });
                return Dispatch::Dropped;
            }
        };

        match packet.payload {
            Payload::Join => self.handle_join(endpoint),
            Payload::Ack { command, packet_id } => self.handle_ack(&endpoint, command, packet_id),
            Payload::Update {
                object_id,
                position,
            } => self.handle_update(&endpoint, object_id, position),
            Payload::Welcome { .. } | Payload::Spawn { .. } => {
                trace!(
                    "Ignoring server-only {:?} from {}",
                    packet.command(),
                    endpoint
                );
                Dispatch::Ignored
            }
        }
    }

    fn handle_join(&mut self, endpoint: EndpointId) -> Dispatch {
        let now = self.now;
        let spawn_position = self.config.spawn_position;
        let world = &mut self.world;

        let resolution = self
            .sessions
            .resolve_or_create(&endpoint, now, |owner| world.spawn(owner, spawn_position));

        let session_id = match resolution {
            Resolution::Existing(session_id) => {
                let malus = self.sessions.get(session_id).map_or(0, |s| s.malus);
                debug!("Client {} rejoined, malus now {}", endpoint, malus);
                self.pending_events
                    .push_back(ServerEvent::ClientRejoined { endpoint, malus });
                return Dispatch::Applied;
            }
            Resolution::Created(session_id) => session_id,
        };

        let Some(object) = self
            .sessions
            .get(session_id)
            .and_then(|s| self.world.get(s.object_id))
            .cloned()
        else {
            return Dispatch::Ignored;
        };

        info!(
            "Client {} joined as session {} with object {}",
            endpoint, session_id, object.id
        );

        let others: Vec<EndpointId> = self
            .sessions
            .iter()
            .filter(|s| s.id != session_id)
            .map(|s| s.endpoint.clone())
            .collect();
        for destination in others {
            let spawn = object.spawn_packet(self.next_packet_id());
            self.queue(spawn, destination);
        }

        let welcome = object.welcome_packet(self.next_packet_id());
        self.queue(welcome, endpoint.clone());

        self.pending_events.push_back(ServerEvent::ClientJoined {
            endpoint,
            object_id: object.id,
        });
        Dispatch::Applied
    }

    fn handle_ack(&mut self, endpoint: &EndpointId, command: Command, packet_id: u32) -> Dispatch {
        let now = self.now;
        let Some(session) = self.sessions.get_by_endpoint_mut(endpoint) else {
            trace!("Ignoring ack from unknown endpoint {}", endpoint);
            return Dispatch::Ignored;
        };
        session.touch(now);

        let key = AckKey::new(command, endpoint.clone());
        match session.acks.acknowledge(&key, packet_id) {
            Some(entry) => {
                self.stats.acks_received += 1;
                debug!(
                    "{} acknowledged {:?} #{} after {} transmission(s)",
                    endpoint, command, packet_id, entry.transmissions
                );
                Dispatch::Applied
            }
            None => {
                trace!(
                    "Ignoring ack for {:?} #{} from {}: nothing outstanding",
                    command, packet_id, endpoint
                );
                Dispatch::Ignored
            }
        }
    }

    fn handle_update(&mut self, endpoint: &EndpointId, object_id: u32, position: Vec3) -> Dispatch {
        let now = self.now;
        let owned = match self.sessions.get_by_endpoint_mut(endpoint) {
            Some(session) if session.owns(object_id) => {
                session.touch(now);
                true
            }
            _ => false,
        };

        if !owned || !self.world.set_position(object_id, position) {
            warn!(
                "Rejected update of object {} from {}: not the owner",
                object_id, endpoint
            );
            self.stats.unauthorized_dropped += 1;
            self.pending_events
                .push_back(ServerEvent::UnauthorizedMutation {
                    endpoint: endpoint.clone(),
                    object_id,
                });
            return Dispatch::Dropped;
        }

        Dispatch::Applied
    }

    pub(super) fn queue(&mut self, packet: Packet, destination: EndpointId) {
        let data = packet.encode();

        if packet.requires_ack() {
            let now = self.now;
            match self.sessions.get_by_endpoint_mut(&destination) {
                Some(session) => {
                    let key = AckKey::new(packet.command(), destination.clone());
                    if let Some(replaced) = session.acks.track(key, packet.id, data.clone(), now) {
                        debug!(
                            "Replacing outstanding {:?} #{} to {}",
                            packet.command(),
                            replaced.packet_id,
                            destination
                        );
                    }
                }
                None => warn!(
                    "Sending {:?} to {} without a session to track it",
                    packet.command(),
                    destination
                ),
            }
        }

        self.outbound.push(Datagram::new(data, destination));
    }
}
