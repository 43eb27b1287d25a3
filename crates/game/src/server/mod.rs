mod config;
mod dispatch;
mod events;

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::net::{
    ClientSession, Datagram, EndpointId, NetworkStats, SessionId, SessionTable, Transport,
    TransportError,
};
use crate::time::{Clock, ClockError};
use crate::world::{GameObject, World};

pub use config::{ConfigError, DEFAULT_RETRY_INTERVAL, ServerConfig};
pub use dispatch::Dispatch;
pub use events::ServerEvent;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("clock went backwards from {previous} to {now}")]
    TimeWentBackwards { previous: u64, now: u64 },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("no session for endpoint {0}")]
    SessionNotFound(EndpointId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub now: u64,
    pub received: usize,
    pub dropped: usize,
    pub sent: usize,
    pub retransmitted: usize,
    pub send_failures: usize,
}

#[derive(Debug, Clone)]
pub struct ServerStats {
    pub tick: u64,
    pub now: u64,
    pub session_count: usize,
    pub object_count: usize,
    pub outstanding_acks: usize,
    pub network_stats: NetworkStats,
}

pub struct GameServer<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    config: ServerConfig,
    sessions: SessionTable,
    world: World,
    outbound: Vec<Datagram>,
    now: u64,
    tick: u64,
    next_packet_id: u32,
    stats: NetworkStats,
    pending_events: VecDeque<ServerEvent>,
}

impl<T: Transport, C: Clock> GameServer<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self::build(transport, clock, ServerConfig::default())
    }

    pub fn with_config(transport: T, clock: C, config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        Ok(Self::build(transport, clock, config))
    }

    fn build(transport: T, clock: C, config: ServerConfig) -> Self {
        Self {
            transport,
            clock,
            sessions: SessionTable::new(config.rejoin_malus),
            world: World::new(),
            outbound: Vec::new(),
            now: 0,
            tick: 0,
            next_packet_id: 0,
            stats: NetworkStats::default(),
            pending_events: VecDeque::new(),
            config,
        }
    }

    pub fn bind(&mut self, address: &str, port: u16) -> Result<(), ServerError> {
        self.transport.bind(address, port)?;
        match self.transport.local_endpoint() {
            Some(endpoint) => info!("Server bound to {}", endpoint),
            None => info!("Server bound to {}:{}", address, port),
        }
        Ok(())
    }

    /// Runs one tick. Fails before touching any state if the clock reports a
    /// time earlier than the previous tick.
    pub fn single_step(&mut self) -> Result<TickReport, ServerError> {
        let now = self.clock.now();
        if now < self.now {
            return Err(ServerError::TimeWentBackwards {
                previous: self.now,
                now,
            });
        }
        self.now = now;
        self.tick += 1;

        let mut report = TickReport {
            tick: self.tick,
            now,
            ..Default::default()
        };

        self.drain_inbound(&mut report);
        if self.config.broadcast_state {
            self.broadcast_state();
        }
        report.retransmitted = self.retransmit_due();
        self.flush(&mut report);

        Ok(report)
    }

    fn drain_inbound(&mut self, report: &mut TickReport) {
        let limit = self.config.max_datagrams_per_tick.unwrap_or(usize::MAX);

        while report.received < limit {
            match self.transport.receive() {
                Ok(Some(datagram)) => {
                    report.received += 1;
                    self.stats.record_received(datagram.data.len());
                    if self.dispatch(datagram) == Dispatch::Dropped {
                        report.dropped += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Receive failed: {}", e);
                    self.pending_events.push_back(ServerEvent::TransportFault {
                        endpoint: None,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }
    }

    fn broadcast_state(&mut self) {
        if self.sessions.len() < 2 {
            return;
        }

        let objects: Vec<GameObject> = self.world.objects().cloned().collect();
        let targets: Vec<(EndpointId, SessionId)> = self
            .sessions
            .iter()
            .map(|s| (s.endpoint.clone(), s.id))
            .collect();

        for (endpoint, session_id) in targets {
            for object in objects.iter().filter(|o| o.owner != session_id) {
                let packet = object.update_packet(self.next_packet_id());
                self.queue(packet, endpoint.clone());
            }
        }
    }

    fn retransmit_due(&mut self) -> usize {
        let now = self.now;
        let interval = self.config.retry_interval;

        let mut due = Vec::new();
        for session in self.sessions.iter_mut() {
            due.extend(session.acks.take_due(now, interval));
        }

        let count = due.len();
        for retransmission in due {
            let endpoint = retransmission.key.destination;
            debug!(
                "Resending {:?} to {} (transmission {})",
                retransmission.key.command,
                endpoint,
                retransmission.transmissions
            );
            self.stats.retransmissions += 1;
            self.pending_events.push_back(ServerEvent::Retransmitted {
                endpoint: endpoint.clone(),
                command: retransmission.key.command,
                transmissions: retransmission.transmissions,
            });
            self.outbound.push(Datagram::new(retransmission.data, endpoint));
        }
        count
    }

    fn flush(&mut self, report: &mut TickReport) {
        let mut outbound = std::mem::take(&mut self.outbound);
        let sessions = &self.sessions;
        outbound.sort_by_key(|d| sessions.find(&d.endpoint).map_or(u32::MAX, |id| id.0));

        for datagram in outbound {
            match self.transport.send(&datagram.data, &datagram.endpoint) {
                Ok(bytes) => {
                    self.stats.record_sent(bytes);
                    report.sent += 1;
                }
                Err(e) => {
                    warn!("Failed to send to {}: {}", datagram.endpoint, e);
                    self.stats.send_failures += 1;
                    report.send_failures += 1;
                    self.pending_events.push_back(ServerEvent::TransportFault {
                        endpoint: Some(datagram.endpoint),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn next_packet_id(&mut self) -> u32 {
        let id = self.next_packet_id;
        self.next_packet_id = self.next_packet_id.wrapping_add(1);
        id
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn object_count(&self) -> usize {
        self.world.object_count()
    }

    pub fn session(&self, endpoint: &EndpointId) -> Result<&ClientSession, ServerError> {
        self.sessions
            .get_by_endpoint(endpoint)
            .ok_or_else(|| ServerError::SessionNotFound(endpoint.clone()))
    }

    pub fn object(&self, id: u32) -> Option<&GameObject> {
        self.world.get(id)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            tick: self.tick,
            now: self.now,
            session_count: self.sessions.len(),
            object_count: self.world.object_count(),
            outstanding_acks: self.sessions.outstanding_acks(),
            network_stats: self.stats.clone(),
        }
    }
}
