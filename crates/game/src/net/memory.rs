use std::collections::{HashSet, VecDeque};
use std::io;

use super::endpoint::{Datagram, EndpointId};
use super::protocol::{Command, Packet};
use super::transport::{Transport, TransportError};

#[derive(Debug, Default)]
pub struct MemoryTransport {
    bound: Option<EndpointId>,
    inbound: VecDeque<Datagram>,
    outbound: VecDeque<Datagram>,
    failing: HashSet<EndpointId>,
    fail_next_receive: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound_endpoint(&self) -> Option<&EndpointId> {
        self.bound.as_ref()
    }

    pub fn client_enqueue(&mut self, data: Vec<u8>, source: EndpointId) {
        self.inbound.push_back(Datagram::new(data, source));
    }

    pub fn client_enqueue_packet(&mut self, packet: &Packet, address: &str, port: u16) {
        self.client_enqueue(packet.encode(), EndpointId::new(address, port));
    }

    pub fn client_dequeue(&mut self) -> Option<Datagram> {
        self.outbound.pop_front()
    }

    pub fn take_first_for(
        &mut self,
        command: Command,
        destination: &EndpointId,
    ) -> Option<Datagram> {
        let index = self
            .outbound
            .iter()
            .position(|d| Self::matches(d, command, destination))?;
        self.outbound.remove(index)
    }

    pub fn take_all_for(&mut self, command: Command, destination: &EndpointId) -> Vec<Datagram> {
        let (taken, kept): (VecDeque<_>, VecDeque<_>) = self
            .outbound
            .drain(..)
            .partition(|d| Self::matches(d, command, destination));
        self.outbound = kept;
        taken.into_iter().collect()
    }

    pub fn count_for(&self, command: Command, destination: &EndpointId) -> usize {
        self.outbound
            .iter()
            .filter(|d| Self::matches(d, command, destination))
            .count()
    }

    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    pub fn inbound_len(&self) -> usize {
        self.inbound.len()
    }

    pub fn outbound(&self) -> impl Iterator<Item = &Datagram> {
        self.outbound.iter()
    }

    pub fn fail_sends_to(&mut self, endpoint: EndpointId) {
        self.failing.insert(endpoint);
    }

    pub fn restore(&mut self, endpoint: &EndpointId) {
        self.failing.remove(endpoint);
    }

    /// The next `receive` fails once; queued datagrams stay queued.
    pub fn fail_next_receive(&mut self) {
        self.fail_next_receive = true;
    }

    fn matches(datagram: &Datagram, command: Command, destination: &EndpointId) -> bool {
        &datagram.endpoint == destination && datagram.command_byte() == Some(command.as_byte())
    }
}

impl Transport for MemoryTransport {
    fn bind(&mut self, address: &str, port: u16) -> Result<(), TransportError> {
        self.bound = Some(EndpointId::new(address, port));
        Ok(())
    }

    fn send(&mut self, data: &[u8], destination: &EndpointId) -> Result<usize, TransportError> {
        if self.failing.contains(destination) {
            return Err(TransportError::Rejected(destination.clone()));
        }
        self.outbound
            .push_back(Datagram::new(data.to_vec(), destination.clone()));
        Ok(data.len())
    }

    fn receive(&mut self) -> Result<Option<Datagram>, TransportError> {
        if std::mem::take(&mut self.fail_next_receive) {
            return Err(TransportError::Io(io::Error::other("injected receive failure")));
        }
        Ok(self.inbound.pop_front())
    }

    fn local_endpoint(&self) -> Option<EndpointId> {
        self.bound.clone()
    }
}
