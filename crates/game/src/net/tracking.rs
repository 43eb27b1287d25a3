use std::collections::BTreeMap;

use super::endpoint::EndpointId;
use super::protocol::Command;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AckKey {
    pub command: Command,
    pub destination: EndpointId,
}

impl AckKey {
    pub fn new(command: Command, destination: EndpointId) -> Self {
        Self {
            command,
            destination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingAck {
    pub packet_id: u32,
    pub data: Vec<u8>,
    pub sent_at: u64,
    pub transmissions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retransmission {
    pub key: AckKey,
    pub data: Vec<u8>,
    pub transmissions: u32,
}

#[derive(Debug, Default)]
pub struct AckTable {
    pending: BTreeMap<AckKey, OutstandingAck>,
}

impl AckTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(
        &mut self,
        key: AckKey,
        packet_id: u32,
        data: Vec<u8>,
        now: u64,
    ) -> Option<OutstandingAck> {
        self.pending.insert(
            key,
            OutstandingAck {
                packet_id,
                data,
                sent_at: now,
                transmissions: 1,
            },
        )
    }

    /// Removes the entry for `key` if it still refers to `packet_id`. Stale or
    /// duplicate acks leave the table untouched.
    pub fn acknowledge(&mut self, key: &AckKey, packet_id: u32) -> Option<OutstandingAck> {
        match self.pending.get(key) {
            Some(entry) if entry.packet_id == packet_id => self.pending.remove(key),
            _ => None,
        }
    }

    pub fn take_due(&mut self, now: u64, interval: u64) -> Vec<Retransmission> {
        let mut due = Vec::new();

        for (key, entry) in self.pending.iter_mut() {
            if now.saturating_sub(entry.sent_at) < interval {
                continue;
            }
            entry.sent_at = now;
            entry.transmissions = entry.transmissions.saturating_add(1);
            due.push(Retransmission {
                key: key.clone(),
                data: entry.data.clone(),
                transmissions: entry.transmissions,
            });
        }

        due
    }

    pub fn get(&self, key: &AckKey) -> Option<&OutstandingAck> {
        self.pending.get(key)
    }

    pub fn contains(&self, command: Command, destination: &EndpointId) -> bool {
        self.count_for(command, destination) > 0
    }

    pub fn count_for(&self, command: Command, destination: &EndpointId) -> usize {
        self.pending
            .keys()
            .filter(|k| k.command == command && &k.destination == destination)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AckKey, &OutstandingAck)> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
