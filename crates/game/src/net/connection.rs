use std::collections::HashMap;
use std::fmt;

use super::endpoint::EndpointId;
use super::tracking::AckTable;

pub const DEFAULT_REJOIN_MALUS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u32);

impl SessionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct ClientSession {
    pub id: SessionId,
    pub endpoint: EndpointId,
    pub object_id: u32,
    pub acks: AckTable,
    pub malus: u32,
    pub rejoins: u32,
    pub joined_at: u64,
    pub last_seen: u64,
}

impl ClientSession {
    pub fn new(id: SessionId, endpoint: EndpointId, object_id: u32, now: u64) -> Self {
        Self {
            id,
            endpoint,
            object_id,
            acks: AckTable::new(),
            malus: 0,
            rejoins: 0,
            joined_at: now,
            last_seen: now,
        }
    }

    pub fn owns(&self, object_id: u32) -> bool {
        self.object_id == object_id
    }

    pub fn ack_table_count(&self) -> usize {
        self.acks.len()
    }

    pub fn touch(&mut self, now: u64) {
        self.last_seen = now;
    }

    fn penalize_rejoin(&mut self, amount: u32) {
        self.rejoins = self.rejoins.saturating_add(1);
        self.malus = self.malus.saturating_add(amount);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Created(SessionId),
    Existing(SessionId),
}

impl Resolution {
    pub fn session_id(self) -> SessionId {
        match self {
            Resolution::Created(id) | Resolution::Existing(id) => id,
        }
    }

    pub fn is_first_join(self) -> bool {
        matches!(self, Resolution::Created(_))
    }
}

#[derive(Debug)]
pub struct SessionTable {
    sessions: Vec<ClientSession>,
    by_endpoint: HashMap<EndpointId, SessionId>,
    rejoin_malus: u32,
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new(DEFAULT_REJOIN_MALUS)
    }
}

impl SessionTable {
    pub fn new(rejoin_malus: u32) -> Self {
        Self {
            sessions: Vec::new(),
            by_endpoint: HashMap::new(),
            rejoin_malus,
        }
    }

    /// Looks up the session for `endpoint`. On a miss a new session is created
    /// and `allocate_object` is called once for its object id; on a hit the
    /// session is charged the rejoin malus.
    pub fn resolve_or_create(
        &mut self,
        endpoint: &EndpointId,
        now: u64,
        allocate_object: impl FnOnce(SessionId) -> u32,
    ) -> Resolution {
        if let Some(&id) = self.by_endpoint.get(endpoint) {
            let session = &mut self.sessions[id.index()];
            session.penalize_rejoin(self.rejoin_malus);
            session.touch(now);
            return Resolution::Existing(id);
        }

        let id = SessionId(self.sessions.len() as u32);
        let object_id = allocate_object(id);
        self.sessions
            .push(ClientSession::new(id, endpoint.clone(), object_id, now));
        self.by_endpoint.insert(endpoint.clone(), id);
        Resolution::Created(id)
    }

    pub fn find(&self, endpoint: &EndpointId) -> Option<SessionId> {
        self.by_endpoint.get(endpoint).copied()
    }

    pub fn get(&self, id: SessionId) -> Option<&ClientSession> {
        self.sessions.get(id.index())
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut ClientSession> {
        self.sessions.get_mut(id.index())
    }

    pub fn get_by_endpoint(&self, endpoint: &EndpointId) -> Option<&ClientSession> {
        self.find(endpoint).and_then(|id| self.get(id))
    }

    pub fn get_by_endpoint_mut(&mut self, endpoint: &EndpointId) -> Option<&mut ClientSession> {
        let id = self.find(endpoint)?;
        self.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientSession> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientSession> {
        self.sessions.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn outstanding_acks(&self) -> usize {
        self.sessions.iter().map(ClientSession::ack_table_count).sum()
    }
}
