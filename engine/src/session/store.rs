// Independent quote sessions keyed by generated id.
use std::collections::HashMap;
use uuid::Uuid;

use super::quote::QuoteSession;
use crate::error::EngineError;

pub struct SessionStore {
    sessions: HashMap<String, QuoteSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore { sessions: HashMap::new() }
    }

    /// Creates an empty session and returns its id.
    pub fn open(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), QuoteSession::new());
        id
    }

    pub fn get(&self, id: &str) -> Result<&QuoteSession, EngineError> {
        self.sessions
            .get(id)
            .ok_or_else(|| EngineError::SessionError(format!("Unknown session '{}'", id)))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut QuoteSession, EngineError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::SessionError(format!("Unknown session '{}'", id)))
    }

    pub fn close(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
