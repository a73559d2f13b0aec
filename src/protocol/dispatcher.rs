use crate::error::{constants, ProtocolError, Result};
use crate::protocol::identifiers::MessageIdentifier;
use crate::protocol::registry::RakPacket;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::trace;

type HandlerFn = dyn Fn(&RakPacket) -> Result<Option<RakPacket>> + Send + Sync + 'static;

/// Packet dispatcher routing on the message identifier.
/// A handler may return a reply to send back to the peer.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<MessageIdentifier, Box<HandlerFn>>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register `handler` for `id`, replacing any previous one
    pub fn register<F>(&self, id: MessageIdentifier, handler: F) -> Result<()>
    where
        F: Fn(&RakPacket) -> Result<Option<RakPacket>> + Send + Sync + 'static,
    {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| ProtocolError::Custom(constants::ERR_DISPATCHER_WRITE_LOCK.into()))?;

        handlers.insert(id, Box::new(handler));
        Ok(())
    }

    pub fn is_registered(&self, id: MessageIdentifier) -> Result<bool> {
        let handlers = self
            .handlers
            .read()
            .map_err(|_| ProtocolError::Custom(constants::ERR_DISPATCHER_READ_LOCK.into()))?;
        Ok(handlers.contains_key(&id))
    }

    /// Run the handler registered for the packet's identifier.
    ///
    /// Returns [`ProtocolError::UnexpectedMessage`] when none is registered.
    pub fn dispatch(&self, packet: &RakPacket) -> Result<Option<RakPacket>> {
        let id = packet.identifier();
        trace!(%id, "Dispatching packet");

        let handlers = self
            .handlers
            .read()
            .map_err(|_| ProtocolError::Custom(constants::ERR_DISPATCHER_READ_LOCK.into()))?;

        handlers
            .get(&id)
            .ok_or(ProtocolError::UnexpectedMessage)
            .and_then(|handler| handler(packet))
    }
}
