use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc;

use game_core::PlayerId;

/// Bytes received from a peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    pub from: PlayerId,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no route to {0}")]
    UnknownPeer(PlayerId),

    #[error("connection to {0} closed")]
    Closed(PlayerId),
}

/// Delivers encoded messages to other participants.
///
/// Delivery between any two participants must be in order.
pub trait Transport: Send + Sync {
    fn send(&self, to: PlayerId, bytes: Vec<u8>) -> Result<(), TransportError>;
}

/// In-process switchboard connecting participants through unbounded channels.
#[derive(Clone, Debug, Default)]
pub struct LoopbackHub {
    routes: Arc<Mutex<HashMap<PlayerId, mpsc::UnboundedSender<Inbound>>>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `player` and returns its sending half and inbox.
    ///
    /// Registering the same player again replaces the previous inbox.
    pub fn endpoint(
        &self,
        player: PlayerId,
    ) -> (LoopbackTransport, mpsc::UnboundedReceiver<Inbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player, tx);
        let transport = LoopbackTransport {
            hub: self.clone(),
            local: player,
        };
        (transport, rx)
    }

    /// Unregisters `player`; later sends to it fail.
    pub fn remove(&self, player: PlayerId) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&player);
    }
}

/// A participant's handle on a [`LoopbackHub`].
#[derive(Clone, Debug)]
pub struct LoopbackTransport {
    hub: LoopbackHub,
    local: PlayerId,
}

impl LoopbackTransport {
    pub fn local(&self) -> PlayerId {
        self.local
    }
}

impl Transport for LoopbackTransport {
    fn send(&self, to: PlayerId, bytes: Vec<u8>) -> Result<(), TransportError> {
        let routes = self
            .hub
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let route = routes.get(&to).ok_or(TransportError::UnknownPeer(to))?;
        route
            .send(Inbound {
                from: self.local,
                bytes,
            })
            .map_err(|_| TransportError::Closed(to))
    }
}
