//! Replication messages and the transports that carry them.
//!
//! Action frames inside messages use the `game_core::codec` layout; the
//! surrounding envelopes are bincode.
mod message;
mod transport;

pub use message::{NetMessage, Outgoing, PendingAction};
pub use transport::{Inbound, LoopbackHub, LoopbackTransport, Transport, TransportError};
