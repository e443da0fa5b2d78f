//! Framework-agnostic building blocks: the client seam, the event catalog,
//! entity snapshots and operation outcomes.

/// Capability trait implemented by chat clients
pub mod client;
/// Event kinds, the subscription allow-list and the listener registry
pub mod events;
/// Users, channels, messages and presence
pub mod model;
/// Success/failure results for network-touching operations
pub mod outcome;

pub use client::{ChatClient, Credentials};
pub use events::{ALLOWED_EVENTS, Event, EventEmitter, EventKind, Listener};
pub use model::{
    Activity, ActivityKind, Channel, ChannelId, ChannelKind, ChatMessage, CurrentUser, GuildId,
    MessageId, MessageTarget, Presence, Status, User, UserId,
};
pub use outcome::{BroadcastReport, Failure, Outcome};
