//! Shared primitive types used across the demo engine.

/// A simulator tick. One tick = one fixed simulator interval (2 s by default).
pub type Tick = u64;

/// Virtual milliseconds since the engine was constructed.
pub type Millis = u64;

/// Integer timestamp pseudo-id carried by alerts and notifications.
pub type EntityId = u64;

/// The canonical run identifier.
pub type RunId = String;
