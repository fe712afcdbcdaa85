//! Room-scoped real-time hub: session handles, the wire envelope, and the
//! serial connection registry.

pub mod message;
pub mod registry;
pub mod session;

pub use message::{Envelope, FrameKind};
pub use registry::{EVENT_QUEUE_CAPACITY, Hub, HubRunner};
pub use session::{OUTBOUND_QUEUE_CAPACITY, SessionHandle, SessionId, SessionInfo};
