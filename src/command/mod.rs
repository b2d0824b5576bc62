//! Command nodes, events and queues.
//!
//! Every enqueued operation becomes a node in a per-queue dependency graph.
//! Nodes carry a tagged payload, retain the memory objects they touch, and
//! complete through an event whose predecessors are the wait list supplied
//! at enqueue time.

pub mod copy;
pub mod event;
pub mod node;
pub mod queue;

pub use copy::{enqueue_rect_copy, RectCopyRequest};
pub use event::{Event, EventId, EventStatus};
pub use node::{CommandNode, CommandPayload, KernelLaunch, NodeId, RectCopy};
pub use queue::{CommandQueue, ExecutionBackend, QueueId};
