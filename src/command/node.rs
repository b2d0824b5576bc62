//! Command nodes: the unit of deferred work.

use crate::command::event::Event;
use crate::context::Device;
use crate::memory::{Coord, MemObject};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a command node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Geometry of a validated rectangular copy.
///
/// Origins and region are in bytes along axis 0 — image sides have already
/// been rescaled from pixels — and the pitches are the effective ones the
/// bounds check derived. Owning devices are resolved at enqueue time.
#[derive(Debug, Clone)]
pub struct RectCopy {
    pub src: Arc<MemObject>,
    pub dst: Arc<MemObject>,
    pub src_device: Arc<Device>,
    pub dst_device: Arc<Device>,
    pub src_origin: Coord,
    pub dst_origin: Coord,
    pub region: Coord,
    pub src_row_pitch: usize,
    pub src_slice_pitch: usize,
    pub dst_row_pitch: usize,
    pub dst_slice_pitch: usize,
}

/// Work-item geometry for a kernel launch
#[derive(Debug, Clone)]
pub struct KernelLaunch {
    pub kernel_name: String,
    pub global_size: [usize; 3],
    pub local_size: [usize; 3],
    pub buffers: Vec<Arc<MemObject>>,
}

/// Type-specific payload of a command node. Dispatch over this enum is
/// exhaustive at submission time.
#[derive(Debug, Clone)]
pub enum CommandPayload {
    RectCopy(RectCopy),
    KernelLaunch(KernelLaunch),
}

impl CommandPayload {
    pub fn type_name(&self) -> &'static str {
        match self {
            CommandPayload::RectCopy(_) => "rect_copy",
            CommandPayload::KernelLaunch(_) => "kernel_launch",
        }
    }
}

/// A pending or completed unit of work.
///
/// The node retains every memory object it references, so the objects stay
/// alive until the node is reclaimed; the completion event carries the wait
/// list as its predecessor set.
#[derive(Debug)]
pub struct CommandNode {
    id: NodeId,
    payload: CommandPayload,
    retained: Vec<Arc<MemObject>>,
    event: Arc<Event>,
}

impl CommandNode {
    pub fn new(payload: CommandPayload, retained: Vec<Arc<MemObject>>, event: Arc<Event>) -> Arc<Self> {
        Arc::new(Self {
            id: NodeId(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            payload,
            retained,
            event,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn payload(&self) -> &CommandPayload {
        &self.payload
    }

    pub fn event(&self) -> &Arc<Event> {
        &self.event
    }

    pub fn retained_objects(&self) -> &[Arc<MemObject>] {
        &self.retained
    }
}
