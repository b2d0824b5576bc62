//! Command queues and the pending dependency graph.

use crate::command::event::{Event, EventStatus};
use crate::command::node::{CommandNode, CommandPayload};
use crate::context::{Context, Device};
use crate::error::{Error, Result};
use crate::memory::MemObject;
use log::{debug, trace};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static QUEUE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a command queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(pub u64);

/// Device-side execution collaborator.
///
/// The core hands over fully validated, ready-to-run nodes and the backend
/// reports progress back through each node's event. How a backend actually
/// performs the work is opaque here.
pub trait ExecutionBackend: Send + Sync {
    fn submit(&self, node: Arc<CommandNode>);
}

/// One in-order submission stream against a device.
///
/// Enqueue never blocks: nodes park in the pending list until every
/// predecessor event completes, and the device collaborator drains them with
/// [`CommandQueue::pop_ready`]. A predecessor error fails the dependent node
/// in place without executing it, which cascades transitively.
pub struct CommandQueue {
    id: QueueId,
    context: Arc<Context>,
    device: Arc<Device>,
    pending: Mutex<VecDeque<Arc<CommandNode>>>,
}

impl CommandQueue {
    pub fn new(context: Arc<Context>, device: Arc<Device>) -> Result<Arc<Self>> {
        if !context.contains_device(device.id()) {
            return Err(Error::invalid_handle(format!(
                "device {} is not part of the context",
                device.name()
            )));
        }
        Ok(Arc::new(Self {
            id: QueueId(QUEUE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            context,
            device,
            pending: Mutex::new(VecDeque::new()),
        }))
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Build a command node around `payload` and link it into the pending
    /// graph: validates the wait-list pairing, checks every touched memory
    /// object against the queue's context, retains the objects, and creates
    /// the completion event with the wait list as its predecessor set.
    ///
    /// Payload-specific validation (copy geometry, overlap) happens before
    /// this in the payload's own enqueue path; nothing is linked until every
    /// check has passed.
    pub fn enqueue(
        &self,
        payload: CommandPayload,
        wait_list: Option<&[Arc<Event>]>,
    ) -> Result<Arc<Event>> {
        if let Some(list) = wait_list {
            if list.is_empty() {
                return Err(Error::invalid_value("supplied wait list is empty"));
            }
        }

        let retained: Vec<Arc<MemObject>> = match &payload {
            CommandPayload::RectCopy(copy) => {
                vec![Arc::clone(&copy.src), Arc::clone(&copy.dst)]
            }
            CommandPayload::KernelLaunch(launch) => launch.buffers.clone(),
        };
        for object in &retained {
            if object.context().id() != self.context.id() {
                return Err(Error::invalid_context(format!(
                    "memory object {:?} and queue are not from the same context",
                    object.id()
                )));
            }
        }

        let event = Event::new(wait_list.map(<[_]>::to_vec).unwrap_or_default());
        let node = CommandNode::new(payload, retained, Arc::clone(&event));
        self.push(node);
        Ok(event)
    }

    /// Link a validated node into the pending graph. Called only after all
    /// validation has passed; the node's event is already Queued.
    pub(crate) fn push(&self, node: Arc<CommandNode>) {
        trace!(
            "queue {:?}: enqueued {} node {:?}",
            self.id,
            node.payload().type_name(),
            node.id()
        );
        self.pending.lock().push_back(node);
    }

    /// Pull the next node whose predecessors have all completed, marking its
    /// event Submitted. Nodes whose predecessors failed are force-failed and
    /// dropped here — the tombstone cascade — without ever running.
    pub fn pop_ready(&self) -> Option<Arc<CommandNode>> {
        let mut pending = self.pending.lock();
        let mut index = 0;
        while index < pending.len() {
            let node = &pending[index];
            match node.event().predecessors_ready() {
                Err(kind) => {
                    debug!(
                        "queue {:?}: failing node {:?} after predecessor error {:?}",
                        self.id,
                        node.id(),
                        kind
                    );
                    node.event().fail(kind);
                    pending.remove(index);
                    // Re-scan from the same index; a dependent of the node
                    // just failed may sit later in this queue.
                }
                Ok(true) => {
                    let node = pending.remove(index).unwrap();
                    node.event().transition(EventStatus::Submitted);
                    return Some(node);
                }
                Ok(false) => index += 1,
            }
        }
        None
    }

    /// Drain everything currently eligible into the backend. Returns the
    /// number of nodes handed over.
    pub fn flush_ready(&self, backend: &dyn ExecutionBackend) -> usize {
        let mut submitted = 0;
        while let Some(node) = self.pop_ready() {
            backend.submit(node);
            submitted += 1;
        }
        submitted
    }
}

impl std::fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("id", &self.id)
            .field("device", &self.device.name())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}
