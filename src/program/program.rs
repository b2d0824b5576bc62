//! Programs and their per-device binary tables.

use crate::context::{Context, Device};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static PROGRAM_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// A program: optional source text, the devices it targets, and the
/// per-device table of serialized binaries.
///
/// The table is all-or-nothing: it is either empty or holds one serialized
/// binary per device, committed in a single store by the compilation
/// orchestrator. Partial population never escapes a failed build.
#[derive(Debug)]
pub struct Program {
    id: ProgramId,
    context: Arc<Context>,
    source: Option<String>,
    devices: Vec<Arc<Device>>,
    binaries: Mutex<Option<Vec<Vec<u8>>>>,
}

impl Program {
    pub fn from_source<S: Into<String>>(
        context: Arc<Context>,
        devices: Vec<Arc<Device>>,
        source: S,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: ProgramId(PROGRAM_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            context,
            source: Some(source.into()),
            devices,
            binaries: Mutex::new(None),
        })
    }

    /// A program with no source attached (e.g. created from binaries by a
    /// host layer outside this core).
    pub fn without_source(context: Arc<Context>, devices: Vec<Arc<Device>>) -> Arc<Self> {
        Arc::new(Self {
            id: ProgramId(PROGRAM_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            context,
            source: None,
            devices,
            binaries: Mutex::new(None),
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn binaries_populated(&self) -> bool {
        self.binaries.lock().is_some()
    }

    /// Store the full table. First committed table wins; a concurrent build
    /// that lost the race drops its work.
    pub(crate) fn commit_binaries(&self, table: Vec<Vec<u8>>) -> bool {
        debug_assert_eq!(table.len(), self.devices.len());
        let mut binaries = self.binaries.lock();
        if binaries.is_some() {
            return false;
        }
        *binaries = Some(table);
        true
    }

    /// Serialized size per device, parallel to `devices()`. `None` until a
    /// build has committed.
    pub fn binary_sizes(&self) -> Option<Vec<usize>> {
        self.binaries
            .lock()
            .as_ref()
            .map(|table| table.iter().map(Vec::len).collect())
    }

    /// Copy of one device's serialized binary.
    pub fn binary_for_device(&self, index: usize) -> Option<Vec<u8>> {
        self.binaries
            .lock()
            .as_ref()
            .and_then(|table| table.get(index).cloned())
    }
}
