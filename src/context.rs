//! Device and context identities.
//!
//! A [`Context`] groups the devices a client works against. Memory objects,
//! command queues and programs each belong to exactly one context, and every
//! cross-object operation checks that the contexts agree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static DEVICE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static CONTEXT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

/// Unique identifier for a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// One compute device visible to the runtime.
///
/// The core never talks to hardware; a device here is an identity plus the
/// capability bits validation needs.
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    name: String,
    image_support: bool,
}

impl Device {
    pub fn new<S: Into<String>>(name: S, image_support: bool) -> Arc<Self> {
        Arc::new(Self {
            id: DeviceId(DEVICE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            image_support,
        })
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the device can service image operations
    pub fn image_support(&self) -> bool {
        self.image_support
    }
}

/// A set of devices sharing memory objects and programs.
#[derive(Debug)]
pub struct Context {
    id: ContextId,
    devices: Vec<Arc<Device>>,
}

impl Context {
    pub fn new(devices: Vec<Arc<Device>>) -> Arc<Self> {
        Arc::new(Self {
            id: ContextId(CONTEXT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            devices,
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn contains_device(&self, id: DeviceId) -> bool {
        self.devices.iter().any(|d| d.id() == id)
    }
}
