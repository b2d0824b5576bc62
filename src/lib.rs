//! NEXA - Node-based EXecution for Accelerators
//!
//! The device-independent execution core of a portable compute runtime:
//! work targeted at heterogeneous devices becomes dependency-tracked
//! command nodes, rectangular copies are validated against strict
//! memory-safety rules, and a multi-device compilation pipeline produces
//! serializable per-device kernel binaries backed by an object cache.
//!
//! # Quick Start
//!
//! ```no_run
//! use nexa_rs::prelude::*;
//! use std::sync::Arc;
//!
//! let device = Device::new("gpu0", true);
//! let context = Context::new(vec![Arc::clone(&device)]);
//! let queue = CommandQueue::new(Arc::clone(&context), device).unwrap();
//!
//! let src = MemObject::buffer(Arc::clone(&context), 4096).unwrap();
//! let dst = MemObject::buffer(context, 4096).unwrap();
//!
//! let event = enqueue_rect_copy(&queue, RectCopyRequest {
//!     src,
//!     src_is_image: false,
//!     dst,
//!     dst_is_image: false,
//!     src_origin: [0, 0, 0],
//!     dst_origin: [0, 0, 0],
//!     region: [1024, 1, 1],
//!     src_row_pitch: 0,
//!     src_slice_pitch: 0,
//!     dst_row_pitch: 0,
//!     dst_slice_pitch: 0,
//!     wait_list: None,
//! }).unwrap();
//!
//! // A device backend drains ready nodes and drives the event to
//! // completion; clients observe progress through the event alone.
//! assert_eq!(event.status(), EventStatus::Queued);
//! ```
//!
//! # Architecture
//!
//! - **Region validation**: pure bounds/overlap arithmetic shared by every
//!   copy flavor, with pixel→byte rescaling for image endpoints
//! - **Dependency graph**: per-queue pending lists of command nodes gated
//!   on predecessor events; errors cascade without executing dependents
//! - **Compilation**: per-device kernel binaries assembled through injected
//!   code-generator and object-cache collaborators, committed all-or-nothing
//! - **Metadata queries**: two-phase sized reads with lazy compilation on
//!   first binary request

#![warn(missing_debug_implementations)]

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod program;

pub use config::{Config, ConfigBuilder, DEFAULT_KERNEL_ENUM_CAP};
pub use context::{Context, ContextId, Device, DeviceId};
pub use error::{Error, ErrorKind, Result};
