//! Common imports for working with the runtime core.

pub use crate::command::{
    enqueue_rect_copy, CommandNode, CommandPayload, CommandQueue, Event, EventStatus,
    ExecutionBackend, KernelLaunch, RectCopy, RectCopyRequest,
};
pub use crate::config::Config;
pub use crate::context::{Context, Device};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::memory::{
    ChannelOrder, ChannelType, ImageDesc, ImageDims, MemObject, MemObjectKind,
};
pub use crate::program::{
    CodeGenerator, Compiler, DeviceBinary, KernelBinaryRecord, KernelInfo, ObjectCache, Program,
    ProgramInfoKind, ProgramInfoService,
};
