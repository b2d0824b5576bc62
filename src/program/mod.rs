//! Programs, compilation orchestration and metadata queries.

pub mod binary;
pub mod compile;
pub mod info;
#[allow(clippy::module_inception)]
pub mod program;

pub use binary::{DeviceBinary, KernelBinaryRecord};
pub use compile::{CacheKey, CodeGenerator, Compiler, KernelInfo, ObjectCache, ReaderGuard};
pub use info::{ProgramInfoKind, ProgramInfoService};
pub use program::{Program, ProgramId};
