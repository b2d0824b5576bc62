//! Multi-device kernel compilation orchestration.
//!
//! Compilation is pure delegation: the code generator produces one compiled
//! artifact per (kernel, device), the object cache hands back its bytes, and
//! the orchestrator assembles and serializes the per-device binaries. The
//! orchestrator holds no global state and touches no filesystem itself.

use crate::config::Config;
use crate::context::{Device, DeviceId};
use crate::error::Result;
use crate::program::binary::{DeviceBinary, KernelBinaryRecord};
use crate::program::program::{Program, ProgramId};
use log::{debug, warn};
use std::sync::Arc;

/// The enumeration record the code generator reports per kernel.
#[derive(Debug, Clone)]
pub struct KernelInfo {
    pub name: String,
    pub num_args: u32,
    pub num_locals: u32,
    pub arg_metadata: Vec<u8>,
}

/// Locator for one compiled object in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub program: ProgramId,
    pub device: DeviceId,
    pub kernel: String,
    pub local_size: [usize; 3],
}

/// External code generator: compiles one kernel for one device. Opaque —
/// the core never inspects how code is produced, only that the artifact
/// becomes readable through the cache afterwards.
pub trait CodeGenerator: Send + Sync {
    /// Number of kernels creatable from the program, uncapped.
    fn kernel_count(&self, program: &Program) -> Result<usize>;

    /// The first `max` kernels creatable from the program, in a stable
    /// order. The binary table layout follows this order.
    fn enumerate_kernels(&self, program: &Program, max: usize) -> Result<Vec<KernelInfo>>;

    /// Produce a workgroup-specialized artifact for the given local size
    /// (all-zero means unspecialized).
    fn compile_kernel(
        &self,
        program: &Program,
        device: &Device,
        kernel: &KernelInfo,
        local_size: [usize; 3],
    ) -> Result<()>;
}

/// Read side of the compiled-object cache. The reader guard is scoped:
/// dropping it releases the lock on every exit path, error paths included.
pub trait ObjectCache: Send + Sync {
    fn object_key(
        &self,
        program: &Program,
        device: &Device,
        kernel: &str,
        local_size: [usize; 3],
    ) -> CacheKey;

    /// Block out a concurrent writer still finalizing this program/device's
    /// entries. Readers may hold this concurrently with each other.
    fn read_lock(&self, program: &Program, device: &Device) -> Result<Box<dyn ReaderGuard>>;

    fn read_object(&self, key: &CacheKey) -> Result<Vec<u8>>;
}

/// RAII handle for a cache read lock; released on drop.
pub trait ReaderGuard: Send {}

/// Drives per-kernel compilation across every device of a program and
/// commits the serialized binary table in one store.
pub struct Compiler {
    codegen: Arc<dyn CodeGenerator>,
    cache: Arc<dyn ObjectCache>,
    config: Config,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("config", &self.config)
            .finish()
    }
}

impl Compiler {
    pub fn new(
        codegen: Arc<dyn CodeGenerator>,
        cache: Arc<dyn ObjectCache>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codegen,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Kernels visible to compilation and name listing, clipped to the
    /// configured cap. Clipping is reported, never silent.
    pub fn enumerate_kernels(&self, program: &Program) -> Result<Vec<KernelInfo>> {
        let total = self.codegen.kernel_count(program)?;
        let cap = self.config.max_enumerated_kernels;
        if total > cap {
            warn!(
                "program {:?} declares {} kernels; enumeration clipped to {}",
                program.id(),
                total,
                cap
            );
        }
        self.codegen.enumerate_kernels(program, cap)
    }

    /// Number of kernels creatable from the program, uncapped.
    pub fn kernel_count(&self, program: &Program) -> Result<usize> {
        self.codegen.kernel_count(program)
    }

    /// Compile every kernel for every device of `program` and populate its
    /// binary table. Idempotent: a populated table returns immediately with
    /// no collaborator calls. Any failure leaves the table untouched — the
    /// table is committed only after every device succeeded.
    pub fn build(&self, program: &Program) -> Result<()> {
        if program.binaries_populated() {
            return Ok(());
        }

        let mut table = Vec::with_capacity(program.devices().len());
        for device in program.devices() {
            let binary = self.compile_device_kernels(program, device)?;
            table.push(binary.serialize());
        }
        program.commit_binaries(table);
        Ok(())
    }

    /// Enumerate, compile and read back every kernel for one device. An
    /// error drops all records assembled so far for this device.
    fn compile_device_kernels(&self, program: &Program, device: &Device) -> Result<DeviceBinary> {
        let kernels = self.enumerate_kernels(program)?;
        debug!(
            "compiling {} kernels of program {:?} for device {}",
            kernels.len(),
            program.id(),
            device.name()
        );

        let local_size = self.config.generic_local_size;
        let mut records = Vec::with_capacity(kernels.len());
        for kernel in &kernels {
            self.codegen
                .compile_kernel(program, device, kernel, local_size)?;

            let key = self
                .cache
                .object_key(program, device, &kernel.name, local_size);
            let object = {
                let _guard = self.cache.read_lock(program, device)?;
                self.cache.read_object(&key)?
            };

            records.push(KernelBinaryRecord {
                name: kernel.name.clone(),
                num_args: kernel.num_args,
                num_locals: kernel.num_locals,
                arg_metadata: kernel.arg_metadata.clone(),
                object,
            });
        }

        Ok(DeviceBinary {
            device: device.id(),
            kernels: records,
        })
    }
}
