//! Program metadata queries.
//!
//! Every query is two-phase: with no output buffer the service only reports
//! the required byte size; with a buffer it writes the value, failing when
//! the capacity is too small. Binary-related queries lazily trigger the
//! compilation pipeline, but only when the caller actually asks for content
//! — a size-only probe never compiles anything.

use crate::error::{Error, Result};
use crate::program::compile::Compiler;
use crate::program::program::Program;
use log::debug;
use std::sync::Arc;

/// The fixed enumeration of queryable metadata kinds.
///
/// `Raw` carries a numeric tag a host layer passed through without an
/// implemented arm; dispatching it is a programming error, not a runtime
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramInfoKind {
    ReferenceCount,
    Context,
    NumDevices,
    Devices,
    Source,
    NumKernels,
    KernelNames,
    BinarySizes,
    Binaries,
    Raw(u32),
}

/// Read-side API over programs. Owns the compiler so binary queries can
/// trigger a build on first request.
#[derive(Debug)]
pub struct ProgramInfoService {
    compiler: Compiler,
}

impl ProgramInfoService {
    pub fn new(compiler: Compiler) -> Self {
        Self { compiler }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Answer one metadata query. Returns the required size in bytes; when
    /// `output` is supplied the value is also written. Scalar values are
    /// encoded little-endian; strings carry a trailing NUL counted in the
    /// required size.
    pub fn query(
        &self,
        program: &Arc<Program>,
        kind: ProgramInfoKind,
        output: Option<&mut [u8]>,
    ) -> Result<usize> {
        match kind {
            ProgramInfoKind::ReferenceCount => {
                let count = Arc::strong_count(program) as u32;
                write_value(output, &count.to_le_bytes())
            }
            ProgramInfoKind::Context => {
                write_value(output, &program.context().id().0.to_le_bytes())
            }
            ProgramInfoKind::NumDevices => {
                let count = program.devices().len() as u32;
                write_value(output, &count.to_le_bytes())
            }
            ProgramInfoKind::Devices => {
                let mut ids = Vec::with_capacity(program.devices().len() * 8);
                for device in program.devices() {
                    ids.extend_from_slice(&device.id().0.to_le_bytes());
                }
                write_value(output, &ids)
            }
            ProgramInfoKind::Source => {
                let mut text = program.source().unwrap_or("").as_bytes().to_vec();
                text.push(0);
                write_value(output, &text)
            }
            ProgramInfoKind::NumKernels => {
                let count = self.compiler.kernel_count(program)? as u64;
                write_value(output, &count.to_le_bytes())
            }
            ProgramInfoKind::KernelNames => {
                let kernels = self.compiler.enumerate_kernels(program)?;
                let mut joined = Vec::new();
                for (i, kernel) in kernels.iter().enumerate() {
                    if i != 0 {
                        joined.push(b';');
                    }
                    joined.extend_from_slice(kernel.name.as_bytes());
                }
                joined.push(0);
                write_value(output, &joined)
            }
            ProgramInfoKind::BinarySizes => {
                let required = program.devices().len() * 8;
                match output {
                    None => Ok(required),
                    Some(buf) => {
                        self.compiler.build(program)?;
                        let sizes = self.compiler_sizes(program);
                        let mut bytes = Vec::with_capacity(required);
                        for size in sizes {
                            bytes.extend_from_slice(&(size as u64).to_le_bytes());
                        }
                        write_value(Some(buf), &bytes)
                    }
                }
            }
            ProgramInfoKind::Binaries => {
                // The binaries themselves go out through per-device slots
                // (`query_binaries`); the flat arm only reports the size of
                // the slot table.
                let required = program.devices().len() * 8;
                match output {
                    None => Ok(required),
                    Some(_) => Err(Error::invalid_value(
                        "binary bytes are retrieved through query_binaries",
                    )),
                }
            }
            ProgramInfoKind::Raw(tag) => {
                panic!("unimplemented program info query: {tag:#x}");
            }
        }
    }

    /// Copy each device's serialized binary into its slot. `None` slots are
    /// skipped, allowing selective retrieval; `slots` must carry one entry
    /// per device. Triggers compilation on first request.
    pub fn query_binaries(
        &self,
        program: &Arc<Program>,
        slots: &mut [Option<&mut [u8]>],
    ) -> Result<()> {
        if slots.len() != program.devices().len() {
            return Err(Error::invalid_value(format!(
                "expected {} binary slots, got {}",
                program.devices().len(),
                slots.len()
            )));
        }

        if !program.binaries_populated() {
            debug!("first binary request for program {:?}, compiling", program.id());
        }
        self.compiler.build(program)?;

        for (index, slot) in slots.iter_mut().enumerate() {
            let Some(buf) = slot else { continue };
            let binary = program
                .binary_for_device(index)
                .expect("binary table populated by build");
            if buf.len() < binary.len() {
                return Err(Error::invalid_value(format!(
                    "binary slot {} holds {} bytes but needs {}",
                    index,
                    buf.len(),
                    binary.len()
                )));
            }
            buf[..binary.len()].copy_from_slice(&binary);
        }
        Ok(())
    }

    fn compiler_sizes(&self, program: &Arc<Program>) -> Vec<usize> {
        program
            .binary_sizes()
            .expect("binary table populated by build")
    }
}

/// Two-phase write helper: reports the required size, copies when a buffer
/// is supplied, rejects insufficient capacity.
fn write_value(output: Option<&mut [u8]>, value: &[u8]) -> Result<usize> {
    let required = value.len();
    if let Some(buf) = output {
        if buf.len() < required {
            return Err(Error::invalid_value(format!(
                "output buffer holds {} bytes but query needs {}",
                buf.len(),
                required
            )));
        }
        buf[..required].copy_from_slice(value);
    }
    Ok(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_value_size_only() {
        assert_eq!(write_value(None, &[1, 2, 3]).unwrap(), 3);
    }

    #[test]
    fn test_write_value_copies() {
        let mut buf = [0u8; 4];
        assert_eq!(write_value(Some(&mut buf), &[1, 2, 3]).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_write_value_too_small() {
        let mut buf = [0u8; 2];
        assert!(write_value(Some(&mut buf), &[1, 2, 3]).is_err());
    }
}
