//! Serializable per-device binaries.
//!
//! One `DeviceBinary` holds every kernel compiled for one program on one
//! device. The wire layout is flat and fixed-order, little-endian:
//! device id (u64), kernel count (u32), then per kernel — name length (u32),
//! name bytes, arg count (u32), local-arg count (u32), metadata length
//! (u32), metadata blob, object byte count (u64), object bytes.
//! `serialized_size` always equals the bytes `serialize` produces, so a
//! caller can size its buffer before asking for the content.

use crate::context::DeviceId;
use crate::error::{Error, Result};

/// One kernel's compiled representation. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelBinaryRecord {
    pub name: String,
    pub num_args: u32,
    pub num_locals: u32,
    pub arg_metadata: Vec<u8>,
    pub object: Vec<u8>,
}

impl KernelBinaryRecord {
    fn serialized_size(&self) -> usize {
        4 + self.name.len() + 4 + 4 + 4 + self.arg_metadata.len() + 8 + self.object.len()
    }
}

/// The serialized set of compiled kernels for one program on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBinary {
    pub device: DeviceId,
    pub kernels: Vec<KernelBinaryRecord>,
}

impl DeviceBinary {
    /// Exact number of bytes `serialize` will produce.
    pub fn serialized_size(&self) -> usize {
        8 + 4 + self.kernels.iter().map(KernelBinaryRecord::serialized_size).sum::<usize>()
    }

    /// Flatten into a buffer sized exactly to the content.
    pub fn serialize(&self) -> Vec<u8> {
        let size = self.serialized_size();
        let mut buf = Vec::with_capacity(size);
        buf.extend_from_slice(&self.device.0.to_le_bytes());
        buf.extend_from_slice(&(self.kernels.len() as u32).to_le_bytes());
        for kernel in &self.kernels {
            buf.extend_from_slice(&(kernel.name.len() as u32).to_le_bytes());
            buf.extend_from_slice(kernel.name.as_bytes());
            buf.extend_from_slice(&kernel.num_args.to_le_bytes());
            buf.extend_from_slice(&kernel.num_locals.to_le_bytes());
            buf.extend_from_slice(&(kernel.arg_metadata.len() as u32).to_le_bytes());
            buf.extend_from_slice(&kernel.arg_metadata);
            buf.extend_from_slice(&(kernel.object.len() as u64).to_le_bytes());
            buf.extend_from_slice(&kernel.object);
        }
        debug_assert_eq!(buf.len(), size);
        buf
    }

    /// Restore a binary from its serialized form. Truncated or trailing
    /// input is rejected rather than partially decoded.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor { bytes, offset: 0 };
        let device = DeviceId(cursor.read_u64()?);
        let kernel_count = cursor.read_u32()? as usize;
        let mut kernels = Vec::with_capacity(kernel_count);
        for _ in 0..kernel_count {
            let name_len = cursor.read_u32()? as usize;
            let name = String::from_utf8(cursor.read_bytes(name_len)?.to_vec())
                .map_err(|_| Error::invalid_value("kernel name is not valid UTF-8"))?;
            let num_args = cursor.read_u32()?;
            let num_locals = cursor.read_u32()?;
            let meta_len = cursor.read_u32()? as usize;
            let arg_metadata = cursor.read_bytes(meta_len)?.to_vec();
            let object_len = cursor.read_u64()? as usize;
            let object = cursor.read_bytes(object_len)?.to_vec();
            kernels.push(KernelBinaryRecord {
                name,
                num_args,
                num_locals,
                arg_metadata,
                object,
            });
        }
        if cursor.offset != bytes.len() {
            return Err(Error::invalid_value("trailing bytes after binary"));
        }
        Ok(Self { device, kernels })
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| Error::invalid_value("truncated binary"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_bytes(4)?.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_bytes(8)?.try_into().unwrap()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_binary() -> DeviceBinary {
        DeviceBinary {
            device: DeviceId(7),
            kernels: vec![
                KernelBinaryRecord {
                    name: "add".into(),
                    num_args: 3,
                    num_locals: 0,
                    arg_metadata: vec![1, 2, 3],
                    object: vec![0xde, 0xad, 0xbe, 0xef],
                },
                KernelBinaryRecord {
                    name: "mul".into(),
                    num_args: 3,
                    num_locals: 1,
                    arg_metadata: Vec::new(),
                    object: vec![0xca, 0xfe],
                },
            ],
        }
    }

    #[test]
    fn test_size_matches_bytes_written() {
        let binary = sample_binary();
        let bytes = binary.serialize();
        assert_eq!(bytes.len(), binary.serialized_size());
    }

    #[test]
    fn test_restore() {
        let binary = sample_binary();
        let restored = DeviceBinary::deserialize(&binary.serialize()).unwrap();
        assert_eq!(restored, binary);
    }

    #[test]
    fn test_truncated_input_rejected() {
        let bytes = sample_binary().serialize();
        assert!(DeviceBinary::deserialize(&bytes[..bytes.len() - 1]).is_err());
        assert!(DeviceBinary::deserialize(&bytes[..5]).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample_binary().serialize();
        bytes.push(0);
        assert!(DeviceBinary::deserialize(&bytes).is_err());
    }
}
