//! Buffer and image objects.

use crate::context::{Context, Device};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static MEM_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a memory object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemObjectId(pub u64);

/// Channel layout of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    R,
    Rg,
    Rgb,
    Rgba,
    Bgra,
}

impl ChannelOrder {
    pub fn channel_count(self) -> usize {
        match self {
            ChannelOrder::R => 1,
            ChannelOrder::Rg => 2,
            ChannelOrder::Rgb => 3,
            ChannelOrder::Rgba | ChannelOrder::Bgra => 4,
        }
    }
}

/// Per-channel storage type of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    Unorm8,
    Unorm16,
    Sint32,
    Uint32,
    Float32,
}

impl ChannelType {
    pub fn element_size(self) -> usize {
        match self {
            ChannelType::Unorm8 => 1,
            ChannelType::Unorm16 => 2,
            ChannelType::Sint32 | ChannelType::Uint32 | ChannelType::Float32 => 4,
        }
    }
}

/// Image dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDims {
    Dim2,
    Dim3,
}

/// Geometry and format of an image object.
///
/// Origins and regions over an image are expressed in pixels; the copy path
/// rescales the fastest-varying axis to bytes using `pixel_size` before the
/// shared validator runs.
#[derive(Debug, Clone, Copy)]
pub struct ImageDesc {
    pub dims: ImageDims,
    pub channel_order: ChannelOrder,
    pub channel_type: ChannelType,
    pub row_pitch: usize,
    pub slice_pitch: usize,
}

impl ImageDesc {
    /// Bytes per pixel: element size times channel count
    pub fn pixel_size(&self) -> usize {
        self.channel_type.element_size() * self.channel_order.channel_count()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum MemObjectKind {
    Buffer,
    Image(ImageDesc),
}

/// A buffer or image bound to one context.
///
/// Ownership is shared: every command node referencing the object holds an
/// `Arc` clone until the node is reclaimed, so the object outlives all
/// in-flight work that touches it.
#[derive(Debug)]
pub struct MemObject {
    id: MemObjectId,
    context: Arc<Context>,
    kind: MemObjectKind,
    size: usize,
    owning_device: Option<Arc<Device>>,
}

impl MemObject {
    /// Create a buffer of `size` bytes.
    pub fn buffer(context: Arc<Context>, size: usize) -> Result<Arc<Self>> {
        if size == 0 {
            return Err(Error::invalid_value("buffer size must be > 0"));
        }
        Ok(Arc::new(Self {
            id: MemObjectId(MEM_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            context,
            kind: MemObjectKind::Buffer,
            size,
            owning_device: None,
        }))
    }

    /// Create an image. Zero pitches derive the packed defaults from the
    /// pixel dimensions; `depth` must be 1 for 2-D images.
    pub fn image(
        context: Arc<Context>,
        desc: ImageDesc,
        width: usize,
        height: usize,
        depth: usize,
    ) -> Result<Arc<Self>> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::invalid_value("image dimensions must be > 0"));
        }
        if matches!(desc.dims, ImageDims::Dim2) && depth != 1 {
            return Err(Error::invalid_value("2D image depth must be 1"));
        }

        let mut desc = desc;
        if desc.row_pitch == 0 {
            desc.row_pitch = width * desc.pixel_size();
        }
        if desc.row_pitch < width * desc.pixel_size() {
            return Err(Error::invalid_value("image row pitch smaller than a row"));
        }
        if desc.slice_pitch == 0 {
            desc.slice_pitch = desc.row_pitch * height;
        }
        if desc.slice_pitch < desc.row_pitch * height {
            return Err(Error::invalid_value("image slice pitch smaller than a slice"));
        }

        Ok(Arc::new(Self {
            id: MemObjectId(MEM_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            context,
            kind: MemObjectKind::Image(desc),
            size: desc.slice_pitch * depth,
            owning_device: None,
        }))
    }

    /// Pin the object to one device. Unpinned objects resolve to the
    /// enqueuing queue's device at enqueue time.
    pub fn with_owning_device(self: &Arc<Self>, device: Arc<Device>) -> Arc<Self> {
        Arc::new(Self {
            id: self.id,
            context: Arc::clone(&self.context),
            kind: self.kind,
            size: self.size,
            owning_device: Some(device),
        })
    }

    pub fn id(&self) -> MemObjectId {
        self.id
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn kind(&self) -> &MemObjectKind {
        &self.kind
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, MemObjectKind::Image(_))
    }

    pub fn image_desc(&self) -> Option<&ImageDesc> {
        match &self.kind {
            MemObjectKind::Image(desc) => Some(desc),
            MemObjectKind::Buffer => None,
        }
    }

    pub fn owning_device(&self) -> Option<&Arc<Device>> {
        self.owning_device.as_ref()
    }
}
