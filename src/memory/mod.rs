//! Memory objects and the shared region validator.

pub mod object;
pub mod region;

pub use object::{
    ChannelOrder, ChannelType, ImageDesc, ImageDims, MemObject, MemObjectId, MemObjectKind,
};
pub use region::{check_bounds_3d, regions_overlap, Coord};
