//! Rectangular copy enqueue.
//!
//! Buffer↔buffer, buffer↔image and image↔image copies share one validation
//! path, with the image-specific checks keyed off which side the caller
//! declares to be an image. Nothing is linked into the dependency graph
//! until every check has passed.

use crate::command::event::Event;
use crate::command::node::{CommandPayload, RectCopy};
use crate::command::queue::CommandQueue;
use crate::error::{Error, Result};
use crate::memory::{check_bounds_3d, regions_overlap, Coord, ImageDims, MemObject};
use log::debug;
use std::sync::Arc;

/// Everything the caller supplies for one rectangular copy.
///
/// Origins and region are in the source/destination's own units: pixels for
/// an image side, bytes for a buffer side. Zero pitches derive the packed
/// default; image sides always use the image's own pitches.
#[derive(Debug)]
pub struct RectCopyRequest<'a> {
    pub src: Arc<MemObject>,
    pub src_is_image: bool,
    pub dst: Arc<MemObject>,
    pub dst_is_image: bool,
    pub src_origin: Coord,
    pub dst_origin: Coord,
    pub region: Coord,
    pub src_row_pitch: usize,
    pub src_slice_pitch: usize,
    pub dst_row_pitch: usize,
    pub dst_slice_pitch: usize,
    /// `None` means no dependencies. `Some(&[])` is rejected: a supplied
    /// wait list must contain at least one event.
    pub wait_list: Option<&'a [Arc<Event>]>,
}

/// Validate `request` against `queue`, build the command node and link it
/// into the queue's pending graph. Returns the node's completion event.
pub fn enqueue_rect_copy(
    queue: &Arc<CommandQueue>,
    request: RectCopyRequest<'_>,
) -> Result<Arc<Event>> {
    let src = &request.src;
    let dst = &request.dst;

    if (request.src_is_image || request.dst_is_image) && !queue.device().image_support() {
        return Err(Error::invalid_operation(format!(
            "device {} does not support images",
            queue.device().name()
        )));
    }

    if request.src_is_image {
        let desc = src
            .image_desc()
            .ok_or_else(|| Error::invalid_mem_object("src is not an image"))?;
        if matches!(desc.dims, ImageDims::Dim2) && request.src_origin[2] != 0 {
            return Err(Error::invalid_value(
                "src_origin[2] must be 0 for a 2D src image",
            ));
        }
    } else if src.is_image() {
        return Err(Error::invalid_mem_object("src is not a buffer"));
    }

    if request.dst_is_image {
        let desc = dst
            .image_desc()
            .ok_or_else(|| Error::invalid_mem_object("dst is not an image"))?;
        if matches!(desc.dims, ImageDims::Dim2) && request.dst_origin[2] != 0 {
            return Err(Error::invalid_value(
                "dst_origin[2] must be 0 for a 2D dst image",
            ));
        }
    } else if dst.is_image() {
        return Err(Error::invalid_mem_object("dst is not a buffer"));
    }

    if request.src_is_image && request.dst_is_image {
        let src_desc = src.image_desc().unwrap();
        let dst_desc = dst.image_desc().unwrap();
        if src_desc.channel_order != dst_desc.channel_order {
            return Err(Error::format_mismatch(
                "src and dst have different channel order",
            ));
        }
        if src_desc.channel_type != dst_desc.channel_type {
            return Err(Error::format_mismatch(
                "src and dst have different channel data type",
            ));
        }
        if (matches!(src_desc.dims, ImageDims::Dim2) || matches!(dst_desc.dims, ImageDims::Dim2))
            && request.region[2] != 1
        {
            return Err(Error::invalid_value(
                "region[2] must be 1 for any 2D image copy",
            ));
        }
    }

    // Image sides express origin/region in pixels; rescale the fastest axis
    // to bytes before the shared bounds and overlap checks. When only one
    // side is an image, the region is rescaled once using that side's pixel
    // size, while each origin stays in its own object's units.
    let mut region = request.region;
    let mut src_origin = request.src_origin;
    let mut dst_origin = request.dst_origin;
    let mut src_row_pitch = request.src_row_pitch;
    let mut src_slice_pitch = request.src_slice_pitch;
    let mut dst_row_pitch = request.dst_row_pitch;
    let mut dst_slice_pitch = request.dst_slice_pitch;

    if request.src_is_image {
        let desc = src.image_desc().unwrap();
        region[0] *= desc.pixel_size();
        src_origin[0] *= desc.pixel_size();
        src_row_pitch = desc.row_pitch;
        src_slice_pitch = desc.slice_pitch;
    }
    if request.dst_is_image {
        let desc = dst.image_desc().unwrap();
        if !request.src_is_image {
            region[0] *= desc.pixel_size();
        }
        dst_origin[0] *= desc.pixel_size();
        dst_row_pitch = desc.row_pitch;
        dst_slice_pitch = desc.slice_pitch;
    }

    if queue.context().id() != src.context().id() || queue.context().id() != dst.context().id() {
        return Err(Error::invalid_context(
            "src, dst and queue are not from the same context",
        ));
    }

    if let Some(wait_list) = request.wait_list {
        if wait_list.is_empty() {
            return Err(Error::invalid_value("supplied wait list is empty"));
        }
    }

    if region[0] == 0 || region[1] == 0 || region[2] == 0 {
        return Err(Error::invalid_value("all region components must be > 0"));
    }

    let (src_row_pitch, src_slice_pitch) = check_bounds_3d(
        src.size(),
        src_origin,
        region,
        src_row_pitch,
        src_slice_pitch,
    )?;
    let (dst_row_pitch, dst_slice_pitch) = check_bounds_3d(
        dst.size(),
        dst_origin,
        region,
        dst_row_pitch,
        dst_slice_pitch,
    )?;

    if src.id() == dst.id() {
        if src_slice_pitch != dst_slice_pitch {
            return Err(Error::invalid_value(
                "same-object copy with differing slice pitches",
            ));
        }
        if src_row_pitch != dst_row_pitch {
            return Err(Error::invalid_value(
                "same-object copy with differing row pitches",
            ));
        }
        if regions_overlap(src_origin, dst_origin, region, src_row_pitch, src_slice_pitch) {
            debug!(
                "rejecting same-object copy: {:?}->{:?} x {:?} overlaps",
                src_origin, dst_origin, region
            );
            return Err(Error::copy_overlap(
                "source and destination regions overlap",
            ));
        }
    }

    let src_device = src
        .owning_device()
        .unwrap_or_else(|| queue.device())
        .clone();
    let dst_device = dst
        .owning_device()
        .unwrap_or_else(|| queue.device())
        .clone();

    queue.enqueue(
        CommandPayload::RectCopy(RectCopy {
            src: Arc::clone(src),
            dst: Arc::clone(dst),
            src_device,
            dst_device,
            src_origin,
            dst_origin,
            region,
            src_row_pitch,
            src_slice_pitch,
            dst_row_pitch,
            dst_slice_pitch,
        }),
        request.wait_list,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Context, Device};
    use crate::error::ErrorKind;
    use crate::memory::{ChannelOrder, ChannelType, ImageDesc, ImageDims};

    fn setup() -> (Arc<Context>, Arc<CommandQueue>) {
        let device = Device::new("gpu0", true);
        let context = Context::new(vec![Arc::clone(&device)]);
        let queue = CommandQueue::new(Arc::clone(&context), device).unwrap();
        (context, queue)
    }

    fn buffer_copy_request<'a>(
        src: &Arc<MemObject>,
        dst: &Arc<MemObject>,
        src_origin: Coord,
        dst_origin: Coord,
        region: Coord,
        row_pitch: usize,
    ) -> RectCopyRequest<'a> {
        RectCopyRequest {
            src: Arc::clone(src),
            src_is_image: false,
            dst: Arc::clone(dst),
            dst_is_image: false,
            src_origin,
            dst_origin,
            region,
            src_row_pitch: row_pitch,
            src_slice_pitch: 0,
            dst_row_pitch: row_pitch,
            dst_slice_pitch: 0,
            wait_list: None,
        }
    }

    #[test]
    fn test_buffer_copy_enqueues() {
        let (context, queue) = setup();
        let src = MemObject::buffer(Arc::clone(&context), 256).unwrap();
        let dst = MemObject::buffer(context, 256).unwrap();

        let event = enqueue_rect_copy(
            &queue,
            buffer_copy_request(&src, &dst, [0, 0, 0], [0, 0, 0], [64, 2, 1], 128),
        )
        .unwrap();
        assert_eq!(queue.pending_len(), 1);
        assert!(event.predecessors().is_empty());
    }

    #[test]
    fn test_same_buffer_overlap_rejected() {
        let (context, queue) = setup();
        let buf = MemObject::buffer(context, 64).unwrap();

        // Byte ranges [0,4) and [2,6) with row pitch 8.
        let err = enqueue_rect_copy(
            &queue,
            buffer_copy_request(&buf, &buf, [0, 0, 0], [2, 0, 0], [4, 1, 1], 8),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CopyOverlap);
        // Nothing was linked into the graph.
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_same_buffer_disjoint_allowed() {
        let (context, queue) = setup();
        let buf = MemObject::buffer(context, 64).unwrap();

        enqueue_rect_copy(
            &queue,
            buffer_copy_request(&buf, &buf, [0, 0, 0], [4, 0, 0], [4, 1, 1], 8),
        )
        .unwrap();
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_zero_region_rejected() {
        let (context, queue) = setup();
        let src = MemObject::buffer(Arc::clone(&context), 64).unwrap();
        let dst = MemObject::buffer(context, 64).unwrap();

        let err = enqueue_rect_copy(
            &queue,
            buffer_copy_request(&src, &dst, [0, 0, 0], [0, 0, 0], [4, 0, 1], 0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let (context, queue) = setup();
        let src = MemObject::buffer(Arc::clone(&context), 16).unwrap();
        let dst = MemObject::buffer(context, 64).unwrap();

        let err = enqueue_rect_copy(
            &queue,
            buffer_copy_request(&src, &dst, [8, 0, 0], [0, 0, 0], [16, 1, 1], 0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_empty_wait_list_rejected() {
        let (context, queue) = setup();
        let src = MemObject::buffer(Arc::clone(&context), 64).unwrap();
        let dst = MemObject::buffer(context, 64).unwrap();

        let mut request =
            buffer_copy_request(&src, &dst, [0, 0, 0], [0, 0, 0], [8, 1, 1], 0);
        request.wait_list = Some(&[]);
        let err = enqueue_rect_copy(&queue, request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cross_context_rejected() {
        let (_, queue) = setup();
        let other = Context::new(vec![Device::new("cpu", true)]);
        let src = MemObject::buffer(Arc::clone(&other), 64).unwrap();
        let dst = MemObject::buffer(other, 64).unwrap();

        let err = enqueue_rect_copy(
            &queue,
            buffer_copy_request(&src, &dst, [0, 0, 0], [0, 0, 0], [8, 1, 1], 0),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidContext);
    }

    #[test]
    fn test_kind_flag_mismatch_rejected() {
        let (context, queue) = setup();
        let buf = MemObject::buffer(Arc::clone(&context), 64).unwrap();
        let dst = MemObject::buffer(context, 64).unwrap();

        let mut request = buffer_copy_request(&buf, &dst, [0, 0, 0], [0, 0, 0], [8, 1, 1], 0);
        request.src_is_image = true;
        let err = enqueue_rect_copy(&queue, request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMemObject);
    }

    fn image_2d(context: &Arc<Context>, order: ChannelOrder, ty: ChannelType) -> Arc<MemObject> {
        MemObject::image(
            Arc::clone(context),
            ImageDesc {
                dims: ImageDims::Dim2,
                channel_order: order,
                channel_type: ty,
                row_pitch: 0,
                slice_pitch: 0,
            },
            16,
            16,
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_image_format_mismatch() {
        let (context, queue) = setup();
        let src = image_2d(&context, ChannelOrder::Rgba, ChannelType::Float32);
        let dst = image_2d(&context, ChannelOrder::Rgba, ChannelType::Unorm8);

        let err = enqueue_rect_copy(
            &queue,
            RectCopyRequest {
                src,
                src_is_image: true,
                dst,
                dst_is_image: true,
                src_origin: [0, 0, 0],
                dst_origin: [0, 0, 0],
                region: [4, 4, 1],
                src_row_pitch: 0,
                src_slice_pitch: 0,
                dst_row_pitch: 0,
                dst_slice_pitch: 0,
                wait_list: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImageFormatMismatch);
    }

    #[test]
    fn test_2d_image_third_origin_rejected() {
        let (context, queue) = setup();
        let src = image_2d(&context, ChannelOrder::Rgba, ChannelType::Float32);
        let dst = image_2d(&context, ChannelOrder::Rgba, ChannelType::Float32);

        let err = enqueue_rect_copy(
            &queue,
            RectCopyRequest {
                src,
                src_is_image: true,
                dst,
                dst_is_image: true,
                src_origin: [0, 0, 1],
                dst_origin: [0, 0, 0],
                region: [4, 4, 1],
                src_row_pitch: 0,
                src_slice_pitch: 0,
                dst_row_pitch: 0,
                dst_slice_pitch: 0,
                wait_list: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_image_to_buffer_rescale() {
        let (context, queue) = setup();
        // 16x16 RGBA float image: 16 bytes per pixel, row pitch 256.
        let img = image_2d(&context, ChannelOrder::Rgba, ChannelType::Float32);
        let buf = MemObject::buffer(context, 4096).unwrap();

        let event = enqueue_rect_copy(
            &queue,
            RectCopyRequest {
                src: img,
                src_is_image: true,
                dst: Arc::clone(&buf),
                dst_is_image: false,
                src_origin: [2, 0, 0],
                dst_origin: [0, 0, 0],
                region: [4, 4, 1],
                src_row_pitch: 0,
                src_slice_pitch: 0,
                dst_row_pitch: 0,
                dst_slice_pitch: 0,
                wait_list: None,
            },
        )
        .unwrap();
        drop(event);

        let node = queue.pop_ready().unwrap();
        match node.payload() {
            CommandPayload::RectCopy(copy) => {
                // Pixels scaled to bytes on the image side only.
                assert_eq!(copy.region[0], 4 * 16);
                assert_eq!(copy.src_origin[0], 2 * 16);
                assert_eq!(copy.dst_origin[0], 0);
                assert_eq!(copy.src_row_pitch, 256);
                // Buffer side derives its pitch from the rescaled region.
                assert_eq!(copy.dst_row_pitch, 64);
            }
            other => panic!("unexpected payload {:?}", other.type_name()),
        }
    }

    #[test]
    fn test_owning_device_resolved_at_enqueue() {
        let queue_dev = Device::new("gpu0", true);
        let other_dev = Device::new("gpu1", true);
        let context = Context::new(vec![Arc::clone(&queue_dev), Arc::clone(&other_dev)]);
        let queue = CommandQueue::new(Arc::clone(&context), Arc::clone(&queue_dev)).unwrap();

        let src = MemObject::buffer(Arc::clone(&context), 64)
            .unwrap()
            .with_owning_device(Arc::clone(&other_dev));
        let dst = MemObject::buffer(context, 64).unwrap();

        enqueue_rect_copy(
            &queue,
            buffer_copy_request(&src, &dst, [0, 0, 0], [0, 0, 0], [8, 1, 1], 0),
        )
        .unwrap();

        let node = queue.pop_ready().unwrap();
        match node.payload() {
            CommandPayload::RectCopy(copy) => {
                // A pinned object keeps its device; an unpinned one falls
                // back to the queue's device.
                assert_eq!(copy.src_device.id(), other_dev.id());
                assert_eq!(copy.dst_device.id(), queue_dev.id());
            }
            other => panic!("unexpected payload {:?}", other.type_name()),
        }
    }

    #[test]
    fn test_image_op_needs_device_support() {
        let device = Device::new("nosupport", false);
        let context = Context::new(vec![Arc::clone(&device)]);
        let queue = CommandQueue::new(Arc::clone(&context), device).unwrap();
        let img = image_2d(&context, ChannelOrder::Rgba, ChannelType::Float32);
        let buf = MemObject::buffer(context, 4096).unwrap();

        let err = enqueue_rect_copy(
            &queue,
            RectCopyRequest {
                src: img,
                src_is_image: true,
                dst: buf,
                dst_is_image: false,
                src_origin: [0, 0, 0],
                dst_origin: [0, 0, 0],
                region: [4, 4, 1],
                src_row_pitch: 0,
                src_slice_pitch: 0,
                dst_row_pitch: 0,
                dst_slice_pitch: 0,
                wait_list: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }
}
