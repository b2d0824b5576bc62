//! Pure region arithmetic for rectangular copies.
//!
//! A 3-D region over linear or pitched memory is described by an origin, an
//! extent and row/slice pitches. Bounds checking and overlap detection here
//! are shared by every copy flavor; image copies rescale their fastest axis
//! to bytes before calling in (see `command::copy`).

use crate::error::{Error, Result};

/// 3-D origin or extent, in bytes along axis 0.
pub type Coord = [usize; 3];

/// Derive effective pitches and confirm the rectangular extent described by
/// `origin`/`region` lies entirely within `[0, size)`.
///
/// A zero pitch means "derive the default from the region": row pitch
/// defaults to `region[0]`, slice pitch to `region[1] * row_pitch`. An
/// explicit slice pitch must be a multiple of the row pitch.
///
/// Returns the effective `(row_pitch, slice_pitch)` on success. All region
/// components must be positive; callers reject zero-volume regions first.
pub fn check_bounds_3d(
    size: usize,
    origin: Coord,
    region: Coord,
    row_pitch: usize,
    slice_pitch: usize,
) -> Result<(usize, usize)> {
    if region[0] == 0 || region[1] == 0 || region[2] == 0 {
        return Err(Error::invalid_value("all region components must be > 0"));
    }
    if row_pitch != 0 && row_pitch < region[0] {
        return Err(Error::invalid_value(format!(
            "row pitch {} smaller than region width {}",
            row_pitch, region[0]
        )));
    }
    let row_pitch = if row_pitch == 0 { region[0] } else { row_pitch };

    if slice_pitch != 0 {
        if slice_pitch < region[1] * row_pitch {
            return Err(Error::invalid_value(format!(
                "slice pitch {} smaller than region height {} rows",
                slice_pitch, region[1]
            )));
        }
        if slice_pitch % row_pitch != 0 {
            return Err(Error::invalid_value(format!(
                "slice pitch {} not a multiple of row pitch {}",
                slice_pitch, row_pitch
            )));
        }
    }
    let slice_pitch = if slice_pitch == 0 {
        region[1] * row_pitch
    } else {
        slice_pitch
    };

    let last_byte = origin[0] + region[0] - 1
        + row_pitch * (origin[1] + region[1] - 1)
        + slice_pitch * (origin[2] + region[2] - 1);

    if last_byte >= size {
        return Err(Error::invalid_value(format!(
            "region ends at byte {} but object size is {}",
            last_byte, size
        )));
    }

    Ok((row_pitch, slice_pitch))
}

/// Conservative overlap test for two regions of one object sharing a single
/// extent and pitch layout.
///
/// First checks axis-aligned box intersection in all three dimensions. A
/// disjoint verdict is then re-checked against the linearized byte ranges
/// whenever a row extends past the row pitch or a slice past the slice
/// height, since pitched layouts let logically disjoint boxes alias the same
/// bytes. False positives are acceptable; false negatives are not.
pub fn regions_overlap(
    src_origin: Coord,
    dst_origin: Coord,
    region: Coord,
    row_pitch: usize,
    slice_pitch: usize,
) -> bool {
    let mut overlap = true;
    for i in 0..3 {
        overlap = overlap
            && src_origin[i] < dst_origin[i] + region[i]
            && src_origin[i] + region[i] > dst_origin[i];
    }
    if overlap {
        return true;
    }

    let linear = |origin: Coord| origin[2] * slice_pitch + origin[1] * row_pitch + origin[0];
    let span = region[2] * slice_pitch + region[1] * row_pitch + region[0];
    let src_start = linear(src_origin);
    let src_end = src_start + span;
    let dst_start = linear(dst_origin);
    let dst_end = dst_start + span;

    let ranges_touch = (src_start <= dst_start && dst_start < src_end)
        || (dst_start <= src_start && src_start < dst_end);

    // Row wrap: a row reaching past the pitch spills into the next row.
    let src_wrap_x = (src_origin[0] + region[0]).saturating_sub(row_pitch);
    let dst_wrap_x = (dst_origin[0] + region[0]).saturating_sub(row_pitch);
    if ((src_wrap_x > 0 && src_wrap_x > dst_origin[0])
        || (dst_wrap_x > 0 && dst_wrap_x > src_origin[0]))
        && ranges_touch
    {
        return true;
    }

    // Slice wrap: rows reaching past the slice height spill into the next
    // slice. Only meaningful for regions taller than one row.
    if region[1] > 1 {
        let slice_height = slice_pitch / row_pitch;
        let src_wrap_y = (src_origin[1] + region[1]).saturating_sub(slice_height);
        let dst_wrap_y = (dst_origin[1] + region[1]).saturating_sub(slice_height);
        if ((src_wrap_y > 0 && src_wrap_y > dst_origin[1])
            || (dst_wrap_y > 0 && dst_wrap_y > src_origin[1]))
            && ranges_touch
        {
            return true;
        }
    }

    false
}
