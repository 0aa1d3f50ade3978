//! Homogeneous clipping of convex polygons against an axis-aligned box.
//!
//! Clipping happens before the perspective divide, so every test stays
//! linear in (sx, sy, sz, sw). A vertex is outside the bound `b` on axis `a`
//! when
//!
//! ```text
//! sign * v[a] - v.sw * (sign * b) > 0
//! ```
//!
//! with `sign = -1` for the lower bounds (x0, y0, z0) and `sign = +1` for the
//! upper bounds (x1, y1, z1).
//!
//! Each plane is handled by Sutherland-Hodgman against one half-space. The
//! box clipper composes six of those passes, ping-ponging between two
//! preallocated buffers, and skips any plane that no vertex crosses.

use crate::error::{PolyScanError, Result};
use crate::interpolate::lerp;
use crate::polygon::Polygon;
use crate::record::{Field, Record};
use crate::scan::Window;

/// Worst-case vertex growth from clipping a convex polygon against a box:
/// at most one extra vertex per plane.
pub const CLIP_GROWTH: usize = 6;

/// A 3-D clip volume in screen space, tested homogeneously.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipBox {
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
    pub z0: f32,
    pub z1: f32,
}

impl ClipBox {
    pub fn new(x0: f32, x1: f32, y0: f32, y1: f32, z0: f32, z1: f32) -> Self {
        Self {
            x0,
            x1,
            y0,
            y1,
            z0,
            z1,
        }
    }

    /// Box covering the continuous area of a raster window's pixels.
    ///
    /// Pixel `x` spans `[x, x + 1)`, so the upper bounds are one past the
    /// window's inclusive maxima.
    pub fn from_window(window: &Window, z0: f32, z1: f32) -> Self {
        Self::new(
            window.x0 as f32,
            window.x1 as f32 + 1.0,
            window.y0 as f32,
            window.y1 as f32 + 1.0,
            z0,
            z1,
        )
    }

    /// True when `v` satisfies all six half-space inequalities to within
    /// `epsilon`.
    pub fn contains(&self, v: &Record, epsilon: f32) -> bool {
        ClipPlane::ALL
            .iter()
            .all(|plane| plane.signed_distance(self, v) <= epsilon)
    }
}

/// One face of a [`ClipBox`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipPlane {
    /// sx >= x0 * sw
    X0,
    /// sx <= x1 * sw
    X1,
    /// sy >= y0 * sw
    Y0,
    /// sy <= y1 * sw
    Y1,
    /// sz >= z0 * sw
    Z0,
    /// sz <= z1 * sw
    Z1,
}

impl ClipPlane {
    /// All six planes, in clipping order.
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::X0,
        ClipPlane::X1,
        ClipPlane::Y0,
        ClipPlane::Y1,
        ClipPlane::Z0,
        ClipPlane::Z1,
    ];

    /// The screen field this plane bounds.
    pub fn field(self) -> Field {
        match self {
            Self::X0 | Self::X1 => Field::Sx,
            Self::Y0 | Self::Y1 => Field::Sy,
            Self::Z0 | Self::Z1 => Field::Sz,
        }
    }

    /// -1 for lower bounds, +1 for upper bounds.
    pub fn sign(self) -> f32 {
        match self {
            Self::X0 | Self::Y0 | Self::Z0 => -1.0,
            Self::X1 | Self::Y1 | Self::Z1 => 1.0,
        }
    }

    /// The bound, pre-multiplied by [`sign`](Self::sign).
    pub fn threshold(self, bounds: &ClipBox) -> f32 {
        let bound = match self {
            Self::X0 => bounds.x0,
            Self::X1 => bounds.x1,
            Self::Y0 => bounds.y0,
            Self::Y1 => bounds.y1,
            Self::Z0 => bounds.z0,
            Self::Z1 => bounds.z1,
        };
        self.sign() * bound
    }

    /// Signed half-space value. Positive = outside, zero or negative = inside.
    #[inline]
    pub fn signed_distance(self, bounds: &ClipBox, v: &Record) -> f32 {
        half_space_value(v, self.field(), self.sign(), self.threshold(bounds))
    }

    #[inline]
    pub fn is_outside(self, bounds: &ClipBox, v: &Record) -> bool {
        self.signed_distance(bounds, v) > 0.0
    }
}

#[inline]
fn half_space_value(v: &Record, field: Field, sign: f32, threshold: f32) -> f32 {
    sign * v[field] - v[Field::Sw] * threshold
}

/// Clips `src` to the half-space `sign * v[field] - v.sw * threshold <= 0`,
/// writing the result into `dst`.
///
/// Every live field is interpolated at edge crossings, not just position.
/// `dst` ends up with between 0 and `src.len() + 1` vertices and the same
/// live fields as `src`.
pub fn clip_to_half_space(
    src: &Polygon,
    field: Field,
    sign: f32,
    threshold: f32,
    dst: &mut Polygon,
) {
    dst.clear();
    dst.set_fields(src.fields());

    let vertices = src.vertices();
    let Some(last) = vertices.last() else {
        return;
    };
    let fields = src.fields();

    let mut u = last;
    let mut tu = half_space_value(u, field, sign, threshold);

    for v in vertices {
        let tv = half_space_value(v, field, sign, threshold);

        // Edge u -> v crosses the plane
        if (tu <= 0.0) != (tv <= 0.0) {
            let t = tu / (tu - tv);
            dst.push(lerp(u, v, t, fields));
        }
        if tv <= 0.0 {
            dst.push(*v);
        }

        u = v;
        tu = tv;
    }
}

/// Result of clipping a polygon against a [`ClipBox`].
#[derive(Clone, Debug, PartialEq)]
pub enum ClipOutcome {
    /// Entirely inside; the input polygon is handed back untouched.
    In(Polygon),
    /// Entirely outside; nothing survives.
    Out,
    /// Straddles the box; this is the clipped polygon.
    Partial(Polygon),
}

impl ClipOutcome {
    pub fn is_in(&self) -> bool {
        matches!(self, Self::In(_))
    }

    pub fn is_out(&self) -> bool {
        matches!(self, Self::Out)
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    /// The surviving polygon, if any.
    pub fn into_polygon(self) -> Option<Polygon> {
        match self {
            Self::In(p) | Self::Partial(p) => Some(p),
            Self::Out => None,
        }
    }
}

/// Clips polygons against a box using two reusable scratch buffers.
///
/// Create one per thread (or per task) and feed it any number of polygons;
/// the buffers are reused between calls.
pub struct BoxClipper {
    buffers: [Polygon; 2],
    capacity: usize,
}

impl BoxClipper {
    /// Creates a clipper whose buffers hold `capacity` vertices. Polygons with
    /// more than `capacity - 6` vertices are rejected.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffers: [
                Polygon::with_capacity(Default::default(), capacity),
                Polygon::with_capacity(Default::default(), capacity),
            ],
            capacity,
        }
    }

    /// Creates a clipper able to take polygons of up to `max_vertices`.
    pub fn for_vertices(max_vertices: usize) -> Self {
        Self::new(max_vertices + CLIP_GROWTH)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clips `polygon` against `bounds`.
    ///
    /// Fails only when the polygon is too large for the buffers; that check
    /// runs before any clipping.
    pub fn clip(&mut self, polygon: Polygon, bounds: &ClipBox) -> Result<ClipOutcome> {
        let n = polygon.len();
        let required = n + CLIP_GROWTH;
        if required > self.capacity {
            log::debug!(
                "rejecting {n}-vertex polygon: needs {required} slots, clipper has {}",
                self.capacity
            );
            return Err(PolyScanError::CapacityExceeded {
                required,
                capacity: self.capacity,
            });
        }

        let mut outside = [0usize; 6];
        for v in polygon.vertices() {
            for (count, plane) in outside.iter_mut().zip(ClipPlane::ALL) {
                if plane.is_outside(bounds, v) {
                    *count += 1;
                }
            }
        }

        if outside.iter().all(|&count| count == 0) {
            log::trace!("box clip: {n} vertices, trivially inside");
            return Ok(ClipOutcome::In(polygon));
        }
        if outside.iter().any(|&count| count == n) {
            log::trace!("box clip: {n} vertices, trivially outside {outside:?}");
            return Ok(ClipOutcome::Out);
        }

        // None means the caller's polygon is the current input
        let mut current: Option<usize> = None;

        for (plane, &count) in ClipPlane::ALL.iter().zip(&outside) {
            if count == 0 {
                continue;
            }

            let target = match current {
                Some(i) => 1 - i,
                None => 0,
            };
            let [first, second] = &mut self.buffers;
            let (dst, scratch) = if target == 0 {
                (first, &*second)
            } else {
                (second, &*first)
            };
            let src = if current.is_some() { scratch } else { &polygon };

            clip_to_half_space(src, plane.field(), plane.sign(), plane.threshold(bounds), dst);

            if dst.is_empty() {
                log::trace!("box clip: {n} vertices, clipped away at {plane:?}");
                return Ok(ClipOutcome::Out);
            }
            current = Some(target);
        }

        match current {
            Some(i) => {
                let clipped = &self.buffers[i];
                log::trace!("box clip: {n} vertices -> {} vertices", clipped.len());
                let mut result = polygon;
                result.copy_from(clipped);
                Ok(ClipOutcome::Partial(result))
            }
            None => Ok(ClipOutcome::In(polygon)),
        }
    }
}

/// Clips a single polygon against `bounds` with freshly sized buffers.
pub fn clip_to_box(polygon: Polygon, bounds: &ClipBox) -> Result<ClipOutcome> {
    BoxClipper::for_vertices(polygon.len()).clip(polygon, bounds)
}

// =============================================================================
// Tests
// =============================================================================
