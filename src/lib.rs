//! Convex-polygon clipping and scan conversion.
//!
//! This crate is the fixed-function core of a software polygon renderer. It
//! does two things:
//!
//! 1. Clips a convex polygon against an axis-aligned 3-D box in homogeneous
//!    screen space ([`BoxClipper`], [`clip_to_box`]).
//! 2. Scan converts the clipped polygon, calling back once per covered pixel
//!    with every live vertex attribute interpolated to that pixel
//!    ([`scan_convert`]).
//!
//! Attributes are generic: a vertex is a [`Record`] of named scalar slots and
//! each [`Polygon`] carries a [`FieldSet`] saying which of them are live. The
//! same code interpolates positions, colors, texture coordinates, and normals
//! without knowing what they mean.
//!
//! Everything around the core belongs to the caller: building the transform,
//! the perspective divide between clipping and scan conversion, and whatever
//! happens to each pixel (shading, z-buffer, image writes).
//!
//! # Quick Start
//!
//! ```
//! use polyscan::prelude::*;
//!
//! let tri = Polygon::from_screen(&[
//!     [1.0, 1.0, 0.0, 1.0],
//!     [9.0, 2.0, 0.0, 1.0],
//!     [4.0, 8.0, 0.0, 1.0],
//! ]);
//! let window = Window::new(0, 0, 15, 15);
//! let bounds = ClipBox::from_window(&window, -1.0, 1.0);
//!
//! let mut covered = 0;
//! if let Some(poly) = clip_to_box(tri, &bounds)?.into_polygon() {
//!     scan_convert(&poly, &window, &mut |_x: i32, _y: i32, _r: &Record| covered += 1);
//! }
//! assert!(covered > 0);
//! # Ok::<(), polyscan::PolyScanError>(())
//! ```

pub mod clip;
pub mod error;
pub mod interpolate;
pub mod polygon;
pub mod record;
pub mod scan;

// Re-export commonly needed types at crate root for convenience
pub use clip::{clip_to_box, clip_to_half_space, BoxClipper, ClipBox, ClipOutcome, ClipPlane};
pub use error::{PolyScanError, Result};
pub use interpolate::Incremental;
pub use polygon::Polygon;
pub use record::{Field, FieldSet, Record, FIELD_COUNT};
pub use scan::{scan_convert, PixelSink, Window};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use polyscan::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::record::{Field, FieldSet, Record};

    // Polygons
    pub use crate::polygon::Polygon;

    // Clipping
    pub use crate::clip::{clip_to_box, BoxClipper, ClipBox, ClipOutcome};

    // Scan conversion
    pub use crate::scan::{scan_convert, PixelSink, Window};
}
