//! Scan conversion of convex polygons.
//!
//! The polygon is walked top to bottom with two active edges that leave the
//! topmost vertex in opposite directions around the vertex loop. For each
//! scanline the two edge records bound a span, which is then walked left to
//! right and handed to a [`PixelSink`] one pixel at a time.
//!
//! ```text
//!              top
//!              /\
//!   left edge /  \  right edge
//!  (walks    /----\ <- span at row y
//!  backward) \     \  (walks forward)
//!             \_____\
//! ```
//!
//! Coverage uses pixel-center sampling: pixel `(x, y)` is drawn when its
//! center `(x + 0.5, y + 0.5)` lies within the polygon. All attributes are
//! stepped incrementally (one add per live field per pixel), so the cost is
//! proportional to the number of covered pixels plus the vertex count.
//!
//! Only `sx` and `sy` are consumed here; all other live fields are
//! interpolated linearly in screen space. Perspective-correct attributes are
//! the caller's business (interpolate `q` alongside and divide in the sink).

use crate::interpolate::Incremental;
use crate::polygon::Polygon;
use crate::record::{Field, FieldSet, Record};

/// An inclusive rectangle of pixels that scan conversion may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Window {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Window covering a `width` x `height` image with its origin at (0, 0).
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    pub fn width(&self) -> u32 {
        (self.x1 - self.x0 + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y1 - self.y0 + 1).max(0) as u32
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// Receives the pixels produced by scan conversion.
///
/// This is the seam between the fixed-function part (coverage and
/// interpolation) and whatever the caller does per pixel: shading, texture
/// lookup, z-buffering, writing an image.
///
/// `record` holds every live field of the polygon except `sx` and `sy`, which
/// must not be read. The pixel center is `(x + 0.5, y + 0.5)`.
pub trait PixelSink {
    fn pixel(&mut self, x: i32, y: i32, record: &Record);
}

impl<F> PixelSink for F
where
    F: FnMut(i32, i32, &Record),
{
    #[inline]
    fn pixel(&mut self, x: i32, y: i32, record: &Record) {
        self(x, y, record)
    }
}

/// Direction an active edge walks around the vertex loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
    Backward,
    Forward,
}

/// One of the two polygon edges bounding the current scanline.
#[derive(Clone, Copy, Debug)]
struct ActiveEdge {
    walk: Walk,
    /// Vertex the current edge ends at.
    cursor: usize,
    /// First scanline the current edge no longer covers.
    end_row: i64,
    dda: Incremental,
}

impl ActiveEdge {
    fn new(walk: Walk, start: usize, end_row: i64) -> Self {
        Self {
            walk,
            cursor: start,
            end_row,
            dda: Incremental::default(),
        }
    }

    /// Moves onto the next polygon edge and prepares to step it from row `y`.
    fn seed(&mut self, vertices: &[Record], y: i64, fields: FieldSet) {
        let n = vertices.len();
        let from = self.cursor;
        let to = match self.walk {
            Walk::Backward => (from + n - 1) % n,
            Walk::Forward => (from + 1) % n,
        };

        let (a, b) = (&vertices[from], &vertices[to]);
        self.dda = Incremental::setup(a, b, Field::Sy, y as f32 + 0.5, fields);
        self.end_row = (b[Field::Sy] + 0.5).floor() as i64;
        self.cursor = to;
    }

    #[inline]
    fn sx(&self) -> f32 {
        self.dda.value[Field::Sx]
    }
}

/// Index of the vertex with the smallest `sy`. Ties go to the first one in
/// storage order.
pub fn top_vertex(vertices: &[Record]) -> Option<usize> {
    let mut top = None;
    let mut min_sy = f32::INFINITY;
    for (i, v) in vertices.iter().enumerate() {
        if v[Field::Sy] < min_sy {
            min_sy = v[Field::Sy];
            top = Some(i);
        }
    }
    top
}

/// Scan converts a convex polygon, calling `sink` once per covered pixel
/// inside `window`.
///
/// The polygon must already be in screen space (divided by `sw`). Pixels are
/// produced top to bottom and left to right within each row. Polygons with
/// fewer than three vertices, or with no height, produce nothing.
pub fn scan_convert<S>(polygon: &Polygon, window: &Window, sink: &mut S)
where
    S: PixelSink + ?Sized,
{
    let vertices = polygon.vertices();
    if vertices.len() < 3 {
        return;
    }
    let Some(top) = top_vertex(vertices) else {
        return;
    };

    // sy is consumed by the row walk, sx by the span walk
    let row_fields = polygon.fields().with(Field::Sx).without(Field::Sy);
    let span_fields = row_fields.without(Field::Sx);

    // Rows are tracked in i64 so vertices far outside the window can't
    // overflow the counters.
    let (win_y0, win_y1) = (i64::from(window.y0), i64::from(window.y1));
    let mut y = (vertices[top][Field::Sy] - 0.5).ceil() as i64;
    let mut left = ActiveEdge::new(Walk::Backward, top, y.saturating_sub(1));
    let mut right = ActiveEdge::new(Walk::Forward, top, y.saturating_sub(1));
    let mut remaining = vertices.len();

    log::trace!(
        "scan: {} vertices, top vertex {top}, first row {y}, fields {row_fields}",
        vertices.len()
    );

    while remaining > 0 {
        // Replace any edge that is already used up. Nearly flat edges can
        // end before the next row, so this may take several vertices.
        while left.end_row <= y && remaining > 0 {
            remaining -= 1;
            left.seed(vertices, y, row_fields);
        }
        while right.end_row <= y && remaining > 0 {
            remaining -= 1;
            right.seed(vertices, y, row_fields);
        }

        while y < left.end_row && y < right.end_row {
            if y > win_y1 {
                return;
            }
            if y < win_y0 {
                // Jump straight to the first visible row or the next vertex
                let skip = win_y0.min(left.end_row).min(right.end_row).saturating_sub(y);
                left.dda.advance_by(skip as f32, row_fields);
                right.dda.advance_by(skip as f32, row_fields);
                y += skip;
                continue;
            }

            // Inside the window, so y fits in i32
            let row = y as i32;
            if left.sx() <= right.sx() {
                scan_span(row, &left.dda.value, &right.dda.value, window, span_fields, sink);
            } else {
                scan_span(row, &right.dda.value, &left.dda.value, window, span_fields, sink);
            }
            y += 1;
            left.dda.advance(row_fields);
            right.dda.advance(row_fields);
        }
    }
}

/// Walks row `y` from edge record `l` to edge record `r`.
fn scan_span<S>(y: i32, l: &Record, r: &Record, window: &Window, fields: FieldSet, sink: &mut S)
where
    S: PixelSink + ?Sized,
{
    let lx = ((l[Field::Sx] - 0.5).ceil() as i32).max(window.x0);
    let rx = ((r[Field::Sx] - 0.5).floor() as i32).min(window.x1);
    if lx > rx {
        return;
    }

    let mut dda = Incremental::setup(l, r, Field::Sx, lx as f32 + 0.5, fields);
    for x in lx..=rx {
        sink.pixel(x, y, &dda.value);
        dda.advance(fields);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn flat(points: &[[f32; 2]]) -> Polygon {
        let vertices = points
            .iter()
            .map(|&[sx, sy]| Record::screen(sx, sy, 0.0, 1.0))
            .collect();
        Polygon::from_vertices(vertices, FieldSet::of(&[Field::Sx, Field::Sy]))
    }

    fn pixels(polygon: &Polygon, window: &Window) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        scan_convert(polygon, window, &mut |x: i32, y: i32, _: &Record| out.push((x, y)));
        out
    }

    fn rows(pixels: &[(i32, i32)]) -> BTreeMap<i32, Vec<i32>> {
        let mut rows: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for &(x, y) in pixels {
            rows.entry(y).or_default().push(x);
        }
        rows
    }

    #[test]
    fn right_triangle_covers_expected_pixels() {
        let tri = flat(&[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]);
        let got = pixels(&tri, &Window::new(0, 0, 10, 10));

        let mut expected = Vec::new();
        for (y, width) in [(0, 4), (1, 3), (2, 2), (3, 1)] {
            for x in 0..width {
                expected.push((x, y));
            }
        }
        assert_eq!(got, expected);
        assert_eq!(got.len(), 10);
    }

    #[test]
    fn top_vertex_tie_keeps_first() {
        let tri = flat(&[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]);
        assert_eq!(top_vertex(tri.vertices()), Some(0));

        let tri = flat(&[[0.0, 4.0], [4.0, 0.0], [0.0, 0.0]]);
        assert_eq!(top_vertex(tri.vertices()), Some(1));
        assert_eq!(top_vertex(&[]), None);
    }

    #[test]
    fn window_limits_rows_and_columns() {
        let tri = flat(&[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]);
        let got = pixels(&tri, &Window::new(1, 1, 2, 10));
        assert_eq!(got, vec![(1, 1), (2, 1), (1, 2)]);
    }

    #[test]
    fn spans_are_contiguous() {
        let hexagon = flat(&[
            [10.0, 2.3],
            [17.7, 6.1],
            [17.2, 14.8],
            [9.6, 19.4],
            [2.4, 14.0],
            [3.1, 6.6],
        ]);
        let got = pixels(&hexagon, &Window::new(0, 0, 31, 31));
        assert!(!got.is_empty());

        for (y, xs) in rows(&got) {
            for pair in xs.windows(2) {
                assert_eq!(pair[1], pair[0] + 1, "gap or duplicate in row {y}: {xs:?}");
            }
        }
    }

    #[test]
    fn vertex_order_does_not_change_coverage() {
        let ccw = flat(&[[1.2, 0.7], [9.4, 3.3], [6.1, 8.8], [0.5, 5.0]]);
        let cw = flat(&[[0.5, 5.0], [6.1, 8.8], [9.4, 3.3], [1.2, 0.7]]);
        let window = Window::new(0, 0, 15, 15);

        let mut a = pixels(&ccw, &window);
        let mut b = pixels(&cw, &window);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn adjacent_triangles_tile_without_overlap() {
        let window = Window::new(0, 0, 10, 10);
        let upper = flat(&[[0.0, 0.0], [4.0, 0.0], [4.0, 3.0]]);
        let lower = flat(&[[0.0, 0.0], [4.0, 3.0], [0.0, 3.0]]);

        let mut all = pixels(&upper, &window);
        all.extend(pixels(&lower, &window));
        all.sort();
        let before = all.len();
        all.dedup();

        assert_eq!(before, all.len(), "a pixel was drawn twice");
        assert_eq!(all.len(), 12);
    }

    #[test]
    fn degenerate_polygons_emit_nothing() {
        let window = Window::new(0, 0, 10, 10);
        assert!(pixels(&flat(&[[0.0, 2.0], [5.0, 2.0], [9.0, 2.0]]), &window).is_empty());
        assert!(pixels(&flat(&[[0.0, 0.0], [5.0, 5.0]]), &window).is_empty());
        assert!(pixels(&Polygon::default(), &window).is_empty());
    }

    #[test]
    fn vertex_far_above_window_does_not_overflow_rows() {
        let tri = flat(&[[0.0, -3e9], [4.0, 2.0], [0.0, 4.0]]);
        let got = rows(&pixels(&tri, &Window::new(0, 0, 10, 10)));

        let expected: BTreeMap<i32, Vec<i32>> = [
            (0, vec![0, 1, 2, 3]),
            (1, vec![0, 1, 2, 3]),
            (2, vec![0, 1, 2]),
            (3, vec![0]),
        ]
        .into_iter()
        .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn vertex_far_below_window_stops_at_last_row() {
        let tri = flat(&[[0.0, 0.0], [4.0, 0.0], [0.0, 3e9]]);
        let got = rows(&pixels(&tri, &Window::new(0, 0, 10, 10)));

        assert_eq!(got.keys().copied().collect::<Vec<_>>(), (0..=10).collect::<Vec<_>>());
        for xs in got.values() {
            assert_eq!(xs, &vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn polygon_outside_window_emits_nothing() {
        let tri = flat(&[[20.0, 20.0], [24.0, 20.0], [20.0, 24.0]]);
        assert!(pixels(&tri, &Window::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn attributes_interpolate_across_span() {
        let fields = FieldSet::of(&[Field::Sx, Field::Sy, Field::R]);
        let quad = Polygon::from_vertices(
            vec![
                Record::screen(0.0, 0.0, 0.0, 1.0).with(Field::R, 0.0),
                Record::screen(10.0, 0.0, 0.0, 1.0).with(Field::R, 1.0),
                Record::screen(10.0, 2.0, 0.0, 1.0).with(Field::R, 1.0),
                Record::screen(0.0, 2.0, 0.0, 1.0).with(Field::R, 0.0),
            ],
            fields,
        );

        let mut seen = 0;
        scan_convert(&quad, &Window::new(0, 0, 20, 20), &mut |x: i32, _y: i32, r: &Record| {
            assert_relative_eq!(r[Field::R], (x as f32 + 0.5) / 10.0, epsilon = 1e-5);
            seen += 1;
        });
        assert_eq!(seen, 20);
    }

    #[test]
    fn attributes_interpolate_down_edges() {
        let fields = FieldSet::of(&[Field::Sx, Field::Sy, Field::Sz]);
        let quad = Polygon::from_vertices(
            vec![
                Record::screen(0.0, 0.0, 0.0, 1.0),
                Record::screen(4.0, 0.0, 0.0, 1.0),
                Record::screen(4.0, 8.0, 1.0, 1.0),
                Record::screen(0.0, 8.0, 1.0, 1.0),
            ],
            fields,
        );

        scan_convert(&quad, &Window::new(0, 0, 9, 9), &mut |_x: i32, y: i32, r: &Record| {
            assert_relative_eq!(r[Field::Sz], (y as f32 + 0.5) / 8.0, epsilon = 1e-5);
        });
    }

    struct Counter {
        hits: usize,
    }

    impl PixelSink for Counter {
        fn pixel(&mut self, _x: i32, _y: i32, _record: &Record) {
            self.hits += 1;
        }
    }

    #[test]
    fn custom_sink_receives_pixels() {
        let square = flat(&[[1.0, 1.0], [5.0, 1.0], [5.0, 5.0], [1.0, 5.0]]);
        let mut counter = Counter { hits: 0 };
        scan_convert(&square, &Window::from_size(8, 8), &mut counter);
        assert_eq!(counter.hits, 16);
    }

    #[test]
    fn window_dimensions() {
        let w = Window::from_size(640, 480);
        assert_eq!((w.width(), w.height()), (640, 480));
        assert!(w.contains(639, 479));
        assert!(!w.contains(640, 0));
    }
}
