//! Convex polygons with per-vertex attribute records.

use crate::record::{FieldSet, Record};

/// A convex polygon: an ordered vertex loop plus the set of live fields
/// shared by every vertex.
///
/// Vertices wrap, so the last vertex connects back to the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    vertices: Vec<Record>,
    fields: FieldSet,
}

impl Polygon {
    /// Creates an empty polygon with the given live fields.
    pub fn new(fields: FieldSet) -> Self {
        Self {
            vertices: Vec::new(),
            fields,
        }
    }

    /// Creates an empty polygon with room for `capacity` vertices.
    pub fn with_capacity(fields: FieldSet, capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            fields,
        }
    }

    /// Creates a polygon from existing vertex records.
    pub fn from_vertices(vertices: Vec<Record>, fields: FieldSet) -> Self {
        Self { vertices, fields }
    }

    /// Creates a polygon from homogeneous screen positions
    /// `(sx, sy, sz, sw)` with [`FieldSet::SCREEN`] live.
    pub fn from_screen(points: &[[f32; 4]]) -> Self {
        let vertices = points
            .iter()
            .map(|&[sx, sy, sz, sw]| Record::screen(sx, sy, sz, sw))
            .collect();
        Self::from_vertices(vertices, FieldSet::SCREEN)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn vertices(&self) -> &[Record] {
        &self.vertices
    }

    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [Record] {
        &mut self.vertices
    }

    #[inline]
    pub fn fields(&self) -> FieldSet {
        self.fields
    }

    /// Replaces the live-field set, e.g. after a perspective divide makes
    /// `sw` meaningless and `q` meaningful.
    pub fn set_fields(&mut self, fields: FieldSet) {
        self.fields = fields;
    }

    pub fn push(&mut self, vertex: Record) {
        self.vertices.push(vertex);
    }

    /// Removes all vertices, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Becomes a copy of `other`, reusing this polygon's allocation.
    pub(crate) fn copy_from(&mut self, other: &Polygon) {
        self.vertices.clear();
        self.vertices.extend_from_slice(&other.vertices);
        self.fields = other.fields;
    }
}

impl std::ops::Index<usize> for Polygon {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.vertices[index]
    }
}
