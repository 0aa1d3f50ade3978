//! Vertex attribute records and active-field sets.
//!
//! Every vertex carries the same closed set of scalar slots. Which of those
//! slots actually mean something for a given polygon is tracked separately
//! in a [`FieldSet`], so the clipping and scan code can interpolate exactly
//! the live fields without knowing what they represent.
//!
//! ```text
//!  slot:  0  1  2  3  4 5 6  7 8 9  10 11 12  13 14 15
//!  field: sx sy sz sw x y z  u v q  r  g  b   nx ny nz
//!         |-screen--| |world| |tex| |color|  |normal-|
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Index, IndexMut, Sub};

use crate::error::{PolyScanError, Result};

/// Number of slots in a [`Record`].
pub const FIELD_COUNT: usize = 16;

// Membership is a `u32` bit per slot.
const _: () = assert!(FIELD_COUNT <= u32::BITS as usize);

/// A named slot in the attribute record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Field {
    /// Homogeneous screen x
    Sx = 0,
    /// Homogeneous screen y
    Sy,
    /// Homogeneous screen z
    Sz,
    /// Homogeneous screen w
    Sw,
    /// World-space x
    X,
    /// World-space y
    Y,
    /// World-space z
    Z,
    /// Texture u
    U,
    /// Texture v
    V,
    /// Texture q (homogeneous texture divisor)
    Q,
    /// Red
    R,
    /// Green
    G,
    /// Blue
    B,
    /// Normal x
    Nx,
    /// Normal y
    Ny,
    /// Normal z
    Nz,
}

impl Field {
    /// All fields in slot order.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Sx,
        Field::Sy,
        Field::Sz,
        Field::Sw,
        Field::X,
        Field::Y,
        Field::Z,
        Field::U,
        Field::V,
        Field::Q,
        Field::R,
        Field::G,
        Field::B,
        Field::Nx,
        Field::Ny,
        Field::Nz,
    ];

    /// Slot index of this field inside a [`Record`].
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }

    #[inline]
    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Short lowercase name, e.g. `"sx"`.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Sx => "sx",
            Field::Sy => "sy",
            Field::Sz => "sz",
            Field::Sw => "sw",
            Field::X => "x",
            Field::Y => "y",
            Field::Z => "z",
            Field::U => "u",
            Field::V => "v",
            Field::Q => "q",
            Field::R => "r",
            Field::G => "g",
            Field::B => "b",
            Field::Nx => "nx",
            Field::Ny => "ny",
            Field::Nz => "nz",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of fields that are live for a polygon.
///
/// Backed by one `u32`, one bit per [`Field`] slot. Iteration visits only
/// the set bits, so every per-field loop in the crate costs
/// O(active field count) rather than O([`FIELD_COUNT`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldSet(u32);

impl FieldSet {
    const SCHEMA_BITS: u32 = if FIELD_COUNT == u32::BITS as usize {
        u32::MAX
    } else {
        (1 << FIELD_COUNT) - 1
    };

    /// Homogeneous screen position `{sx, sy, sz, sw}`.
    pub const SCREEN: Self = Self::empty()
        .with(Field::Sx)
        .with(Field::Sy)
        .with(Field::Sz)
        .with(Field::Sw);

    /// World position `{x, y, z}`.
    pub const WORLD: Self = Self::empty().with(Field::X).with(Field::Y).with(Field::Z);

    /// Texture coordinates `{u, v, q}`.
    pub const TEXTURE: Self = Self::empty().with(Field::U).with(Field::V).with(Field::Q);

    /// Color `{r, g, b}`.
    pub const COLOR: Self = Self::empty().with(Field::R).with(Field::G).with(Field::B);

    /// Normal `{nx, ny, nz}`.
    pub const NORMAL: Self = Self::empty().with(Field::Nx).with(Field::Ny).with(Field::Nz);

    /// The set with no live fields.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every field in the schema.
    pub const fn all() -> Self {
        Self(Self::SCHEMA_BITS)
    }

    /// Creates a set holding exactly `fields`.
    pub fn of(fields: &[Field]) -> Self {
        fields.iter().fold(Self::empty(), |set, &f| set.with(f))
    }

    /// Builds a set from raw bits, rejecting bits past the end of the schema.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::SCHEMA_BITS != 0 {
            return Err(PolyScanError::UnknownFields { bits });
        }
        Ok(Self(bits))
    }

    /// Raw membership bits, bit `i` for slot `i`.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns this set with `field` added.
    #[inline]
    pub const fn with(self, field: Field) -> Self {
        Self(self.0 | field.bit())
    }

    /// Returns this set with `field` removed.
    #[inline]
    pub const fn without(self, field: Field) -> Self {
        Self(self.0 & !field.bit())
    }

    /// True when `field` is live.
    #[inline]
    pub const fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    /// Number of live fields.
    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when no field is live.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the live fields in ascending slot order.
    #[inline]
    pub fn iter(self) -> FieldSetIter {
        FieldSetIter(self.0)
    }

    /// Iterates the slot indices of the live fields.
    #[inline]
    pub(crate) fn slots(self) -> SlotIter {
        SlotIter(self.0)
    }
}

impl BitOr for FieldSet {
    type Output = FieldSet;

    fn bitor(self, rhs: FieldSet) -> FieldSet {
        FieldSet(self.0 | rhs.0)
    }
}

impl BitAnd for FieldSet {
    type Output = FieldSet;

    fn bitand(self, rhs: FieldSet) -> FieldSet {
        FieldSet(self.0 & rhs.0)
    }
}

impl Sub for FieldSet {
    type Output = FieldSet;

    fn sub(self, rhs: FieldSet) -> FieldSet {
        FieldSet(self.0 & !rhs.0)
    }
}

impl From<Field> for FieldSet {
    fn from(field: Field) -> Self {
        FieldSet::empty().with(field)
    }
}

impl FromIterator<Field> for FieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        iter.into_iter().fold(FieldSet::empty(), FieldSet::with)
    }
}

impl IntoIterator for FieldSet {
    type Item = Field;
    type IntoIter = FieldSetIter;

    fn into_iter(self) -> FieldSetIter {
        self.iter()
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        f.write_str("}")
    }
}

/// Iterator over the fields of a [`FieldSet`].
#[derive(Clone, Debug)]
pub struct FieldSetIter(u32);

impl Iterator for FieldSetIter {
    type Item = Field;

    #[inline]
    fn next(&mut self) -> Option<Field> {
        SlotIter(self.0).next().map(|slot| {
            self.0 &= self.0 - 1;
            Field::ALL[slot]
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for FieldSetIter {}

/// Iterator over slot indices, lowest bit first.
#[derive(Clone, Debug)]
pub(crate) struct SlotIter(u32);

impl Iterator for SlotIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let slot = self.0.trailing_zeros() as usize;
        // Clear the lowest set bit
        self.0 &= self.0 - 1;
        Some(slot)
    }
}

/// One vertex worth of attributes.
///
/// A record always stores a value for every slot. Slots outside the owning
/// polygon's [`FieldSet`] hold whatever was there before and carry no meaning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    values: [f32; FIELD_COUNT],
}

impl Record {
    pub const ZERO: Self = Self {
        values: [0.0; FIELD_COUNT],
    };

    pub const fn new() -> Self {
        Self::ZERO
    }

    /// Creates a record with only the homogeneous screen position filled in.
    pub fn screen(sx: f32, sy: f32, sz: f32, sw: f32) -> Self {
        let mut r = Self::ZERO;
        r.values[Field::Sx.slot()] = sx;
        r.values[Field::Sy.slot()] = sy;
        r.values[Field::Sz.slot()] = sz;
        r.values[Field::Sw.slot()] = sw;
        r
    }

    /// Returns a copy with `field` set to `value`.
    #[must_use]
    pub fn with(mut self, field: Field, value: f32) -> Self {
        self.values[field.slot()] = value;
        self
    }

    #[inline]
    pub fn get(&self, field: Field) -> f32 {
        self.values[field.slot()]
    }

    #[inline]
    pub fn set(&mut self, field: Field, value: f32) {
        self.values[field.slot()] = value;
    }

    #[inline]
    pub(crate) fn slot(&self, slot: usize) -> f32 {
        self.values[slot]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut f32 {
        &mut self.values[slot]
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Index<Field> for Record {
    type Output = f32;

    #[inline]
    fn index(&self, field: Field) -> &f32 {
        &self.values[field.slot()]
    }
}

impl IndexMut<Field> for Record {
    #[inline]
    fn index_mut(&mut self, field: Field) -> &mut f32 {
        &mut self.values[field.slot()]
    }
}

// =============================================================================
// Tests
// =============================================================================
