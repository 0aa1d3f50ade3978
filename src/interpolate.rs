//! Field-generic interpolation.
//!
//! Two flavours are used by the kernel:
//!
//! - [`lerp`]: a one-off blend at parameter `t`, used by the clipper when an
//!   edge crosses a plane.
//! - [`Incremental`]: a DDA. `setup` evaluates the attributes at the first
//!   sample and the per-step delta; `advance` then walks one sample at a
//!   time with a single add per live field.
//!
//! Both only touch the fields named in the given [`FieldSet`]; every other
//! slot is left as it was.

use crate::record::{Field, FieldSet, Record};

/// Interpolates `a + (b - a) * t` over `fields`. Slots outside `fields` are
/// copied from `a`.
#[inline]
pub fn lerp(a: &Record, b: &Record, t: f32, fields: FieldSet) -> Record {
    let mut out = *a;
    for slot in fields.slots() {
        let av = a.slot(slot);
        *out.slot_mut(slot) = av + (b.slot(slot) - av) * t;
    }
    out
}

/// Incremental interpolation state along one driving coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Incremental {
    /// Attributes at the current sample.
    pub value: Record,
    /// Change per unit step of the driving coordinate.
    pub delta: Record,
}

impl Incremental {
    /// Prepares stepping from `origin` towards `target`, keyed on `key`.
    ///
    /// The per-step delta is `(target - origin) / (target[key] - origin[key])`
    /// and the starting value is evaluated at `key == at`. A zero-length
    /// drive is treated as length 1; such an edge covers no samples so the
    /// delta is never observed.
    ///
    /// `key` itself is interpolated only if it is in `fields`.
    pub fn setup(origin: &Record, target: &Record, key: Field, at: f32, fields: FieldSet) -> Self {
        let mut drive = target[key] - origin[key];
        if drive == 0.0 {
            drive = 1.0;
        }
        let offset = at - origin[key];

        let mut value = *origin;
        let mut delta = Record::ZERO;
        for slot in fields.slots() {
            let d = (target.slot(slot) - origin.slot(slot)) / drive;
            *delta.slot_mut(slot) = d;
            *value.slot_mut(slot) = origin.slot(slot) + d * offset;
        }
        Self { value, delta }
    }

    /// Steps one sample forward.
    #[inline]
    pub fn advance(&mut self, fields: FieldSet) {
        for slot in fields.slots() {
            *self.value.slot_mut(slot) += self.delta.slot(slot);
        }
    }

    /// Steps `steps` samples forward in one go.
    #[inline]
    pub fn advance_by(&mut self, steps: f32, fields: FieldSet) {
        for slot in fields.slots() {
            *self.value.slot_mut(slot) += self.delta.slot(slot) * steps;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lerp_touches_only_live_fields() {
        let a = Record::screen(0.0, 0.0, 0.0, 1.0).with(Field::R, 0.0).with(Field::U, 7.0);
        let b = Record::screen(10.0, 20.0, 0.0, 1.0).with(Field::R, 1.0).with(Field::U, 9.0);
        let fields = FieldSet::of(&[Field::Sx, Field::Sy, Field::R]);

        let m = lerp(&a, &b, 0.25, fields);
        assert_relative_eq!(m[Field::Sx], 2.5);
        assert_relative_eq!(m[Field::Sy], 5.0);
        assert_relative_eq!(m[Field::R], 0.25);
        // u is not live, so it keeps a's value
        assert_eq!(m[Field::U], 7.0);
    }

    #[test]
    fn setup_evaluates_at_sample_center() {
        let a = Record::screen(0.0, 0.0, 0.0, 1.0).with(Field::G, 0.0);
        let b = Record::screen(4.0, 8.0, 0.0, 1.0).with(Field::G, 1.0);
        let fields = FieldSet::of(&[Field::Sx, Field::G]);

        let inc = Incremental::setup(&a, &b, Field::Sy, 0.5, fields);
        assert_relative_eq!(inc.delta[Field::Sx], 0.5);
        assert_relative_eq!(inc.delta[Field::G], 0.125);
        assert_relative_eq!(inc.value[Field::Sx], 0.25);
        assert_relative_eq!(inc.value[Field::G], 0.0625);
    }

    #[test]
    fn advance_matches_direct_evaluation() {
        let a = Record::screen(2.0, 1.0, 0.0, 1.0).with(Field::B, 0.2);
        let b = Record::screen(12.0, 1.0, 0.0, 1.0).with(Field::B, 0.7);
        let fields = FieldSet::of(&[Field::B]);

        let mut inc = Incremental::setup(&a, &b, Field::Sx, 2.5, fields);
        for step in 0..10 {
            let x = 2.5 + step as f32;
            let expected = 0.2 + (x - 2.0) / 10.0 * 0.5;
            assert_relative_eq!(inc.value[Field::B], expected, epsilon = 1e-5);
            inc.advance(fields);
        }
    }

    #[test]
    fn advance_by_matches_repeated_advance() {
        let a = Record::screen(0.0, 0.0, 0.0, 1.0).with(Field::U, 1.0);
        let b = Record::screen(0.0, 16.0, 0.0, 1.0).with(Field::U, 5.0);
        let fields = FieldSet::of(&[Field::U]);

        let mut stepped = Incremental::setup(&a, &b, Field::Sy, 0.5, fields);
        let mut jumped = stepped;
        for _ in 0..6 {
            stepped.advance(fields);
        }
        jumped.advance_by(6.0, fields);
        assert_relative_eq!(jumped.value[Field::U], stepped.value[Field::U], epsilon = 1e-5);
    }

    #[test]
    fn zero_drive_does_not_divide_by_zero() {
        let a = Record::screen(3.0, 5.0, 0.0, 1.0);
        let b = Record::screen(9.0, 5.0, 0.0, 1.0);
        let inc = Incremental::setup(&a, &b, Field::Sy, 5.5, FieldSet::from(Field::Sx));
        assert!(inc.value[Field::Sx].is_finite());
        assert!(inc.delta[Field::Sx].is_finite());
    }
}
