//! Fixed-width integer values for constant evaluation
//!
//! [`IntValue`] wraps an arbitrary-precision integer together with a bit
//! width and a signedness, and keeps the value normalized into the
//! representable range after every operation: signed values live in
//! `[-2^(w-1), 2^(w-1))`, unsigned values in `[0, 2^w)`. Because operands
//! are always normalized, ordinary big-integer comparison and arithmetic
//! give the C result directly, and any wrap is recorded rather than lost.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::fmt;

/// An integer value with explicit width and signedness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntValue {
    value: BigInt,
    width: u32,
    signed: bool,
    wrapped: bool,
}

impl IntValue {
    /// Create a value, wrapping it into the representable range
    pub fn new(value: impl Into<BigInt>, width: u32, signed: bool) -> Self {
        let raw: BigInt = value.into();
        let (value, wrapped) = Self::normalize(raw, width, signed);
        Self {
            value,
            width,
            signed,
            wrapped,
        }
    }

    /// A 0/1 value of the given width and signedness
    pub fn from_bool(value: bool, width: u32, signed: bool) -> Self {
        Self::new(u8::from(value), width, signed)
    }

    fn normalize(raw: BigInt, width: u32, signed: bool) -> (BigInt, bool) {
        let modulus = BigInt::from(1u8) << width;
        let mut value = &raw % &modulus;
        if value.is_negative() {
            value += &modulus;
        }
        if signed && value >= (&modulus >> 1) {
            value -= &modulus;
        }
        let wrapped = value != raw;
        (value, wrapped)
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Whether normalization changed the numeric value when this value was
    /// produced. A surrounding compiler can watch this to diagnose overflow
    /// in constant expressions without the evaluator taking a position.
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Change the width, keeping the numeric value where it fits. For a
    /// normalized value this is exactly sign-extension (signed) or
    /// zero-extension (unsigned) when widening, and a bit-truncation when
    /// narrowing.
    pub fn extend_or_truncate(&self, width: u32) -> Self {
        Self::new(self.value.clone(), width, self.signed)
    }

    /// Reinterpret the bit pattern under a different signedness
    pub fn with_signedness(&self, signed: bool) -> Self {
        Self::new(self.value.clone(), self.width, signed)
    }

    /// The bit pattern read as an unsigned number, clamped to `max`. Used
    /// for shift amounts, where C's behavior is taken from the low bits.
    pub fn limited_value(&self, max: u64) -> u64 {
        let modulus = BigInt::from(1u8) << self.width;
        let mut bits = &self.value % &modulus;
        if bits.is_negative() {
            bits += &modulus;
        }
        match bits.to_u64() {
            Some(v) if v <= max => v,
            _ => max,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.value.to_i64()
    }

    // ------------------------------------------------------------------
    // Arithmetic; results take the left operand's width and signedness
    // ------------------------------------------------------------------

    pub fn add(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value + &rhs.value, self.width, self.signed)
    }

    pub fn sub(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value - &rhs.value, self.width, self.signed)
    }

    pub fn mul(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value * &rhs.value, self.width, self.signed)
    }

    /// Truncating division; the caller rejects a zero divisor
    pub fn div(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value / &rhs.value, self.width, self.signed)
    }

    /// Remainder with the dividend's sign; the caller rejects a zero divisor
    pub fn rem(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value % &rhs.value, self.width, self.signed)
    }

    pub fn bit_and(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value & &rhs.value, self.width, self.signed)
    }

    pub fn bit_or(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value | &rhs.value, self.width, self.signed)
    }

    pub fn bit_xor(&self, rhs: &IntValue) -> Self {
        Self::new(&self.value ^ &rhs.value, self.width, self.signed)
    }

    /// Left shift; the amount is clamped to `width - 1`
    pub fn shl(&self, rhs: &IntValue) -> Self {
        let amount = rhs.limited_value(u64::from(self.width) - 1);
        Self::new(&self.value << amount, self.width, self.signed)
    }

    /// Right shift; arithmetic for signed values, logical for unsigned.
    /// The amount is clamped to `width - 1`.
    pub fn shr(&self, rhs: &IntValue) -> Self {
        let amount = rhs.limited_value(u64::from(self.width) - 1);
        Self::new(&self.value >> amount, self.width, self.signed)
    }

    pub fn neg(&self) -> Self {
        Self::new(-&self.value, self.width, self.signed)
    }

    pub fn bit_not(&self) -> Self {
        Self::new(-&self.value - 1, self.width, self.signed)
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let v = IntValue::new(255, 8, false);
        assert_eq!(v.to_i64(), Some(255));
        assert!(!v.wrapped());

        let v = IntValue::new(256, 8, false);
        assert_eq!(v.to_i64(), Some(0));
        assert!(v.wrapped());

        let v = IntValue::new(255, 8, true);
        assert_eq!(v.to_i64(), Some(-1));
        assert!(v.wrapped());

        let v = IntValue::new(-128, 8, true);
        assert_eq!(v.to_i64(), Some(-128));
        assert!(!v.wrapped());
    }

    #[test]
    fn test_extend_and_truncate() {
        let v = IntValue::new(-1, 8, true);
        // Sign-extension keeps the value
        assert_eq!(v.extend_or_truncate(32).to_i64(), Some(-1));

        let u = v.with_signedness(false);
        assert_eq!(u.to_i64(), Some(255));
        // Zero-extension keeps the unsigned value
        assert_eq!(u.extend_or_truncate(32).to_i64(), Some(255));

        // Truncation wraps
        let big = IntValue::new(0x1_0000_0001u64, 64, false);
        assert_eq!(big.extend_or_truncate(32).to_i64(), Some(1));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        let max = IntValue::new(i32::MAX, 32, true);
        let one = IntValue::new(1, 32, true);
        let sum = max.add(&one);
        assert_eq!(sum.to_i64(), Some(i64::from(i32::MIN)));
        assert!(sum.wrapped());
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        let a = IntValue::new(-7, 32, true);
        let b = IntValue::new(2, 32, true);
        assert_eq!(a.div(&b).to_i64(), Some(-3));
        assert_eq!(a.rem(&b).to_i64(), Some(-1));
    }

    #[test]
    fn test_shift_clamping() {
        let one = IntValue::new(1, 32, true);
        let big_amount = IntValue::new(40, 32, true);
        // Amount clamps to 31; 1 << 31 wraps to INT_MIN in 32 signed bits
        assert_eq!(one.shl(&big_amount).to_i64(), Some(i64::from(i32::MIN)));

        let negative_amount = IntValue::new(-1, 32, true);
        // A negative amount reads as huge unsigned bits and clamps too
        assert_eq!(one.shl(&negative_amount).to_i64(), Some(i64::from(i32::MIN)));
    }

    #[test]
    fn test_shift_right_respects_signedness() {
        let a = IntValue::new(-8, 32, true);
        let two = IntValue::new(2, 32, true);
        assert_eq!(a.shr(&two).to_i64(), Some(-2));

        let u = IntValue::new(0x8000_0000u32, 32, false);
        assert_eq!(u.shr(&two).to_i64(), Some(0x2000_0000));
    }

    #[test]
    fn test_bit_not() {
        let v = IntValue::new(0, 32, true);
        assert_eq!(v.bit_not().to_i64(), Some(-1));
        assert_eq!(v.bit_not().bit_not().to_i64(), Some(0));

        let u = IntValue::new(0, 16, false);
        assert_eq!(u.bit_not().to_i64(), Some(0xFFFF));
    }
}
