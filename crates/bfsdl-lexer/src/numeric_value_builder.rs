//! Assembles a fixed-width signed or unsigned integer from successive
//! `parse_bits` calls, sign-extending on the first call when the field is
//! signed.
//!
//! Grounded on `Bfdp::Lexer::NumericValueBuilder`.

use crate::error::{trace, LexError, LexResult};

/// A fixed-width field's shape: total bit width split into integral and
/// fractional parts, plus signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldProperties {
    signed: bool,
    integral_bits: u32,
    fractional_bits: u32,
}

impl FieldProperties {
    fn total_bits(self) -> u32 {
        self.integral_bits + self.fractional_bits
    }
}

/// Accumulates a value from successive windows of bits, matching the raw
/// bit pattern a [`crate::stream_reader::StreamReader`] would deliver for
/// one field.
#[derive(Debug, Clone, Default)]
pub struct NumericValueBuilder {
    properties: Option<FieldProperties>,
    accumulator: u64,
    value_bits: u32,
    first_call_done: bool,
}

impl NumericValueBuilder {
    /// A fresh builder with no field properties set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines the field's shape and resets the accumulated value to 0.
    /// Rejects a zero-width field, a field wider than 64 bits, a signed
    /// field with no integral bits to hold a sign, and a signed field
    /// narrower than 2 bits total.
    pub fn set_field_properties(
        &mut self,
        signed: bool,
        integral_bits: u32,
        fractional_bits: u32,
    ) -> LexResult<()> {
        let total = integral_bits + fractional_bits;
        if total == 0 {
            trace("numeric_value_builder", "zero-width field");
            return Err(LexError::InvalidFieldProperties);
        }
        if total > 64 {
            trace("numeric_value_builder", "field wider than 64 bits");
            return Err(LexError::InvalidFieldProperties);
        }
        if signed && integral_bits == 0 {
            trace("numeric_value_builder", "signed field has no room for a sign bit");
            return Err(LexError::InvalidFieldProperties);
        }
        if signed && total < 2 {
            trace("numeric_value_builder", "signed field narrower than 2 bits");
            return Err(LexError::InvalidFieldProperties);
        }
        self.properties = Some(FieldProperties { signed, integral_bits, fractional_bits });
        self.accumulator = 0;
        self.value_bits = 0;
        self.first_call_done = false;
        Ok(())
    }

    /// `true` once [`NumericValueBuilder::set_field_properties`] has been
    /// called successfully.
    #[must_use]
    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    /// `true` iff `signed` was set in the current field properties.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.properties.is_some_and(|p| p.signed)
    }

    /// Bits accumulated so far versus the field's total width.
    #[must_use]
    pub fn get_bits_till_complete(&self) -> u32 {
        self.properties.map_or(0, |p| p.total_bits().saturating_sub(self.value_bits))
    }

    /// `true` once every bit of the field has been supplied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.has_properties() && self.get_bits_till_complete() == 0
    }

    /// Folds in the low `n_bits` of `value_lsb`, MSb-first across calls
    /// (each call's bits sit above the previously accumulated ones). On
    /// the very first call of a signed field, if the incoming window's
    /// high bit is set, the accumulator is pre-seeded with all ones
    /// (sign extension) before the new bits are merged in.
    pub fn parse_bits(&mut self, value_lsb: u64, n_bits: u32) -> LexResult<()> {
        let Some(properties) = self.properties else {
            trace("numeric_value_builder", "parse_bits before set_field_properties");
            return Err(LexError::InvalidFieldProperties);
        };
        let till_complete = self.get_bits_till_complete();
        if n_bits == 0 || n_bits > till_complete {
            trace("numeric_value_builder", "parse_bits: n_bits exceeds bits_till_complete");
            return Err(LexError::TooManyBitsRequested);
        }

        let mask = if n_bits == 64 { u64::MAX } else { (1u64 << n_bits) - 1 };
        let bits = value_lsb & mask;

        if !self.first_call_done {
            if properties.signed && n_bits > 0 {
                let sign_bit = (bits >> (n_bits - 1)) & 1;
                if sign_bit == 1 {
                    self.accumulator = u64::MAX;
                }
            }
            self.first_call_done = true;
        }

        self.accumulator = (self.accumulator << n_bits) | bits;
        self.value_bits += n_bits;
        Ok(())
    }

    /// The accumulated value reinterpreted as unsigned. Only meaningful
    /// once [`NumericValueBuilder::is_complete`].
    #[must_use]
    pub fn get_raw_u64(&self) -> u64 {
        let total = self.properties.map_or(64, FieldProperties::total_bits);
        if total >= 64 {
            self.accumulator
        } else {
            self.accumulator & ((1u64 << total) - 1)
        }
    }

    /// The accumulated value reinterpreted as a two's-complement `i64` of
    /// the field's total width, sign-extended per the first-call rule in
    /// [`NumericValueBuilder::parse_bits`]. Only meaningful once
    /// [`NumericValueBuilder::is_complete`].
    #[must_use]
    pub fn get_raw_s64(&self) -> i64 {
        let total = self.properties.map_or(64, FieldProperties::total_bits);
        if total >= 64 {
            self.accumulator as i64
        } else {
            let shift = 64 - total;
            ((self.accumulator << shift) as i64) >> shift
        }
    }

    /// Clears the accumulated value and field properties.
    pub fn reset(&mut self) {
        self.properties = None;
        self.accumulator = 0;
        self.value_bits = 0;
        self.first_call_done = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_shapes() {
        let mut b = NumericValueBuilder::new();
        assert!(b.set_field_properties(false, 0, 0).is_err());
        assert!(b.set_field_properties(false, 40, 30).is_err());
        assert!(b.set_field_properties(true, 0, 8).is_err());
        assert!(b.set_field_properties(true, 1, 0).is_err());
        assert!(b.set_field_properties(false, 8, 0).is_ok());
    }

    #[test]
    fn unsigned_accumulates_msb_first_across_calls() {
        let mut b = NumericValueBuilder::new();
        b.set_field_properties(false, 16, 0).unwrap();
        b.parse_bits(0xAB, 8).unwrap();
        b.parse_bits(0xCD, 8).unwrap();
        assert!(b.is_complete());
        assert_eq!(b.get_raw_u64(), 0xABCD);
    }

    #[test]
    fn s7_signed_s12_4_sign_extends_on_first_call() {
        // Bytes 0xB4, 0x59 as a signed 12.4 fixed-point field.
        let mut b = NumericValueBuilder::new();
        b.set_field_properties(true, 12, 4).unwrap();
        b.parse_bits(0xB4, 8).unwrap();
        b.parse_bits(0x59, 8).unwrap();
        assert!(b.is_complete());
        assert_eq!(b.get_raw_s64(), -19367);
    }

    #[test]
    fn positive_signed_value_does_not_sign_extend() {
        let mut b = NumericValueBuilder::new();
        b.set_field_properties(true, 8, 0).unwrap();
        b.parse_bits(0x7F, 8).unwrap();
        assert_eq!(b.get_raw_s64(), 127);
    }

    #[test]
    fn too_many_bits_requested_is_rejected() {
        let mut b = NumericValueBuilder::new();
        b.set_field_properties(false, 8, 0).unwrap();
        assert!(b.parse_bits(0xFF, 9).is_err());
        b.parse_bits(0xFF, 8).unwrap();
        assert!(b.parse_bits(0x1, 1).is_err());
    }

    #[test]
    fn reset_clears_properties() {
        let mut b = NumericValueBuilder::new();
        b.set_field_properties(false, 8, 0).unwrap();
        b.reset();
        assert!(!b.has_properties());
        assert!(!b.is_complete());
    }
}
