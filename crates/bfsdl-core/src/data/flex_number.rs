//! A flexible-precision number: significand × base ^ exponent, each
//! component carrying its own sign and packed digit streams.
//!
//! Grounded on `Bfdp::Data::FlexNumber`. This is the value type a BFSDL
//! numeric literal parses into (C11 builds one incrementally).

use alloc::format;
use alloc::string::String;

use super::sign::Sign;
use crate::bitmanip::DigitStream;

/// One signed, integral-plus-fractional number component (significand,
/// base, or exponent).
#[derive(Debug, Clone, Default)]
pub struct Component {
    /// This component's sign.
    pub sign: Sign,
    /// Digits before the (optional) point.
    pub integral: DigitStream,
    /// Digits after the point, if any.
    pub fractional: DigitStream,
}

impl Component {
    /// `true` iff at least the integral part is defined.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.integral.is_defined() || self.fractional.is_defined()
    }

    /// `true` iff there is no fractional part.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.integral.is_defined() && !self.fractional.is_defined()
    }

    /// Renders `[sign]<integral|'0'>[.<fractional>]`. `verbose` forces an
    /// explicit sign glyph even for `Positive`/`Unspecified`.
    #[must_use]
    pub fn get_str(&self, verbose: bool) -> String {
        let sign = if verbose {
            String::from(self.sign.verbose_glyph())
        } else {
            String::from(self.sign.concise_glyph())
        };
        let integral = self.integral.get_str();
        let integral = if integral.is_empty() { "0" } else { &integral };
        if self.fractional.is_defined() {
            format!("{sign}{integral}.{}", self.fractional.get_str())
        } else {
            format!("{sign}{integral}")
        }
    }
}

/// A three-component flexible number: `significand x base ^ exponent`.
#[derive(Debug, Clone, Default)]
pub struct FlexNumber {
    /// The mantissa.
    pub significand: Component,
    /// The exponent's base (radix the exponent is raised to), when present.
    pub base: Component,
    /// The exponent, when present.
    pub exponent: Component,
}

impl FlexNumber {
    /// A fresh, entirely-undefined number.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff the significand has a value.
    #[must_use]
    pub fn has_significand(&self) -> bool {
        self.significand.is_defined()
    }

    /// `true` iff both base and exponent are present.
    #[must_use]
    pub fn has_exponent(&self) -> bool {
        self.base.is_defined() && self.exponent.is_defined()
    }

    /// `true` iff either a significand or an exponent is present.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.has_significand() || self.has_exponent()
    }

    /// `true` iff the number is a plain integer with no exponent.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.significand.is_integral() && !self.has_exponent()
    }

    /// Renders `<significand>[ x <base> ^ <exponent>]`.
    #[must_use]
    pub fn get_str(&self, verbose: bool) -> String {
        let sig = self.significand.get_str(verbose);
        if self.has_exponent() {
            format!("{sig} x {} ^ {}", self.base.get_str(verbose), self.exponent.get_str(verbose))
        } else {
            sig
        }
    }
}
