// Storage-level integers and floats. These only carry bit patterns around,
// any arithmetic is left to num-bigint (or whoever produced the bits).

use num_bigint::{BigInt, BigUint, Sign};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

use crate::{Error, ErrorKind, Result};

pub fn words_for(bit_width: u32) -> usize {
    (bit_width as usize + 63) / 64
}

fn clear_unused_bits(words: &mut [u64], bit_width: u32) {
    let rem = bit_width % 64;
    if rem != 0 {
        if let Some(last) = words.last_mut() {
            *last &= (1u64 << rem) - 1;
        }
    }
}

/// A fixed-width integer bit pattern stored as little-endian 64-bit words.
///
/// Bits above `bit_width` are always zero. Whether the pattern is read as
/// signed or unsigned is up to the caller, see [`ApInt::to_bigint`] and
/// [`ApInt::to_biguint`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ApInt {
    bit_width: u32,
    words: Vec<u64>
}

impl ApInt {
    pub fn new(bit_width: u32, mut words: Vec<u64>) -> Result<Self> {
        if bit_width == 0 {
            return Err(Error::new_const(ErrorKind::BadFormat, "integer bit width must be non-zero"))
        }
        if words.len() != words_for(bit_width) {
            return Err(Error::new_const(ErrorKind::BadFormat, "word count does not match bit width"))
        }
        clear_unused_bits(&mut words, bit_width);
        Ok(Self { bit_width, words })
    }

    // words have already been validated when they were first stored
    pub(crate) fn from_raw(bit_width: u32, words: &[u64]) -> Self {
        debug_assert_eq!(words.len(), words_for(bit_width));
        Self { bit_width, words: words.to_vec() }
    }

    pub fn from_u64(value: u64, bit_width: u32) -> Self {
        assert!(bit_width > 0, "integer bit width must be non-zero");
        let mut words = vec![0; words_for(bit_width)];
        words[0] = value;
        clear_unused_bits(&mut words, bit_width);
        Self { bit_width, words }
    }

    pub fn from_i64(value: i64, bit_width: u32) -> Self {
        assert!(bit_width > 0, "integer bit width must be non-zero");
        let fill = if value < 0 { u64::MAX } else { 0 };
        let mut words = vec![fill; words_for(bit_width)];
        words[0] = value as u64;
        clear_unused_bits(&mut words, bit_width);
        Self { bit_width, words }
    }

    // Wraps `value` modulo 2^bit_width (two's complement for negatives)
    pub fn from_bigint(value: &BigInt, bit_width: u32) -> Self {
        assert!(bit_width > 0, "integer bit width must be non-zero");
        let modulus = BigInt::from(1u8) << bit_width as usize;
        let mut rem = value % &modulus;
        if rem.sign() == Sign::Minus {
            rem += &modulus;
        }
        let mut words = rem.magnitude().to_u64_digits();
        words.resize(words_for(bit_width), 0);
        Self { bit_width, words }
    }

    pub fn bit_width(&self) -> u32 { self.bit_width }
    pub fn words(&self) -> &[u64] { &self.words }
    pub fn num_words(&self) -> usize { self.words.len() }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    fn sign_bit(&self) -> bool {
        let top = self.bit_width - 1;
        (self.words[(top / 64) as usize] >> (top % 64)) & 1 == 1
    }

    pub fn to_biguint(&self) -> BigUint {
        let bytes: Vec<u8> = self.words.iter().flat_map(|w| w.to_le_bytes()).collect();
        BigUint::from_bytes_le(&bytes)
    }

    pub fn to_bigint(&self) -> BigInt {
        let unsigned = BigInt::from(self.to_biguint());
        if self.sign_bit() {
            unsigned - (BigInt::from(1u8) << self.bit_width as usize)
        } else {
            unsigned
        }
    }
}

impl fmt::Display for ApInt {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_bigint())
    }
}

#[derive(IntoPrimitive, TryFromPrimitive)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum FloatFormat {
    IeeeHalf,
    BFloat,
    IeeeSingle,
    IeeeDouble,
    X87DoubleExtended,
    IeeeQuad,
    PpcDoubleDouble
}

impl FloatFormat {
    pub fn bit_size(&self) -> u32 {
        use FloatFormat::*;
        match self {
            IeeeHalf | BFloat => 16,
            IeeeSingle => 32,
            IeeeDouble => 64,
            X87DoubleExtended => 80,
            IeeeQuad | PpcDoubleDouble => 128
        }
    }
}

impl Into<&'static str> for FloatFormat {
    fn into(self) -> &'static str {
        use FloatFormat::*;
        match self {
            IeeeHalf => "half",
            BFloat => "bfloat",
            IeeeSingle => "single",
            IeeeDouble => "double",
            X87DoubleExtended => "x87_extended",
            IeeeQuad => "quad",
            PpcDoubleDouble => "ppc_double_double"
        }
    }
}

/// A floating point bit pattern tagged with its format.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ApFloat {
    format: FloatFormat,
    bits: ApInt
}

impl ApFloat {
    pub fn new(format: FloatFormat, bits: ApInt) -> Result<Self> {
        if bits.bit_width() != format.bit_size() {
            return Err(Error::new_const(ErrorKind::BadFormat, "bit pattern does not match float format"))
        }
        Ok(Self { format, bits })
    }

    pub fn from_f32(value: f32) -> Self {
        Self { format: FloatFormat::IeeeSingle, bits: ApInt::from_u64(value.to_bits() as u64, 32) }
    }

    pub fn from_f64(value: f64) -> Self {
        Self { format: FloatFormat::IeeeDouble, bits: ApInt::from_u64(value.to_bits(), 64) }
    }

    pub fn format(&self) -> FloatFormat { self.format }
    pub fn bits(&self) -> &ApInt { &self.bits }

    pub fn to_f32(&self) -> Option<f32> {
        match self.format {
            FloatFormat::IeeeSingle => Some(f32::from_bits(self.bits.words()[0] as u32)),
            _ => None
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self.format {
            FloatFormat::IeeeSingle => self.to_f32().map(f64::from),
            FloatFormat::IeeeDouble => Some(f64::from_bits(self.bits.words()[0])),
            _ => None
        }
    }
}

impl fmt::Display for ApFloat {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if let Some(f) = self.to_f32() {
            return write!(fmt, "{}", f)
        }
        if let Some(f) = self.to_f64() {
            return write!(fmt, "{}", f)
        }
        let name: &'static str = self.format.into();
        write!(fmt, "{}(0x", name)?;
        for w in self.bits.words().iter().rev() {
            write!(fmt, "{:016x}", w)?;
        }
        write!(fmt, ")")
    }
}
