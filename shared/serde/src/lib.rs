//! # Netstate Serde
//! Bit-granular serialization for the netstate sync core: a `Serde` trait
//! over `BitWriter`/`BitReader`, fixed- and variable-width integer
//! encodings, and ranged-float quantization.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod integer;
mod quantize;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::{
    read_bits, write_bits, SignedInteger, SignedVariableInteger, UnsignedInteger,
    UnsignedVariableInteger,
};
pub use quantize::{dequantize, quantize, RoundMode};
pub use serde::Serde;
