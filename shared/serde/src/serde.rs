use crate::{
    bit_reader::BitReader,
    bit_writer::BitWrite,
    error::SerdeErr,
    integer::{read_bits, write_bits, UnsignedVariableInteger},
};

/// A type that can be serialized to and deserialized from a bit stream.
pub trait Serde: Sized + Clone + PartialEq {
    fn ser(&self, writer: &mut dyn BitWrite);
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;
    fn bit_length(&self) -> u32;
}

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl Serde for u8 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_byte(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_byte()
    }

    fn bit_length(&self) -> u32 {
        8
    }
}

macro_rules! impl_serde_uint {
    ($ty:ty, $bits:expr) => {
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn BitWrite) {
                write_bits(writer, u64::from(*self), $bits);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(read_bits(reader, $bits)? as $ty)
            }

            fn bit_length(&self) -> u32 {
                u32::from($bits)
            }
        }
    };
}

impl_serde_uint!(u16, 16u8);
impl_serde_uint!(u32, 32u8);

impl Serde for u64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_bits(writer, *self, 64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        read_bits(reader, 64)
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl Serde for i64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_bits(writer, *self as u64, 64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(read_bits(reader, 64)? as i64)
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_bits(writer, u64::from(self.to_bits()), 32);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_bits(read_bits(reader, 32)? as u32))
    }

    fn bit_length(&self) -> u32 {
        32
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let bytes = self.as_bytes();
        UnsignedVariableInteger::<7>::new(bytes.len() as u64).ser(writer);
        for byte in bytes {
            writer.write_byte(*byte);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = UnsignedVariableInteger::<7>::de(reader)?.get() as usize;
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            bytes.push(reader.read_byte()?);
        }
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidValue)
    }

    fn bit_length(&self) -> u32 {
        UnsignedVariableInteger::<7>::new(self.len() as u64).bit_length()
            + (self.len() as u32) * 8
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        match self {
            Some(value) => 1 + value.bit_length(),
            None => 1,
        }
    }
}
