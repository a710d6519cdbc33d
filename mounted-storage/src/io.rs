//! This module provides read and write extension traits for Java types.

use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use std::io::{self, Read, Write};


/// Extension trait with big endian read methods, as used by the NBT format.
pub trait ReadJavaExt: Read {

    #[inline]
    fn read_java_byte(&mut self) -> io::Result<i8> {
        ReadBytesExt::read_i8(self)
    }

    #[inline]
    fn read_java_short(&mut self) -> io::Result<i16> {
        ReadBytesExt::read_i16::<BE>(self)
    }

    #[inline]
    fn read_java_int(&mut self) -> io::Result<i32> {
        ReadBytesExt::read_i32::<BE>(self)
    }

    #[inline]
    fn read_java_long(&mut self) -> io::Result<i64> {
        ReadBytesExt::read_i64::<BE>(self)
    }

    #[inline]
    fn read_java_float(&mut self) -> io::Result<f32> {
        ReadBytesExt::read_f32::<BE>(self)
    }

    #[inline]
    fn read_java_double(&mut self) -> io::Result<f64> {
        ReadBytesExt::read_f64::<BE>(self)
    }

    /// Read a string prefixed by its unsigned 16 bits length in bytes.
    fn read_java_string8(&mut self) -> io::Result<String> {

        let len = ReadBytesExt::read_u16::<BE>(self)?;
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf)?;

        String::from_utf8(buf).map_err(|_| new_invalid_data_err("invalid utf-8 string"))

    }

}

/// Extension trait with big endian write methods, as used by the NBT format.
pub trait WriteJavaExt: Write {

    #[inline]
    fn write_java_byte(&mut self, b: i8) -> io::Result<()> {
        WriteBytesExt::write_i8(self, b)
    }

    #[inline]
    fn write_java_short(&mut self, s: i16) -> io::Result<()> {
        WriteBytesExt::write_i16::<BE>(self, s)
    }

    #[inline]
    fn write_java_int(&mut self, i: i32) -> io::Result<()> {
        WriteBytesExt::write_i32::<BE>(self, i)
    }

    #[inline]
    fn write_java_long(&mut self, l: i64) -> io::Result<()> {
        WriteBytesExt::write_i64::<BE>(self, l)
    }

    #[inline]
    fn write_java_float(&mut self, f: f32) -> io::Result<()> {
        WriteBytesExt::write_f32::<BE>(self, f)
    }

    #[inline]
    fn write_java_double(&mut self, d: f64) -> io::Result<()> {
        WriteBytesExt::write_f64::<BE>(self, d)
    }

    /// Write a string prefixed by its unsigned 16 bits length in bytes.
    fn write_java_string8(&mut self, s: &str) -> io::Result<()> {

        if s.len() > u16::MAX as usize {
            return Err(new_invalid_data_err("string too big"));
        }

        WriteBytesExt::write_u16::<BE>(self, s.len() as u16)?;
        self.write_all(s.as_bytes())

    }

}

impl<R: Read> ReadJavaExt for R {}
impl<W: Write> WriteJavaExt for W {}


/// Return an invalid data io error with specific message.
fn new_invalid_data_err(message: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn string8() {

        let mut buf = Vec::new();
        buf.write_java_string8("Items").unwrap();
        assert_eq!(buf, [0, 5, b'I', b't', b'e', b'm', b's']);

        let mut reader = &buf[..];
        assert_eq!(reader.read_java_string8().unwrap(), "Items");

    }

    #[test]
    fn big_endian() {

        let mut buf = Vec::new();
        buf.write_java_short(0x0102).unwrap();
        buf.write_java_int(-1).unwrap();
        assert_eq!(buf, [1, 2, 0xFF, 0xFF, 0xFF, 0xFF]);

        let mut reader = &buf[..];
        assert_eq!(reader.read_java_short().unwrap(), 0x0102);
        assert_eq!(reader.read_java_int().unwrap(), -1);

    }

}
