//! NBT format serialization and deserialization.

use std::io::{self, Read, Write};
use std::collections::BTreeMap;
use std::fmt;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::io::{ReadJavaExt, WriteJavaExt};


const NBT_END        : i8 = 0;
const NBT_BYTE       : i8 = 1;
const NBT_SHORT      : i8 = 2;
const NBT_INT        : i8 = 3;
const NBT_LONG       : i8 = 4;
const NBT_FLOAT      : i8 = 5;
const NBT_DOUBLE     : i8 = 6;
const NBT_BYTE_ARRAY : i8 = 7;
const NBT_STRING     : i8 = 8;
const NBT_LIST       : i8 = 9;
const NBT_COMPOUND   : i8 = 10;

/// Maximum nesting of lists and compounds accepted when reading.
pub const MAX_DEPTH: usize = 512;


/// A generic NBT tag.
#[derive(Clone, PartialEq)]
pub enum Nbt {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    /// A list of tags, all of the same type.
    List(Vec<Nbt>),
    Compound(NbtCompound),
}

/// An abstract NBT compound type that hides the internal implementation of the mapping.
#[derive(Clone, Default, PartialEq)]
pub struct NbtCompound {
    inner: BTreeMap<String, Nbt>,
}


/// Deserialize a NBT tag from a reader.
pub fn from_reader(mut reader: impl Read) -> Result<Nbt, NbtError> {

    let type_id = reader.read_java_byte()?;
    if type_id == NBT_END {
        // We should not get a end tag directly.
        return Err(NbtError::IllegalTagType);
    }

    let _key = reader.read_java_string8()?;
    from_reader_with_type(&mut reader, type_id, 0)

}

/// Deserialize a gzip compressed NBT tag from a reader, this is how NBT files are stored.
pub fn from_gzip_reader(reader: impl Read) -> Result<Nbt, NbtError> {
    from_reader(GzDecoder::new(reader))
}

/// Internal function to read a NBT tag of a specific type, `depth` is the number of
/// lists and compounds enclosing it.
fn from_reader_with_type(reader: &mut impl Read, type_id: i8, depth: usize) -> Result<Nbt, NbtError> {

    if depth > MAX_DEPTH {
        return Err(NbtError::TooDeep);
    }

    Ok(match type_id {
        NBT_BYTE => Nbt::Byte(reader.read_java_byte()?),
        NBT_SHORT => Nbt::Short(reader.read_java_short()?),
        NBT_INT => Nbt::Int(reader.read_java_int()?),
        NBT_LONG => Nbt::Long(reader.read_java_long()?),
        NBT_FLOAT => Nbt::Float(reader.read_java_float()?),
        NBT_DOUBLE => Nbt::Double(reader.read_java_double()?),
        NBT_BYTE_ARRAY => {
            // The buffer grows with the data actually read, not the declared length.
            let len = read_len(reader)?;
            let mut buf = Vec::new();
            Read::take(&mut *reader, len as u64).read_to_end(&mut buf)?;
            if buf.len() != len {
                return Err(NbtError::Io(io::ErrorKind::UnexpectedEof.into()));
            }
            Nbt::ByteArray(buf)
        }
        NBT_STRING => Nbt::String(reader.read_java_string8()?),
        NBT_LIST => {

            // NOTE: A list can contain a single type, an empty list may be of type end.
            let type_id = reader.read_java_byte()?;
            let len = read_len(reader)?;

            if type_id == NBT_END {
                if len != 0 {
                    return Err(NbtError::IllegalTagType);
                }
                Nbt::List(Vec::new())
            } else {
                let mut list = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    list.push(from_reader_with_type(reader, type_id, depth + 1)?);
                }
                Nbt::List(list)
            }

        }
        NBT_COMPOUND => {

            let mut compound = NbtCompound::new();

            loop {

                let type_id = reader.read_java_byte()?;
                if type_id == NBT_END {
                    break;
                }

                let key = reader.read_java_string8()?;
                compound.insert(key, from_reader_with_type(reader, type_id, depth + 1)?);

            }

            Nbt::Compound(compound)

        }
        _ => return Err(NbtError::IllegalTagType),
    })
}

fn read_len(reader: &mut impl Read) -> Result<usize, NbtError> {
    reader.read_java_int()?.try_into().map_err(|_| NbtError::IllegalLength)
}

/// Serialize a NBT tag into a writer.
pub fn to_writer(mut writer: impl Write, tag: &Nbt) -> Result<(), NbtError> {
    writer.write_java_byte(tag.type_id())?;
    writer.write_java_string8("")?; // Root tag has empty key.
    to_writer_raw(&mut writer, tag)
}

/// Serialize a NBT tag into a writer, gzip compressed.
pub fn to_gzip_writer(writer: impl Write, tag: &Nbt) -> Result<(), NbtError> {
    let mut encoder = GzEncoder::new(writer, Compression::default());
    to_writer(&mut encoder, tag)?;
    encoder.finish()?;
    Ok(())
}

/// Internal function to write a NBT tag content.
fn to_writer_raw(writer: &mut impl Write, tag: &Nbt) -> Result<(), NbtError> {

    match *tag {
        Nbt::Byte(n) => writer.write_java_byte(n)?,
        Nbt::Short(n) => writer.write_java_short(n)?,
        Nbt::Int(n) => writer.write_java_int(n)?,
        Nbt::Long(n) => writer.write_java_long(n)?,
        Nbt::Float(n) => writer.write_java_float(n)?,
        Nbt::Double(n) => writer.write_java_double(n)?,
        Nbt::ByteArray(ref buf) => {
            write_len(writer, buf.len())?;
            writer.write_all(buf)?;
        }
        Nbt::String(ref string) => writer.write_java_string8(string)?,
        Nbt::List(ref list) => {

            let type_id = list.first().map(Nbt::type_id).unwrap_or(NBT_END);
            writer.write_java_byte(type_id)?;
            write_len(writer, list.len())?;

            for item in list {
                if item.type_id() != type_id {
                    return Err(NbtError::IncoherentTagType);
                }
                to_writer_raw(writer, item)?;
            }

        }
        Nbt::Compound(ref compound) => {

            for (key, tag) in &compound.inner {
                writer.write_java_byte(tag.type_id())?;
                writer.write_java_string8(key)?;
                to_writer_raw(writer, tag)?;
            }

            writer.write_java_byte(NBT_END)?;

        }
    }

    Ok(())

}

fn write_len(writer: &mut impl Write, len: usize) -> Result<(), NbtError> {
    let len: i32 = len.try_into().map_err(|_| NbtError::IllegalLength)?;
    writer.write_java_int(len)?;
    Ok(())
}


/// Basic methods to interpret a tag as its inner type if possible.
impl Nbt {

    /// Get the NBT type id of this tag.
    fn type_id(&self) -> i8 {
        match self {
            Nbt::Byte(_) => NBT_BYTE,
            Nbt::Short(_) => NBT_SHORT,
            Nbt::Int(_) => NBT_INT,
            Nbt::Long(_) => NBT_LONG,
            Nbt::Float(_) => NBT_FLOAT,
            Nbt::Double(_) => NBT_DOUBLE,
            Nbt::ByteArray(_) => NBT_BYTE_ARRAY,
            Nbt::String(_) => NBT_STRING,
            Nbt::List(_) => NBT_LIST,
            Nbt::Compound(_) => NBT_COMPOUND,
        }
    }

    #[inline]
    pub fn as_byte(&self) -> Option<i8> {
        match *self {
            Self::Byte(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_short(&self) -> Option<i16> {
        match *self {
            Self::Short(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(n) => Some(n),
            _ => None
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Nbt]> {
        match self {
            Self::List(list) => Some(&list[..]),
            _ => None
        }
    }

    #[inline]
    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            Self::Compound(comp) => Some(comp),
            _ => None
        }
    }

    /// Start parsing this tag, keeping track of the path for errors.
    pub fn parse(&self) -> NbtParse<'_> {
        NbtParse { inner: self, path: String::new() }
    }

}

macro_rules! impl_from_primitive {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(impl From<$ty> for Nbt {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        })*
    };
}

impl_from_primitive! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    &str => String,
    Vec<Nbt> => List,
    NbtCompound => Compound,
}

/// Basic methods to create and manage keys in a compound.
impl NbtCompound {

    pub fn new() -> Self {
        Self { inner: BTreeMap::new() }
    }

    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, tag: impl Into<Nbt>) {
        self.inner.insert(key.into(), tag.into());
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Nbt> {
        self.inner.get(key)
    }

    #[inline]
    pub fn get_byte(&self, key: &str) -> Option<i8> {
        self.get(key).and_then(Nbt::as_byte)
    }

    #[inline]
    pub fn get_short(&self, key: &str) -> Option<i16> {
        self.get(key).and_then(Nbt::as_short)
    }

    #[inline]
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(Nbt::as_int)
    }

    #[inline]
    pub fn get_list(&self, key: &str) -> Option<&[Nbt]> {
        self.get(key).and_then(Nbt::as_list)
    }

}


/// Manual debug implement to shrink the potential huge byte arrays.
impl fmt::Debug for Nbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(n) => f.debug_tuple("Byte").field(n).finish(),
            Self::Short(n) => f.debug_tuple("Short").field(n).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Long(n) => f.debug_tuple("Long").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Self::ByteArray(buf) => {
                f.debug_tuple("ByteArray")
                    .field(&format_args!("({}) {:X?}...", buf.len(), &buf[..buf.len().min(10)]))
                    .finish()
            }
            Self::String(string) => f.debug_tuple("String").field(string).finish(),
            Self::List(list) => f.debug_tuple("List").field(list).finish(),
            Self::Compound(compound) => f.debug_tuple("Compound").field(&compound.inner).finish(),
        }
    }
}

impl fmt::Debug for NbtCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}


/// Error type returned when reading or writing NBT.
#[derive(thiserror::Error, Debug)]
pub enum NbtError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("Illegal tag type.")]
    IllegalTagType,
    #[error("Illegal decoded length.")]
    IllegalLength,
    #[error("Incoherent tag type in list.")]
    IncoherentTagType,
    #[error("Tags nested deeper than {max}.", max = MAX_DEPTH)]
    TooDeep,
}


/// Parsing utility structure for anonymous NBT data.
pub struct NbtParse<'nbt> {
    /// Reference to the parsed NBT data.
    inner: &'nbt Nbt,
    /// Current path being parsed, used to return relevant errors.
    path: String,
}

impl<'nbt> NbtParse<'nbt> {

    #[inline]
    fn make_error(self, kind: NbtParseExpected) -> NbtParseError {
        NbtParseError {
            path: self.path,
            expected: kind,
        }
    }

    #[inline]
    pub fn as_byte(self) -> Result<i8, NbtParseError> {
        self.inner.as_byte().ok_or_else(|| self.make_error(NbtParseExpected::Byte))
    }

    #[inline]
    pub fn as_short(self) -> Result<i16, NbtParseError> {
        self.inner.as_short().ok_or_else(|| self.make_error(NbtParseExpected::Short))
    }

    #[inline]
    pub fn as_int(self) -> Result<i32, NbtParseError> {
        self.inner.as_int().ok_or_else(|| self.make_error(NbtParseExpected::Int))
    }

    pub fn as_list(self) -> Result<NbtListParse<'nbt>, NbtParseError> {
        match self.inner.as_list() {
            Some(list) => Ok(NbtListParse {
                inner: list,
                path: self.path,
            }),
            None => Err(self.make_error(NbtParseExpected::List))
        }
    }

    pub fn as_compound(self) -> Result<NbtCompoundParse<'nbt>, NbtParseError> {
        // If successful we wrap the compound into a parse structure to keep the path.
        match self.inner.as_compound() {
            Some(compound) => Ok(NbtCompoundParse {
                inner: compound,
                path: self.path,
            }),
            None => Err(self.make_error(NbtParseExpected::Compound))
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

}

/// Parsing utility structure for a NBT compound.
pub struct NbtCompoundParse<'nbt> {
    inner: &'nbt NbtCompound,
    path: String,
}

impl<'nbt> NbtCompoundParse<'nbt> {

    /// Get a item from its key in this compound.
    pub fn get(&self, key: &str) -> Result<NbtParse<'nbt>, NbtParseError> {
        let path = format!("{}/{key}", self.path);
        match self.inner.get(key) {
            Some(inner) => Ok(NbtParse {
                inner,
                path,
            }),
            None => Err(NbtParseError {
                path,
                expected: NbtParseExpected::Item,
            })
        }
    }

    #[inline]
    pub fn get_byte(&self, key: &str) -> Result<i8, NbtParseError> {
        self.get(key).and_then(NbtParse::as_byte)
    }

    #[inline]
    pub fn get_short(&self, key: &str) -> Result<i16, NbtParseError> {
        self.get(key).and_then(NbtParse::as_short)
    }

    #[inline]
    pub fn get_int(&self, key: &str) -> Result<i32, NbtParseError> {
        self.get(key).and_then(NbtParse::as_int)
    }

    #[inline]
    pub fn get_list(&self, key: &str) -> Result<NbtListParse<'nbt>, NbtParseError> {
        self.get(key).and_then(NbtParse::as_list)
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

}

/// Parsing utility structure for a NBT list.
pub struct NbtListParse<'nbt> {
    inner: &'nbt [Nbt],
    path: String,
}

impl<'nbt> NbtListParse<'nbt> {

    /// Iterate over the items of this list, each one with its own path.
    pub fn iter(&self) -> impl Iterator<Item = NbtParse<'nbt>> + '_ {
        self.inner.iter().enumerate().map(|(index, inner)| NbtParse {
            inner,
            path: format!("{}/{index}", self.path),
        })
    }

}


/// A parsing error as returned by [`NbtParse`] and [`NbtCompoundParse`] wrappers.
#[derive(thiserror::Error, Debug)]
#[error("{path}: expected {expected:?}")]
pub struct NbtParseError {
    /// The path to the failed parsing.
    pub path: String,
    pub expected: NbtParseExpected,
}

/// A type of expected value for a [`NbtParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NbtParseExpected {
    /// Expected a compound or list item at this path.
    Item,
    Byte,
    Short,
    Int,
    List,
    Compound,
}


#[cfg(test)]
mod tests {

    use super::*;

    fn sample() -> Nbt {
        let mut comp = NbtCompound::new();
        comp.insert("Count", 12i8);
        comp.insert("id", 3i16);
        comp.insert("name", "chest");
        comp.insert("Items", vec![Nbt::Int(1), Nbt::Int(2)]);
        comp.insert("Empty", Vec::<Nbt>::new());
        comp.into()
    }

    #[test]
    fn write_read() {

        let nbt = sample();

        let mut buf = Vec::new();
        to_writer(&mut buf, &nbt).unwrap();
        assert_eq!(&buf[..3], [NBT_COMPOUND as u8, 0, 0]);
        assert_eq!(from_reader(&buf[..]).unwrap(), nbt);

        let mut buf = Vec::new();
        to_gzip_writer(&mut buf, &nbt).unwrap();
        assert_eq!(&buf[..2], [0x1F, 0x8B]);
        assert_eq!(from_gzip_reader(&buf[..]).unwrap(), nbt);

    }

    #[test]
    fn incoherent_list() {
        let nbt = Nbt::List(vec![Nbt::Int(1), Nbt::Byte(2)]);
        assert!(matches!(to_writer(Vec::new(), &nbt), Err(NbtError::IncoherentTagType)));
    }

    #[test]
    fn illegal_root() {
        assert!(matches!(from_reader(&[0u8][..]), Err(NbtError::IllegalTagType)));
        assert!(matches!(from_reader(&[42u8, 0, 0][..]), Err(NbtError::IllegalTagType)));
    }

    /// Encode a root list containing `depth` nested single element lists.
    fn nested_lists(depth: usize) -> Vec<u8> {
        let mut buf = vec![NBT_LIST as u8, 0, 0];
        for _ in 0..depth {
            buf.push(NBT_LIST as u8);
            buf.extend_from_slice(&1i32.to_be_bytes());
        }
        buf.push(NBT_END as u8);
        buf.extend_from_slice(&0i32.to_be_bytes());
        buf
    }

    #[test]
    fn nesting_depth() {

        let mut nbt = from_reader(&nested_lists(MAX_DEPTH)[..]).unwrap();
        for _ in 0..MAX_DEPTH {
            nbt = nbt.as_list().unwrap()[0].clone();
        }
        assert_eq!(nbt, Nbt::List(vec![]));

        assert!(matches!(from_reader(&nested_lists(MAX_DEPTH + 1)[..]), Err(NbtError::TooDeep)));
        assert!(matches!(from_reader(&nested_lists(200_000)[..]), Err(NbtError::TooDeep)));

    }

    #[test]
    fn truncated_byte_array() {

        let mut buf = vec![NBT_BYTE_ARRAY as u8, 0, 0];
        buf.extend_from_slice(&i32::MAX.to_be_bytes());
        buf.extend_from_slice(&[1, 2, 3]);

        assert!(matches!(from_reader(&buf[..]), Err(NbtError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof));

    }

    #[test]
    fn parse_paths() {

        let nbt = sample();
        let comp = nbt.parse().as_compound().unwrap();

        assert_eq!(comp.get_byte("Count").unwrap(), 12);
        assert_eq!(comp.get_list("Items").unwrap().iter().count(), 2);

        let err = comp.get_short("Count").unwrap_err();
        assert_eq!(err.path, "/Count");
        assert_eq!(err.expected, NbtParseExpected::Short);

        let err = comp.get_int("Missing").unwrap_err();
        assert_eq!(err.to_string(), "/Missing: expected Item");

        let items = comp.get_list("Items").unwrap();
        let err = items.iter().nth(1).unwrap().as_byte().unwrap_err();
        assert_eq!(err.path, "/Items/1");

    }

}
