//! Character data of length prefixed string fields
//!
//! Every string field of a property set stores a count `n` that includes the null terminator,
//! followed by `n` characters of `w` bytes each. Aligned fields are then padded with zeros to the
//! next multiple of four bytes. [`read_string_data`] and [`write_string_data`] implement this
//! once for dictionary names and string property values alike.
//!

use std::io::{Read, Seek, Write};

use binrw::{BinResult, Error};

/// Bytes per character of a string field
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CharWidth {
    /// One byte per character, in an 8-bit code page
    Narrow,
    /// Two bytes per character, UTF-16LE
    Wide,
}

impl CharWidth {
    pub const fn bytes(self) -> usize {
        match self {
            CharWidth::Narrow => 1,
            CharWidth::Wide => 2,
        }
    }
}

/// Whether a string field is followed by padding
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// The next field starts right after the terminator
    Packed,
    /// The field is padded to a multiple of four bytes
    FourByte,
}

impl Alignment {
    /// Padding following a field of `len` bytes
    pub const fn padding(self, len: usize) -> usize {
        match self {
            Alignment::Packed => 0,
            Alignment::FourByte => (4 - len % 4) % 4,
        }
    }
}

fn field_len(count: u32, width: CharWidth, pos: u64) -> BinResult<usize> {
    (count as usize)
        .checked_mul(width.bytes())
        .ok_or_else(|| Error::AssertFail {
            pos,
            message: format!("string of {count} characters is too long"),
        })
}

/// Read the character data of a string of `count` characters, terminator included.
///
/// Returns the data without the terminator. The terminator and any padding are consumed. A count
/// of zero reads nothing.
#[binrw::parser(reader)]
pub fn read_string_data(count: u32, width: CharWidth, alignment: Alignment) -> BinResult<Vec<u8>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let pos = reader.stream_position()?;
    let len = field_len(count, width, pos)?;
    let data_len = len - width.bytes();

    let mut data = Vec::new();
    reader.by_ref().take(data_len as u64).read_to_end(&mut data)?;
    if data.len() != data_len {
        return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
    }

    let mut terminator = [0u8; 2];
    reader.read_exact(&mut terminator[..width.bytes()])?;

    let mut padding = [0u8; 3];
    reader.read_exact(&mut padding[..alignment.padding(len)])?;

    Ok(data)
}

/// Write the character data of a string of `count` characters, terminator included.
///
/// `data` must hold exactly `count - 1` characters. The terminator and padding are written as
/// zeros.
#[binrw::writer(writer)]
pub fn write_string_data(
    data: &Vec<u8>,
    count: u32,
    width: CharWidth,
    alignment: Alignment,
) -> BinResult<()> {
    if count == 0 && data.is_empty() {
        return Ok(());
    }

    let pos = writer.stream_position()?;
    let len = field_len(count, width, pos)?;
    if len != data.len() + width.bytes() {
        return Err(Error::AssertFail {
            pos,
            message: format!(
                "{} bytes of data do not match a string of {count} characters",
                data.len()
            ),
        });
    }

    writer.write_all(data)?;
    writer.write_all(&[0u8; 2][..width.bytes()])?;
    writer.write_all(&[0u8; 3][..alignment.padding(len)])?;

    Ok(())
}
