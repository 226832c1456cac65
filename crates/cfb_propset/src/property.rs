//! Typed property values
//!

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinWrite};
use tracing::{instrument, trace};

use crate::{
    codepage::{CodePage, CP_WINUNICODE},
    error::{Error, Result},
    string::{read_string_data, write_string_data, Alignment},
};

/// Null terminated string in the code page of the property set
pub const VT_LPSTR: u16 = 0x001E;

/// Null terminated UTF-16LE string
pub const VT_LPWSTR: u16 = 0x001F;

/// Length prefixed string value, padded to a multiple of four bytes
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little, import(code_page: CodePage))]
pub struct PropertyString {
    /// Characters including the terminator, zero for an absent string
    #[br(assert(length >= 0))]
    length: i32,

    #[br(parse_with = read_string_data, args(length as u32, code_page.char_width(), Alignment::FourByte))]
    #[bw(write_with = write_string_data, args(*length as u32, code_page.char_width(), Alignment::FourByte))]
    data: Vec<u8>,

    #[br(calc = code_page)]
    #[bw(ignore)]
    data_code_page: CodePage,
}

impl PropertyString {
    /// Encode `value` in `code_page`
    pub fn new(value: &str, code_page: CodePage) -> Result<Self> {
        let data = code_page.encode(value)?;
        let chars = data.len() / code_page.char_width().bytes();
        let length = i32::try_from(chars + 1).map_err(|_| Error::StringTooLong(chars))?;

        Ok(Self {
            length,
            data,
            data_code_page: code_page,
        })
    }

    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, code_page: CodePage) -> Result<Self> {
        Ok(Self::read_args(reader, (code_page,))?)
    }

    #[instrument(skip_all, fields(length = self.length), err)]
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.write_args(writer, (self.data_code_page,))?;
        Ok(())
    }

    /// Characters including the terminator, as stored
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Decode the value
    pub fn value(&self) -> Result<String> {
        self.data_code_page.decode(&self.data)
    }

    /// The value as stored, without terminator and padding
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn code_page(&self) -> CodePage {
        self.data_code_page
    }
}

#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
struct PropertyHeader {
    vt_type: u16,
    padding: u16,
}

/// A property value together with its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedPropertyValue {
    /// `VT_LPSTR`, in the code page of the property set
    Lpstr(PropertyString),
    /// `VT_LPWSTR`, always UTF-16LE
    Lpwstr(PropertyString),
}

impl TypedPropertyValue {
    /// A `VT_LPSTR` value, which is UTF-16LE when the property set is
    pub fn lpstr(value: &str, code_page: CodePage) -> Result<Self> {
        Ok(Self::Lpstr(PropertyString::new(value, code_page)?))
    }

    /// A `VT_LPWSTR` value
    pub fn lpwstr(value: &str) -> Result<Self> {
        Ok(Self::Lpwstr(PropertyString::new(value, CP_WINUNICODE)?))
    }

    /// Read the type header followed by the value
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, code_page: CodePage) -> Result<Self> {
        let header = PropertyHeader::read(reader)?;
        trace!(vt_type = header.vt_type, "read property header");
        Self::read_value(reader, header.vt_type, code_page)
    }

    /// Read a value of a known type, without header
    pub fn read_value<R: Read + Seek>(
        reader: &mut R,
        vt_type: u16,
        code_page: CodePage,
    ) -> Result<Self> {
        match vt_type {
            VT_LPSTR => Ok(Self::Lpstr(PropertyString::read(reader, code_page)?)),
            VT_LPWSTR => Ok(Self::Lpwstr(PropertyString::read(reader, CP_WINUNICODE)?)),
            other => Err(Error::UnsupportedPropertyType(other)),
        }
    }

    /// Write the type header followed by the value
    #[instrument(skip_all, fields(vt_type = self.vt_type()), err)]
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        PropertyHeader {
            vt_type: self.vt_type(),
            padding: 0,
        }
        .write(writer)?;
        self.write_value(writer)
    }

    /// Write the value without header
    pub fn write_value<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::Lpstr(value) | Self::Lpwstr(value) => value.write(writer),
        }
    }

    pub fn vt_type(&self) -> u16 {
        match self {
            Self::Lpstr(_) => VT_LPSTR,
            Self::Lpwstr(_) => VT_LPWSTR,
        }
    }

    /// Decode the string held by this value
    pub fn as_string(&self) -> Result<String> {
        match self {
            Self::Lpstr(value) | Self::Lpwstr(value) => value.value(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::codepage::{CP_WINDOWS_1252, CP_WINUNICODE};
    use crate::error::{Error, Result};
    use crate::property::{PropertyString, TypedPropertyValue, VT_LPSTR, VT_LPWSTR};

    #[test]
    fn new_narrow_string() -> Result<()> {
        let value = PropertyString::new("abc", CP_WINDOWS_1252)?;

        assert_eq!(value.length(), 4);
        assert_eq!(value.data(), b"abc");

        Ok(())
    }

    #[test]
    fn write_typed_lpwstr() -> Result<()> {
        let mut output = Cursor::new(Vec::new());
        TypedPropertyValue::lpwstr("a")?.write(&mut output)?;

        #[rustfmt::skip]
        let expected = vec![
            0x1F, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x61, 0x00, 0x00, 0x00,
        ];
        assert_eq!(output.into_inner(), expected);

        Ok(())
    }

    #[test]
    fn lpstr_in_unicode_property_set_is_wide() -> Result<()> {
        let value = TypedPropertyValue::lpstr("ab", CP_WINUNICODE)?;

        let mut output = Cursor::new(Vec::new());
        value.write_value(&mut output)?;

        assert_eq!(output.into_inner().len(), 12);
        assert_eq!(value.vt_type(), VT_LPSTR);

        Ok(())
    }

    #[test]
    fn unsupported_type() {
        #[rustfmt::skip]
        let input = [
            0x03, 0x00, 0x00, 0x00,
            0x2A, 0x00, 0x00, 0x00,
        ];

        let result = TypedPropertyValue::read(&mut Cursor::new(input), CP_WINUNICODE);

        assert!(matches!(result, Err(Error::UnsupportedPropertyType(0x0003))));
    }

    #[test]
    fn lpwstr_ignores_code_page() -> Result<()> {
        let input = [0x02, 0x00, 0x00, 0x00, 0x61, 0x00, 0x00, 0x00];

        let value =
            TypedPropertyValue::read_value(&mut Cursor::new(input), VT_LPWSTR, CP_WINDOWS_1252)?;

        assert_eq!(value.as_string()?, "a");

        Ok(())
    }
}
