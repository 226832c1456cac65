//! Code pages and their text encodings
//!

use binrw::{BinRead, BinWrite};
use derive_more::derive::Display;
use encoding_rs::Encoding;
use widestring::U16String;

use crate::{
    error::{Error, Result},
    string::CharWidth,
};

/// Numeric identifier of the text encoding used by the strings of a property set
#[derive(BinRead, BinWrite, Debug, Display, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[brw(little)]
#[display("{_0}")]
pub struct CodePage(pub u16);

/// UTF-16LE, strings use two bytes per character
pub const CP_WINUNICODE: CodePage = CodePage(0x04B0);

pub const CP_UTF8: CodePage = CodePage(65001);

pub const CP_WINDOWS_1252: CodePage = CodePage(1252);

pub const CP_US_ASCII: CodePage = CodePage(20127);

impl CodePage {
    /// Whether strings in this code page are UTF-16LE
    pub const fn is_unicode(self) -> bool {
        self.0 == CP_WINUNICODE.0
    }

    /// Width of one character of a string field
    pub const fn char_width(self) -> CharWidth {
        if self.is_unicode() {
            CharWidth::Wide
        } else {
            CharWidth::Narrow
        }
    }

    /// The text encoding for this code page
    pub fn encoding(self) -> Result<&'static Encoding> {
        let encoding = match self.0 {
            0x04B0 => encoding_rs::UTF_16LE,
            874 => encoding_rs::WINDOWS_874,
            932 => encoding_rs::SHIFT_JIS,
            936 => encoding_rs::GBK,
            949 => encoding_rs::EUC_KR,
            950 => encoding_rs::BIG5,
            1250 => encoding_rs::WINDOWS_1250,
            1251 => encoding_rs::WINDOWS_1251,
            // ASCII and Latin-1 are both read as their windows superset
            1252 | 20127 | 28591 => encoding_rs::WINDOWS_1252,
            1253 => encoding_rs::WINDOWS_1253,
            1254 => encoding_rs::WINDOWS_1254,
            1255 => encoding_rs::WINDOWS_1255,
            1256 => encoding_rs::WINDOWS_1256,
            1257 => encoding_rs::WINDOWS_1257,
            1258 => encoding_rs::WINDOWS_1258,
            10000 => encoding_rs::MACINTOSH,
            20866 => encoding_rs::KOI8_R,
            21866 => encoding_rs::KOI8_U,
            28592 => encoding_rs::ISO_8859_2,
            28595 => encoding_rs::ISO_8859_5,
            28597 => encoding_rs::ISO_8859_7,
            28605 => encoding_rs::ISO_8859_15,
            50220 => encoding_rs::ISO_2022_JP,
            51932 => encoding_rs::EUC_JP,
            54936 => encoding_rs::GB18030,
            65001 => encoding_rs::UTF_8,
            other => return Err(Error::UnknownCodePage(other)),
        };
        Ok(encoding)
    }

    /// Decode string data, terminator and padding already removed
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        if self.is_unicode() {
            let units = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect::<Vec<_>>();
            return U16String::from_vec(units)
                .to_string()
                .map_err(|_| Error::StringDecode(self.0));
        }

        self.encoding()?
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or(Error::StringDecode(self.0))
    }

    /// Encode `text` without terminator
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        if self.is_unicode() {
            return Ok(U16String::from_str(text)
                .into_vec()
                .into_iter()
                .flat_map(u16::to_le_bytes)
                .collect());
        }

        let (bytes, _, unmappable) = self.encoding()?.encode(text);
        if unmappable {
            return Err(Error::StringEncode {
                text: text.to_owned(),
                code_page: self.0,
            });
        }
        Ok(bytes.into_owned())
    }
}

impl Default for CodePage {
    fn default() -> Self {
        CP_WINUNICODE
    }
}

impl From<u16> for CodePage {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::codepage::{CodePage, CP_US_ASCII, CP_UTF8, CP_WINDOWS_1252, CP_WINUNICODE};
    use crate::error::{Error, Result};
    use crate::string::CharWidth;

    #[test]
    fn unicode_is_wide() {
        assert_eq!(CP_WINUNICODE.char_width(), CharWidth::Wide);
        assert_eq!(CP_WINDOWS_1252.char_width(), CharWidth::Narrow);
        assert_eq!(CP_UTF8.char_width(), CharWidth::Narrow);
    }

    #[test]
    fn decode_windows_1252() -> Result<()> {
        assert_eq!(CP_WINDOWS_1252.decode(&[0x63, 0x61, 0x66, 0xE9])?, "café");
        assert_eq!(CP_US_ASCII.decode(b"ab")?, "ab");

        Ok(())
    }

    #[test]
    fn encode_unicode() -> Result<()> {
        assert_eq!(CP_WINUNICODE.encode("ab")?, vec![0x61, 0x00, 0x62, 0x00]);
        assert_eq!(CP_WINUNICODE.decode(&[0x61, 0x00, 0x62, 0x00])?, "ab");

        Ok(())
    }

    #[test]
    fn unpaired_surrogate_fails_to_decode() {
        let result = CP_WINUNICODE.decode(&[0x00, 0xD8]);

        assert!(matches!(result, Err(Error::StringDecode(0x04B0))));
    }

    #[test]
    fn unknown_code_page() {
        let result = CodePage(1).decode(b"a");

        assert!(matches!(result, Err(Error::UnknownCodePage(1))));
    }

    #[test]
    fn unmappable_character() {
        let result = CP_WINDOWS_1252.encode("日本");

        assert!(matches!(result, Err(Error::StringEncode { code_page: 1252, .. })));
    }
}
