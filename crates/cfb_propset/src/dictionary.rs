//! Property name dictionaries
//!

use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinWrite};
use derive_more::derive::{Deref, IntoIterator};
use tracing::instrument;

use crate::{
    codepage::CodePage,
    error::{Error, Result},
    string::{read_string_data, write_string_data, Alignment},
};

/// Names are padded only when they are UTF-16
const fn name_alignment(code_page: CodePage) -> Alignment {
    if code_page.is_unicode() {
        Alignment::FourByte
    } else {
        Alignment::Packed
    }
}

/// Maps a property identifier to a name
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little, import(code_page: CodePage))]
pub struct DictionaryEntry {
    /// Identifier of the named property
    pub property_identifier: u32,

    /// Characters of the name including the terminator
    #[br(assert(length >= 0))]
    length: i32,

    #[br(parse_with = read_string_data, args(length as u32, code_page.char_width(), name_alignment(code_page)))]
    #[bw(write_with = write_string_data, args(*length as u32, code_page.char_width(), name_alignment(code_page)))]
    name: Vec<u8>,

    #[br(calc = code_page)]
    #[bw(ignore)]
    name_code_page: CodePage,
}

impl DictionaryEntry {
    /// Encode `name` for a property set using `code_page`
    pub fn new(property_identifier: u32, name: &str, code_page: CodePage) -> Result<Self> {
        let name_bytes = code_page.encode(name)?;
        let chars = name_bytes.len() / code_page.char_width().bytes();
        let length = i32::try_from(chars + 1).map_err(|_| Error::StringTooLong(chars))?;

        Ok(Self {
            property_identifier,
            length,
            name: name_bytes,
            name_code_page: code_page,
        })
    }

    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, code_page: CodePage) -> Result<Self> {
        Ok(Self::read_args(reader, (code_page,))?)
    }

    #[instrument(skip(self, writer), fields(id = self.property_identifier), err)]
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.write_args(writer, (self.name_code_page,))?;
        Ok(())
    }

    /// Characters of the name including the terminator, as stored
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Decode the name
    pub fn name(&self) -> Result<String> {
        self.name_code_page.decode(&self.name)
    }

    /// The name as stored, without terminator and padding
    pub fn name_raw(&self) -> &[u8] {
        &self.name
    }

    pub fn code_page(&self) -> CodePage {
        self.name_code_page
    }
}

/// The dictionary property of a property set
///
/// The entry count is followed by the entries, the dictionary as a whole is padded to a multiple
/// of four bytes from the start of the stream.
#[binrw]
#[brw(little, import(code_page: CodePage))]
#[derive(Debug, Clone, PartialEq, Eq, Deref, IntoIterator)]
pub struct Dictionary {
    #[br(temp)]
    #[bw(try_calc = u32::try_from(entries.len()))]
    num_entries: u32,

    #[br(args { count: num_entries as usize, inner: (code_page,) })]
    #[bw(args(code_page))]
    #[brw(align_after = 4)]
    #[deref]
    #[into_iterator(owned, ref)]
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    pub fn new(entries: Vec<DictionaryEntry>) -> Self {
        Self { entries }
    }

    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, code_page: CodePage) -> Result<Self> {
        Ok(Self::read_args(reader, (code_page,))?)
    }

    /// Write the dictionary of a property set whose strings use `code_page`.
    ///
    /// Every entry must have been encoded for `code_page`.
    #[instrument(skip_all, fields(entries = self.entries.len()), err)]
    pub fn write<W: Write + Seek>(&self, writer: &mut W, code_page: CodePage) -> Result<()> {
        if let Some(entry) = self.entries.iter().find(|entry| entry.code_page() != code_page) {
            return Err(Error::CodePageMismatch {
                expected: code_page.0,
                found: entry.code_page().0,
            });
        }

        self.write_args(writer, (code_page,))?;
        Ok(())
    }

    /// Entry for a property identifier
    pub fn get(&self, property_identifier: u32) -> Option<&DictionaryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.property_identifier == property_identifier)
    }

    /// Decoded name of a property identifier
    pub fn name_of(&self, property_identifier: u32) -> Option<Result<String>> {
        self.get(property_identifier).map(DictionaryEntry::name)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::codepage::{CP_WINDOWS_1252, CP_WINUNICODE};
    use crate::dictionary::{Dictionary, DictionaryEntry};
    use crate::error::{Error, Result};

    #[test]
    fn new_wide_entry() -> Result<()> {
        let entry = DictionaryEntry::new(7, "abc", CP_WINUNICODE)?;

        assert_eq!(entry.length(), 4);
        assert_eq!(entry.name_raw(), &[0x61, 0x00, 0x62, 0x00, 0x63, 0x00]);
        assert_eq!(entry.name()?, "abc");

        Ok(())
    }

    #[test]
    fn write_wide_entry_is_padded() -> Result<()> {
        let mut output = Cursor::new(Vec::new());
        DictionaryEntry::new(2, "ab", CP_WINUNICODE)?.write(&mut output)?;

        #[rustfmt::skip]
        let expected = vec![
            0x02, 0x00, 0x00, 0x00,
            0x03, 0x00, 0x00, 0x00,
            0x61, 0x00, 0x62, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(output.into_inner(), expected);

        Ok(())
    }

    #[test]
    fn write_narrow_entry_is_packed() -> Result<()> {
        let mut output = Cursor::new(Vec::new());
        DictionaryEntry::new(2, "ab", CP_WINDOWS_1252)?.write(&mut output)?;

        assert_eq!(
            output.into_inner(),
            vec![0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x61, 0x62, 0x00]
        );

        Ok(())
    }

    #[test]
    fn negative_length_is_malformed() {
        let input = [0x02, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];

        let result = DictionaryEntry::read(&mut Cursor::new(input), CP_WINUNICODE);

        assert!(matches!(result, Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn write_rejects_entries_of_another_code_page() -> Result<()> {
        let dictionary = Dictionary::new(vec![
            DictionaryEntry::new(2, "ab", CP_WINDOWS_1252)?,
            DictionaryEntry::new(3, "c", CP_WINUNICODE)?,
        ]);

        let mut output = Cursor::new(Vec::new());
        let result = dictionary.write(&mut output, CP_WINDOWS_1252);

        assert!(matches!(
            result,
            Err(Error::CodePageMismatch {
                expected: 1252,
                found: 0x04B0
            })
        ));
        assert!(output.into_inner().is_empty());

        Ok(())
    }

    #[test]
    fn narrow_dictionary_is_padded_as_a_whole() -> Result<()> {
        let dictionary = Dictionary::new(vec![
            DictionaryEntry::new(2, "ab", CP_WINDOWS_1252)?,
            DictionaryEntry::new(3, "c", CP_WINDOWS_1252)?,
        ]);

        let mut output = Cursor::new(Vec::new());
        dictionary.write(&mut output, CP_WINDOWS_1252)?;

        #[rustfmt::skip]
        let expected = vec![
            0x02, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x61, 0x62, 0x00,
            0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x63, 0x00,
            0x00, 0x00, 0x00,
        ];
        assert_eq!(output.into_inner(), expected);

        Ok(())
    }
}
