use std::io::{Cursor, Read};

use cfb_propset::{Dictionary, DictionaryEntry, CP_US_ASCII, CP_WINDOWS_1252, CP_WINUNICODE};
use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn next_byte(reader: &mut Cursor<&[u8]>) -> Result<u8> {
    let mut byte = [0u8];
    reader.read_exact(&mut byte).into_diagnostic()?;
    Ok(byte[0])
}

#[traced_test]
#[test]
fn read_wide_name_without_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        2, 0, 0, 0,
        2, 0, 0, 0,
        97, 0, 0, 0,
        99,
    ];
    let mut reader = Cursor::new(input);

    let entry = DictionaryEntry::read(&mut reader, CP_WINUNICODE)?;

    assert_eq!(entry.property_identifier, 2);
    assert_eq!(entry.name()?, "a");
    assert_eq!(next_byte(&mut reader)?, 99);

    Ok(())
}

#[traced_test]
#[test]
fn read_wide_name_with_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        2, 0, 0, 0,
        3, 0, 0, 0,
        97, 0, 98, 0,
        0, 0, 0, 0,
        99,
    ];
    let mut reader = Cursor::new(input);

    let entry = DictionaryEntry::read(&mut reader, CP_WINUNICODE)?;

    assert_eq!(entry.name()?, "ab");
    assert_eq!(next_byte(&mut reader)?, 99);

    Ok(())
}

#[traced_test]
#[test]
fn read_narrow_name_skips_no_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        2, 0, 0, 0,
        3, 0, 0, 0,
        97, 98, 0,
        99,
    ];
    let mut reader = Cursor::new(input);

    let entry = DictionaryEntry::read(&mut reader, CP_US_ASCII)?;

    assert_eq!(entry.name()?, "ab");
    assert_eq!(reader.position(), 11);
    assert_eq!(next_byte(&mut reader)?, 99);

    Ok(())
}

#[traced_test]
#[test]
fn read_wide_dictionary() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        2, 0, 0, 0,
        2, 0, 0, 0, 2, 0, 0, 0, 97, 0, 0, 0,
        5, 0, 0, 0, 3, 0, 0, 0, 98, 0, 99, 0, 0, 0, 0, 0,
    ];
    let mut reader = Cursor::new(input);

    let dictionary = Dictionary::read(&mut reader, CP_WINUNICODE)?;

    assert_eq!(dictionary.len(), 2);
    assert_eq!(dictionary.name_of(2).transpose()?, Some("a".to_owned()));
    assert_eq!(dictionary.name_of(5).transpose()?, Some("bc".to_owned()));
    assert!(dictionary.name_of(3).is_none());
    assert_eq!(reader.position(), input.len() as u64);

    Ok(())
}

#[traced_test]
#[test]
fn read_narrow_dictionary_skips_trailing_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        1, 0, 0, 0,
        4, 0, 0, 0, 4, 0, 0, 0, 0x63, 0x61, 0xE9, 0,
        99,
    ];
    let mut reader = Cursor::new(input);

    let dictionary = Dictionary::read(&mut reader, CP_WINDOWS_1252)?;

    assert_eq!(dictionary.name_of(4).transpose()?, Some("caé".to_owned()));
    assert_eq!(next_byte(&mut reader)?, 99);

    Ok(())
}

#[traced_test]
#[test]
fn write_then_read_wide_dictionary() -> Result<()> {
    let expected = Dictionary::new(vec![
        DictionaryEntry::new(2, "Title", CP_WINUNICODE)?,
        DictionaryEntry::new(3, "Subject", CP_WINUNICODE)?,
        DictionaryEntry::new(0x1000, "", CP_WINUNICODE)?,
    ]);

    let mut output = Cursor::new(Vec::new());
    expected.write(&mut output, CP_WINUNICODE)?;
    let bytes = output.into_inner();
    assert_eq!(bytes.len() % 4, 0);

    let actual = Dictionary::read(&mut Cursor::new(&bytes), CP_WINUNICODE)?;

    assert_eq!(actual, expected);
    assert_eq!(actual.name_of(0x1000).transpose()?, Some(String::new()));

    Ok(())
}

#[traced_test]
#[test]
fn truncated_dictionary_is_an_error() {
    #[rustfmt::skip]
    let input: &[u8] = &[
        2, 0, 0, 0,
        2, 0, 0, 0, 2, 0, 0, 0, 97, 0, 0, 0,
    ];

    assert!(Dictionary::read(&mut Cursor::new(input), CP_WINUNICODE).is_err());
}
