use std::io::{Cursor, Read};

use cfb_propset::{
    error::Error, CodePage, PropertyString, TypedPropertyValue, CP_US_ASCII, CP_WINDOWS_1252,
    CP_WINUNICODE, VT_LPSTR, VT_LPWSTR,
};
use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn next_byte(reader: &mut Cursor<&[u8]>) -> Result<u8> {
    let mut byte = [0u8];
    reader.read_exact(&mut byte).into_diagnostic()?;
    Ok(byte[0])
}

fn read_lpstr(input: &[u8], code_page: CodePage) -> Result<(String, u64)> {
    let mut reader = Cursor::new(input);
    let value = TypedPropertyValue::read_value(&mut reader, VT_LPSTR, code_page)?;
    Ok((value.as_string()?, reader.position()))
}

fn read_lpwstr(input: &[u8]) -> Result<(String, u64)> {
    let mut reader = Cursor::new(input);
    let value = TypedPropertyValue::read_value(&mut reader, VT_LPWSTR, CP_WINUNICODE)?;
    Ok((value.as_string()?, reader.position()))
}

#[traced_test]
#[test]
fn read_lpwstr_without_padding() -> Result<()> {
    assert_eq!(read_lpwstr(&[2, 0, 0, 0, 97, 0, 0, 0])?, ("a".to_owned(), 8));

    Ok(())
}

#[traced_test]
#[test]
fn read_lpwstr_with_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        3, 0, 0, 0,
        97, 0, 98, 0,
        0, 0, 0, 0,
        99,
    ];
    let mut reader = Cursor::new(input);

    let value = TypedPropertyValue::read_value(&mut reader, VT_LPWSTR, CP_WINUNICODE)?;

    assert_eq!(value.as_string()?, "ab");
    assert_eq!(reader.position(), 12);
    assert_eq!(next_byte(&mut reader)?, 99);

    Ok(())
}

#[traced_test]
#[test]
fn read_empty_lpwstr() -> Result<()> {
    assert_eq!(read_lpwstr(&[0, 0, 0, 0])?, (String::new(), 4));

    Ok(())
}

#[traced_test]
#[test]
fn read_empty_lpstr() -> Result<()> {
    for code_page in [CP_US_ASCII, CP_WINUNICODE] {
        assert_eq!(read_lpstr(&[0, 0, 0, 0], code_page)?, (String::new(), 4));
    }

    Ok(())
}

#[traced_test]
#[test]
fn read_lpstr_in_unicode_property_set() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        3, 0, 0, 0,
        97, 0, 98, 0,
        0, 0, 0, 0,
        99,
    ];

    assert_eq!(read_lpstr(input, CP_WINUNICODE)?, ("ab".to_owned(), 12));

    Ok(())
}

#[traced_test]
#[test]
fn read_narrow_lpstr_with_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        3, 0, 0, 0,
        97, 98, 0, 0,
        99,
    ];

    assert_eq!(read_lpstr(input, CP_US_ASCII)?, ("ab".to_owned(), 8));

    Ok(())
}

#[traced_test]
#[test]
fn read_narrow_lpstr_without_padding() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        4, 0, 0, 0,
        97, 98, 99, 0,
        100,
    ];
    let mut reader = Cursor::new(input);

    let value = TypedPropertyValue::read_value(&mut reader, VT_LPSTR, CP_US_ASCII)?;

    assert_eq!(value.as_string()?, "abc");
    assert_eq!(next_byte(&mut reader)?, 100);

    Ok(())
}

#[traced_test]
#[test]
fn read_typed_value_with_header() -> Result<()> {
    #[rustfmt::skip]
    let input: &[u8] = &[
        0x1E, 0x00, 0x00, 0x00,
        6, 0, 0, 0,
        0x63, 0x61, 0x66, 0xE9, 0x73, 0,
        0, 0,
    ];
    let mut reader = Cursor::new(input);

    let value = TypedPropertyValue::read(&mut reader, CP_WINDOWS_1252)?;

    assert_eq!(value.vt_type(), VT_LPSTR);
    assert_eq!(value.as_string()?, "cafés");
    assert_eq!(reader.position(), input.len() as u64);

    Ok(())
}

#[traced_test]
#[test]
fn write_then_read_values() -> Result<()> {
    let values = [
        TypedPropertyValue::lpstr("Quarterly report", CP_WINDOWS_1252)?,
        TypedPropertyValue::lpstr("Ünïcödé", CP_WINUNICODE)?,
        TypedPropertyValue::lpwstr("日本語")?,
        TypedPropertyValue::lpwstr("")?,
    ];

    let mut output = Cursor::new(Vec::new());
    for value in &values {
        value.write(&mut output)?;
        assert_eq!(output.position() % 4, 0);
    }

    let bytes = output.into_inner();
    let mut reader = Cursor::new(bytes.as_slice());
    let code_pages = [CP_WINDOWS_1252, CP_WINUNICODE, CP_WINDOWS_1252, CP_WINUNICODE];
    for (expected, code_page) in values.iter().zip(code_pages) {
        let actual = TypedPropertyValue::read(&mut reader, code_page)?;
        assert_eq!(actual.as_string()?, expected.as_string()?);
    }
    assert_eq!(reader.position(), bytes.len() as u64);

    Ok(())
}

#[traced_test]
#[test]
fn negative_length_is_malformed() {
    let input: &[u8] = &[0xFE, 0xFF, 0xFF, 0xFF];

    let result = PropertyString::read(&mut Cursor::new(input), CP_WINUNICODE);

    assert!(matches!(result, Err(Error::MalformedRecord(_))));
}

#[traced_test]
#[test]
fn value_as_json() -> Result<()> {
    let value = TypedPropertyValue::lpwstr("Author")?;

    let json = serde_json::to_string(&value).into_diagnostic()?;

    assert_eq!(json, r#""Author""#);

    Ok(())
}

#[traced_test]
#[test]
fn missing_padding_is_malformed() {
    #[rustfmt::skip]
    let input: &[u8] = &[
        3, 0, 0, 0,
        97, 0, 98, 0,
        0, 0,
    ];

    let result = TypedPropertyValue::read_value(&mut Cursor::new(input), VT_LPWSTR, CP_WINUNICODE);

    assert!(matches!(result, Err(Error::MalformedRecord(_))));
}

#[traced_test]
#[test]
fn missing_narrow_padding_is_malformed() {
    let input: &[u8] = &[3, 0, 0, 0, 97, 98, 0];

    let result = PropertyString::read(&mut Cursor::new(input), CP_US_ASCII);

    assert!(matches!(result, Err(Error::MalformedRecord(_))));
}
