//! Integration tests for the C byte-array generator and parser.
//!
//! Tests cover:
//! - Header and source rendering, including line wrapping
//! - Parsing generated and hand-written initializers back to bytes
//! - Length-constant cross-checking

use digitprep::carray::{self, CArray};
use digitprep::error::ArrayError;

#[test]
fn test_header_declares_array_and_length() {
    let header = CArray::new("g_model_data").header();

    assert!(header.starts_with("#pragma once\n"));
    assert!(header.contains("extern const unsigned char g_model_data[];"));
    assert!(header.contains("extern const unsigned int g_model_data_len;"));
}

#[test]
fn test_source_wraps_twelve_bytes_per_line() {
    let bytes: Vec<u8> = (0u8..30).collect();
    let source = CArray::new("g_model_data").source(&bytes);

    let lines: Vec<&str> = source.lines().collect();
    assert_eq!(lines[0], "#include \"g_model_data.h\"");
    assert_eq!(lines[2], "const unsigned char g_model_data[] = {");
    assert_eq!(lines[3], "  0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11,");
    assert_eq!(lines[4], "  12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,");
    assert_eq!(lines[5], "  24, 25, 26, 27, 28, 29");
    assert_eq!(lines[6], "};");
    assert_eq!(lines[7], "const unsigned int g_model_data_len = 30;");
}

#[test]
fn test_source_custom_wrap_width() {
    let source = CArray::new("blob")
        .with_bytes_per_line(4)
        .source(&[10, 20, 30, 40, 50]);

    let lines: Vec<&str> = source.lines().collect();
    assert_eq!(lines[3], "  10, 20, 30, 40,");
    assert_eq!(lines[4], "  50");
}

#[test]
fn test_empty_input_renders_empty_initializer() -> anyhow::Result<()> {
    let source = CArray::new("blob").source(&[]);

    assert!(source.contains("const unsigned char blob[] = {};"));
    assert!(source.contains("const unsigned int blob_len = 0;"));
    assert_eq!(carray::parse_verified(&source)?, Vec::<u8>::new());

    Ok(())
}

#[test]
fn test_generated_source_round_trips() -> anyhow::Result<()> {
    // Every byte value, prime-length so the last line is partial
    let bytes: Vec<u8> = (0u8..=255).chain(0u8..=255).take(509).collect();
    let source = CArray::new("g_model_data").source(&bytes);

    assert_eq!(carray::parse_verified(&source)?, bytes);

    Ok(())
}

#[test]
fn test_parse_tolerates_loose_formatting() -> anyhow::Result<()> {
    let source = "unsigned char a[] = { 1 ,2,\n\t3 , 4, };\nconst unsigned int a_len = 4;";
    assert_eq!(carray::parse_bytes(source)?, vec![1, 2, 3, 4]);
    assert_eq!(carray::parse_verified(source)?, vec![1, 2, 3, 4]);
    Ok(())
}

#[test]
fn test_parse_rejects_bad_literals() {
    let err = carray::parse_bytes("char a[] = {1, 2, 300};").unwrap_err();
    assert_eq!(
        err,
        ArrayError::InvalidByte {
            token: "300".to_string()
        }
    );

    // Hex literals are not part of the generated format
    let err = carray::parse_bytes("char a[] = {0x1f};").unwrap_err();
    assert_eq!(
        err,
        ArrayError::InvalidByte {
            token: "0x1f".to_string()
        }
    );
}

#[test]
fn test_parse_requires_an_initializer() {
    let err = carray::parse_bytes("int x = 5;").unwrap_err();
    assert_eq!(err, ArrayError::MissingArray);
}

#[test]
fn test_verify_requires_length_constant() {
    let err = carray::parse_verified("char a[] = {1, 2};").unwrap_err();
    assert_eq!(err, ArrayError::MissingLength);
}

#[test]
fn test_verify_rejects_wrong_length() {
    let source = "char a[] = {1, 2, 3};\nconst unsigned int a_len = 5;";
    let err = carray::parse_verified(source).unwrap_err();
    assert_eq!(
        err,
        ArrayError::LengthMismatch {
            declared: 5,
            actual: 3
        }
    );
}
