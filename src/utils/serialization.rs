//! Primitive encoding for the persisted state stream.
//!
//! Every integer is a fixed-width big-endian `i32` and every string is an
//! `i32` byte length followed by UTF-8 bytes.

use anyhow::{Context, Result, bail};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Upper bound on a single encoded string, guards against allocating from corrupt lengths
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024; // 16MB

/// Get the bincode configuration
fn get_config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

/// Write a single `i32`
///
/// # Errors
///
/// Returns an error if the underlying writer fails
pub fn write_int<W: Write>(out: &mut W, value: i32) -> Result<()> {
    bincode::encode_into_std_write(value, out, get_config())?;
    Ok(())
}

/// Read a single `i32`
///
/// # Errors
///
/// Returns an error if the stream ends early or the reader fails
pub fn read_int<R: Read>(input: &mut R) -> Result<i32> {
    let value = bincode::decode_from_std_read(input, get_config())?;
    Ok(value)
}

/// Write a collection size as an `i32` count
///
/// # Errors
///
/// Returns an error if the count does not fit in an `i32` or the writer fails
pub fn write_count<W: Write>(out: &mut W, count: usize) -> Result<()> {
    let count = i32::try_from(count).with_context(|| format!("Count too large: {count}"))?;
    write_int(out, count)
}

/// Read a non-negative `i32` count
///
/// # Errors
///
/// Returns an error if the count is negative or cannot be read
pub fn read_count<R: Read>(input: &mut R) -> Result<usize> {
    let count = read_int(input)?;
    usize::try_from(count).map_err(|_| anyhow::anyhow!("Negative count in stream: {count}"))
}

/// Write a length-prefixed UTF-8 string
///
/// # Errors
///
/// Returns an error if the string is too long or the writer fails
pub fn write_string<W: Write>(out: &mut W, value: &str) -> Result<()> {
    if value.len() > MAX_STRING_LEN {
        bail!("String of {} bytes exceeds the {MAX_STRING_LEN} byte limit", value.len());
    }
    write_count(out, value.len())?;
    out.write_all(value.as_bytes())?;
    Ok(())
}

/// Read the length prefix of a string and check it against [`MAX_STRING_LEN`]
fn read_string_len<R: Read>(input: &mut R) -> Result<usize> {
    let len = read_count(input).context("Failed to read string length")?;
    if len > MAX_STRING_LEN {
        bail!("String length {len} exceeds the {MAX_STRING_LEN} byte limit");
    }
    Ok(len)
}

/// Read a length-prefixed UTF-8 string
///
/// # Errors
///
/// Returns an error if:
/// - The length is negative or above [`MAX_STRING_LEN`]
/// - The stream ends before the declared length
/// - The bytes are not valid UTF-8
pub fn read_string<R: Read>(input: &mut R) -> Result<String> {
    let len = read_string_len(input)?;
    let mut bytes = vec![0u8; len];
    input
        .read_exact(&mut bytes)
        .context("Stream ended inside a string")?;
    let value = simdutf8::basic::from_utf8(&bytes).context("String is not valid UTF-8")?;
    Ok(value.to_owned())
}

/// Consume a length-prefixed string without decoding it
///
/// # Errors
///
/// Returns an error if the length is invalid or the stream ends early
pub fn skip_string<R: Read>(input: &mut R) -> Result<()> {
    let len = read_string_len(input)?;
    let expected = len as u64;
    let skipped = io::copy(&mut input.by_ref().take(expected), &mut io::sink())?;
    if skipped != expected {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof))
            .context("Stream ended inside a skipped string");
    }
    Ok(())
}

/// Write a filesystem path as a string
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8 or the writer fails
pub fn write_path<W: Write>(out: &mut W, path: &Path) -> Result<()> {
    let s = path
        .to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))?;
    write_string(out, s)
}

/// Read a filesystem path
///
/// # Errors
///
/// Returns an error if the underlying string cannot be read
pub fn read_path<R: Read>(input: &mut R) -> Result<PathBuf> {
    read_string(input).map(PathBuf::from)
}
