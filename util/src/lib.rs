use rand::{thread_rng, RngCore};
use thiserror::Error;
use time::get_time;

/// Current timestamp in microseconds
pub fn ustime() -> i64 {
    let tv = get_time();
    tv.sec * 1_000_000 + i64::from(tv.nsec / 1000)
}

/// Current timestamp in milliseconds
pub fn mstime() -> i64 {
    ustime() / 1000
}

/// Why a config line could not be split into arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitArgsError {
    #[error("unbalanced quotes")]
    UnbalancedQuotes,
    #[error("closing quote must be followed by a space")]
    TrailingAfterQuote,
}

fn is_separator(c: u8) -> bool {
    c == 0 || c.is_ascii_whitespace()
}

fn hex_value(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Parses a config line string.
///
/// # Examples
/// ```
/// # use util::splitargs;
/// #
/// let res = splitargs(b"hello world").unwrap();
/// assert_eq!(res, vec![b"hello".to_vec(), b"world".to_vec()]);
/// ```
///
/// ```
/// # use util::splitargs;
/// #
/// let res = splitargs(b"pidfile \"/tmp/with space.pid\"").unwrap();
/// assert_eq!(res, vec![b"pidfile".to_vec(), b"/tmp/with space.pid".to_vec()]);
/// ```
pub fn splitargs(line: &[u8]) -> Result<Vec<Vec<u8>>, SplitArgsError> {
    let mut result = Vec::new();
    let mut i = 0;
    loop {
        while i < line.len() && is_separator(line[i]) {
            i += 1;
        }
        if i >= line.len() {
            return Ok(result);
        }

        let mut current = Vec::new();
        match line[i] {
            b'"' => {
                i += 1;
                loop {
                    match line.get(i) {
                        None => return Err(SplitArgsError::UnbalancedQuotes),
                        Some(b'"') => break,
                        Some(b'\\') if i + 3 < line.len() && line[i + 1] == b'x' => {
                            match (hex_value(line[i + 2]), hex_value(line[i + 3])) {
                                (Some(hi), Some(lo)) => {
                                    current.push(hi * 16 + lo);
                                    i += 4;
                                }
                                _ => {
                                    current.push(b'x');
                                    i += 2;
                                }
                            }
                        }
                        Some(b'\\') if i + 1 < line.len() => {
                            current.push(match line[i + 1] {
                                b'n' => b'\n',
                                b'r' => b'\r',
                                b't' => b'\t',
                                b'b' => 0x08,
                                b'a' => 0x07,
                                c => c,
                            });
                            i += 2;
                        }
                        Some(&c) => {
                            current.push(c);
                            i += 1;
                        }
                    }
                }
                i += 1;
                if i < line.len() && !is_separator(line[i]) {
                    return Err(SplitArgsError::TrailingAfterQuote);
                }
            }
            b'\'' => {
                i += 1;
                loop {
                    match line.get(i) {
                        None => return Err(SplitArgsError::UnbalancedQuotes),
                        Some(b'\'') => break,
                        Some(b'\\') if line.get(i + 1) == Some(&b'\'') => {
                            current.push(b'\'');
                            i += 2;
                        }
                        Some(&c) => {
                            current.push(c);
                            i += 1;
                        }
                    }
                }
                i += 1;
                if i < line.len() && !is_separator(line[i]) {
                    return Err(SplitArgsError::TrailingAfterQuote);
                }
            }
            _ => {
                while i < line.len() && !is_separator(line[i]) {
                    current.push(line[i]);
                    i += 1;
                }
            }
        }
        result.push(current);
    }
}

/// Generates a random [0-9a-f]{len} string.
///
/// # Examples
/// ```
/// # use util::get_random_hex_chars;
/// #
/// let s = get_random_hex_chars(31);
/// assert_eq!(s.len(), 31);
/// ```
pub fn get_random_hex_chars(len: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut bytes = vec![0u8; (len + 1) / 2];
    thread_rng().fill_bytes(&mut bytes);
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push(HEX[(b >> 4) as usize] as char);
        s.push(HEX[(b & 0x0f) as usize] as char);
    }
    s.truncate(len);
    s
}
