use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The proprietary magic found on pack-archive local-file headers.
pub const PACK_MAGIC: [u8; 4] = *b"GBMP";

/// The standard ZIP local-file-header magic, `PK\x03\x04`.
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature must not be empty")]
    Empty,

    #[error("hex signature {0:?} has an odd number of digits")]
    OddHexLength(String),

    #[error("invalid hex digit {digit:?} in signature {input:?}")]
    InvalidHex { input: String, digit: char },
}

/// A fixed byte string searched for or substituted by the patcher.
///
/// Signatures are opaque: no container-format meaning is attached to them.
/// Non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create a signature from raw bytes. Rejects empty input.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SignatureError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SignatureError::Empty);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a signature from command-line text.
///
/// A `0x`-prefixed even-length hex string is decoded as bytes
/// (`0x504b0304` is `PK\x03\x04`), so non-printable signatures stay
/// expressible. Anything else is taken as its literal UTF-8 bytes.
impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) else {
            return Signature::new(s.as_bytes().to_vec());
        };

        let digits = hex.as_bytes();
        if digits.len() % 2 != 0 {
            return Err(SignatureError::OddHexLength(s.to_string()));
        }

        let mut bytes = Vec::with_capacity(digits.len() / 2);
        for pair in digits.chunks_exact(2) {
            let hi = hex_digit(pair[0] as char, s)?;
            let lo = hex_digit(pair[1] as char, s)?;
            bytes.push(hi << 4 | lo);
        }

        Signature::new(bytes)
    }
}

fn hex_digit(digit: char, input: &str) -> Result<u8, SignatureError> {
    digit
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| SignatureError::InvalidHex {
            input: input.to_string(),
            digit,
        })
}

/// Printable signatures display as text, everything else as `0x`-hex.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(text) if self.0.iter().all(|b| b.is_ascii_graphic()) => f.write_str(text),
            _ => {
                write!(f, "0x")?;
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}
