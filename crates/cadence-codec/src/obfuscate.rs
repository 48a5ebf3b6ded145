use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Serialize, de::DeserializeOwned};

use crate::checksum;
use crate::error::CodecError;

/// Built-in obfuscation key. Public by construction; see the crate docs.
pub const DEFAULT_KEY: &str = "default-encryption-key-change-in-production";

/// Marks `encodeURIComponent` leaves alone but `urlencoding` escapes.
const URI_MARKS: [(&str, &str); 5] = [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Obfuscated,
    /// Stored as bare JSON by the write fallback.
    Plain,
}

/// Output of [`ObfuscationCodec::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub payload: String,
    pub checksum: String,
    /// The serialized form the checksum was taken over. Written as-is when
    /// the obfuscated payload cannot be stored.
    pub canonical: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub format: RecordFormat,
}

/// Repeating-key XOR codec for cached records.
#[derive(Debug, Clone)]
pub struct ObfuscationCodec {
    key: Vec<u8>,
}

impl Default for ObfuscationCodec {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.as_bytes().to_vec(),
        }
    }
}

impl ObfuscationCodec {
    /// An empty key falls back to [`DEFAULT_KEY`].
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        let key = key.as_ref();
        if key.is_empty() {
            return Self::default();
        }
        Self { key: key.to_vec() }
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Encoded, CodecError> {
        let canonical = serde_json::to_string(value).map_err(CodecError::Serialize)?;
        Ok(Encoded {
            payload: self.obfuscate(&canonical),
            checksum: checksum::compute(&canonical),
            canonical,
        })
    }

    /// Absent or empty input is `Ok(None)`. Input that is not an obfuscated
    /// payload is retried as a plain JSON record before giving up.
    pub fn decode<T: DeserializeOwned>(
        &self,
        stored: Option<&str>,
    ) -> Result<Option<Decoded<T>>, CodecError> {
        let Some(stored) = stored.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let obfuscated = self.reveal(stored).and_then(|json| {
            serde_json::from_str::<T>(&json).map_err(CodecError::decode)
        });

        match obfuscated {
            Ok(value) => Ok(Some(Decoded {
                value,
                format: RecordFormat::Obfuscated,
            })),
            Err(err) => match serde_json::from_str::<T>(stored) {
                Ok(value) => Ok(Some(Decoded {
                    value,
                    format: RecordFormat::Plain,
                })),
                Err(_) => Err(err),
            },
        }
    }

    /// Recomputes the checksum of `value` and compares it to the stored one.
    /// A missing checksum passes.
    pub fn verify_integrity<T: Serialize + ?Sized>(&self, value: &T, stored_checksum: Option<&str>) -> bool {
        match serde_json::to_string(value) {
            Ok(canonical) => checksum::matches(&canonical, stored_checksum),
            Err(_) => false,
        }
    }

    pub fn obfuscate(&self, text: &str) -> String {
        let inner = BASE64.encode(encode_uri_component(text).as_bytes());
        BASE64.encode(self.xor(inner.as_bytes()))
    }

    /// Inverse of [`obfuscate`](Self::obfuscate).
    pub fn reveal(&self, payload: &str) -> Result<String, CodecError> {
        let outer = BASE64
            .decode(payload)
            .map_err(|e| CodecError::decode(format!("outer base64: {e}")))?;
        let inner = BASE64
            .decode(self.xor(&outer))
            .map_err(|e| CodecError::decode(format!("inner base64: {e}")))?;
        let component = String::from_utf8(inner).map_err(CodecError::decode)?;
        let text = urlencoding::decode(&component).map_err(CodecError::decode)?;
        Ok(text.into_owned())
    }

    fn xor(&self, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

/// Same escaping as JavaScript's `encodeURIComponent`. Every `%` in the
/// escaped text starts its own triple, so restoring the marks cannot touch
/// other escapes.
fn encode_uri_component(text: &str) -> String {
    URI_MARKS
        .iter()
        .fold(urlencoding::encode(text).into_owned(), |acc, &(escaped, mark)| {
            acc.replace(escaped, mark)
        })
}
