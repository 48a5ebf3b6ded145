//! Cadence record codec
//!
//! Reversible obfuscation for records cached in durable client storage.
//! THIS IS NOT ENCRYPTION. The key is a constant compiled into every client
//! and anyone with the binary (or the web bundle) can reverse it. It keeps
//! cached user data from being readable at a glance, nothing more.
//!
//! Layout, shared with the web client:
//! - payload:  base64( xor( base64( uri_component( json ) ), key ) ),
//!   where `uri_component` escapes exactly what `encodeURIComponent` does
//! - checksum: base64( decimal( sum of UTF-16 code units of json ) )
//!
//! The checksum is additive and only catches accidental corruption. A payload
//! edit can also go unnoticed when it only respells a percent escape (`%7B`
//! as `%7b`); the record then reads back unchanged.

pub mod checksum;
pub mod error;
pub mod obfuscate;

pub use error::CodecError;
pub use obfuscate::{DEFAULT_KEY, Decoded, Encoded, ObfuscationCodec, RecordFormat};
