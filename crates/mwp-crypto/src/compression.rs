use std::io::{Read, Write};

use flate2::{read::DeflateDecoder, write::ZlibEncoder};

use crate::{CryptoError, Result};

/// How plaintext is transformed before it is encrypted.
///
/// The wallet decides between the two modes by convention, so both peers must agree. Compressed
/// payloads carry a two byte zlib header in front of the raw deflate stream and a four byte
/// checksum behind it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    /// zlib framed deflate at the default level.
    #[default]
    Zlib,
    /// Plaintext is encrypted as-is.
    Disabled,
}

impl Compression {
    pub(crate) fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::Disabled => Ok(data.to_vec()),
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(CryptoError::Compression)?;
                encoder.finish().map_err(CryptoError::Compression)
            }
        }
    }

    /// The trailing checksum is not verified, peers disagree on its byte order.
    pub(crate) fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::Disabled => Ok(data.to_vec()),
            Compression::Zlib => {
                let body = match data {
                    [cmf, flg, body @ ..] if is_zlib_header(*cmf, *flg) => body,
                    _ => return Err(CryptoError::MissingZlibHeader),
                };

                let mut decoded = Vec::new();
                DeflateDecoder::new(body)
                    .read_to_end(&mut decoded)
                    .map_err(CryptoError::Decompression)?;
                Ok(decoded)
            }
        }
    }
}

fn is_zlib_header(cmf: u8, flg: u8) -> bool {
    cmf & 0x0f == 8 && (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_round_trip() {
        let data = br#"{"action":{"method":"eth_chainId","params":[]},"chainId":1}"#;
        let compressed = Compression::Zlib.compress(data).unwrap();
        assert_eq!(&compressed[..2], &[0x78, 0x9c]);

        let decompressed = Compression::Zlib.decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_zlib_round_trip_empty() {
        let compressed = Compression::Zlib.compress(&[]).unwrap();
        assert!(Compression::Zlib.decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_decompress_ignores_trailer_byte_order() {
        let data = b"hello hello hello hello";
        let mut compressed = Compression::Zlib.compress(data).unwrap();
        let len = compressed.len();
        compressed[len - 4..].reverse();

        assert_eq!(Compression::Zlib.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_decompress_rejects_missing_header() {
        let result = Compression::Zlib.decompress(b"plain text");
        assert!(matches!(result, Err(CryptoError::MissingZlibHeader)));

        let result = Compression::Zlib.decompress(&[0x78]);
        assert!(matches!(result, Err(CryptoError::MissingZlibHeader)));
    }

    #[test]
    fn test_disabled_is_identity() {
        let data = b"untouched";
        assert_eq!(Compression::Disabled.compress(data).unwrap(), data);
        assert_eq!(Compression::Disabled.decompress(data).unwrap(), data);
    }
}
