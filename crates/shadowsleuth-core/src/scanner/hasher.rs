/// Streaming content digests.
///
/// Files are fed to the hash accumulator in fixed 64 KiB chunks, so memory
/// use is bounded regardless of file size.
use md5::Md5;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Read size for streaming digests.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithm used for the report's content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    /// Report column header for this algorithm.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA256",
        }
    }

    /// Hash everything `reader` yields, chunk by chunk.
    pub fn digest_reader<R: Read>(self, reader: R) -> io::Result<String> {
        match self {
            Self::Md5 => stream::<Md5, R>(reader),
            Self::Sha256 => stream::<Sha256, R>(reader),
        }
    }

    /// Hash an in-memory buffer in one pass.
    pub fn digest_bytes(self, data: &[u8]) -> String {
        match self {
            Self::Md5 => to_hex(&Md5::digest(data)),
            Self::Sha256 => to_hex(&Sha256::digest(data)),
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!("unsupported hash algorithm: {other}")),
        }
    }
}

fn stream<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => hasher.update(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(to_hex(&hasher.finalize()))
}

/// Lowercase hex encoding of a finished digest.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn known_md5_vectors() {
        let md5 = HashAlgorithm::Md5;
        assert_eq!(md5.digest_bytes(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5.digest_bytes(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            md5.digest_reader(Cursor::new(b"0123456789")).unwrap(),
            "781e5e245d69b566979b86e28d23f2c7"
        );
    }

    #[test]
    fn known_sha256_vector() {
        assert_eq!(
            HashAlgorithm::Sha256.digest_reader(Cursor::new(b"abc")).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_length_is_fixed() {
        for (algo, hex_len) in [(HashAlgorithm::Md5, 32), (HashAlgorithm::Sha256, 64)] {
            let big = vec![7u8; CHUNK_SIZE * 3 + 17];
            let digest = algo.digest_reader(Cursor::new(&big)).unwrap();
            assert_eq!(digest.len(), hex_len);
            assert!(digest.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
            assert_eq!(algo.digest_bytes(b"x").len(), hex_len);
        }
    }

    #[test]
    fn parses_algorithm_names() {
        assert_eq!("MD5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("sha-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    /// Reader that returns at most `step` bytes per call, to force many
    /// short reads through the chunk loop.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn chunked_digest_matches_one_pass(
            data in proptest::collection::vec(any::<u8>(), 0..(CHUNK_SIZE * 2 + 100)),
            step in 1usize..(CHUNK_SIZE + 10),
        ) {
            for algo in [HashAlgorithm::Md5, HashAlgorithm::Sha256] {
                let streamed = algo.digest_reader(Trickle { data: &data, step }).unwrap();
                prop_assert_eq!(streamed, algo.digest_bytes(&data));
            }
        }
    }
}
