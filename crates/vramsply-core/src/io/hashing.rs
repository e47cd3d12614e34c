use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use vramsply_schema::Sha256Digest;

/// Computes the SHA256 digest of a file, streaming it in 64 KiB blocks.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> std::io::Result<Sha256Digest> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let count = file.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }

    let bytes: [u8; 32] = hasher.finalize().into();
    Ok(Sha256Digest::from(bytes))
}

/// [`sha256_file`] on the blocking thread pool.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or the hashing task dies.
pub async fn sha256_file_async(path: PathBuf) -> std::io::Result<Sha256Digest> {
    tokio::task::spawn_blocking(move || sha256_file(&path))
        .await
        .map_err(std::io::Error::other)?
}

/// SHA256 digest of an in-memory buffer.
pub fn sha256_bytes(data: &[u8]) -> Sha256Digest {
    let bytes: [u8; 32] = Sha256::digest(data).into();
    Sha256Digest::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD_NL: &str =
        "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447";

    #[test]
    fn file_and_buffer_digests_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello world\n").unwrap();

        let from_file = sha256_file(&path).unwrap();
        assert_eq!(from_file.as_str(), HELLO_WORLD_NL);
        assert_eq!(sha256_bytes(b"hello world\n"), from_file);
    }

    #[tokio::test]
    async fn async_variant_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        // spans several read blocks
        let data = vec![7u8; 200 * 1024 + 13];
        std::fs::write(&path, &data).unwrap();

        let digest = sha256_file_async(path).await.unwrap();
        assert_eq!(digest, sha256_bytes(&data));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(sha256_file(Path::new("/definitely/not/here")).is_err());
    }
}
