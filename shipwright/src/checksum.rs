use std::fs::File;
use std::io;
use std::path::Path;

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Legacy and modern digests of a release tarball, hex encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    pub md5: String,
    pub sha256: String,
}

/// Hash a file with both algorithms in a single pass
pub fn compute(path: &Path) -> Result<Checksums> {
    let mut file = File::open(path)?;
    let mut hashers = DualHasher::default();
    io::copy(&mut file, &mut hashers)?;

    let checksums = Checksums {
        md5: hex::encode(hashers.md5.finalize()),
        sha256: hex::encode(hashers.sha256.finalize()),
    };

    tracing::info!("md5sum {}", checksums.md5);
    tracing::info!("sha256sum {}", checksums.sha256);
    Ok(checksums)
}

#[derive(Default)]
struct DualHasher {
    md5: Md5,
    sha256: Sha256,
}

impl io::Write for DualHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.md5.update(buf);
        self.sha256.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
