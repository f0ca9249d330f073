use crc32fast::Hasher;

/// Stable document ID derived from the file path using CRC32
pub fn get_document_id(path: &str) -> String {
    let normalized = path.replace('\\', "/");

    let mut hasher = Hasher::new();
    hasher.update(normalized.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Sequential ID generator for declaration nodes within a document
#[derive(Debug, Clone)]
pub struct IDGenerator {
    seed: String,
    count: u32,
}

impl IDGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            seed: get_document_id(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
