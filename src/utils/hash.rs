use sha2::{Digest, Sha256, Sha384};

pub fn sha256sum(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0; 32];
    output.copy_from_slice(&result);
    output
}

pub fn sha384sum(data: &[u8]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0; 48];
    output.copy_from_slice(&result);
    output
}

/// SHA-384 over the concatenation of `parts`, without building the joined buffer.
pub fn sha384sum_parts(parts: &[&[u8]]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0; 48];
    output.copy_from_slice(&hasher.finalize());
    output
}
