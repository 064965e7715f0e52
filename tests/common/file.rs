use std::path::{Path, PathBuf};

/// Create a file of `len` bytes without writing them, so that large sizes are
/// cheap to simulate.
pub fn write_sparse_file(dir: &Path, name: &str, len: u64) -> PathBuf {
    std::fs::create_dir_all(dir)
        .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", dir, e));

    let path = dir.join(name);
    std::fs::File::create(&path)
        .and_then(|file| file.set_len(len))
        .unwrap_or_else(|e| panic!("Failed to create file {:?}: {}", path, e));

    path
}

pub fn write_generated_file(dir: &Path, len: usize) -> PathBuf {
    use fake::{Fake, faker::lorem::en::Word};

    std::fs::create_dir_all(dir)
        .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", dir, e));

    let path = dir.join(format!("{}_{}.txt", Word().fake::<String>(), len));
    let content = "x".repeat(len);
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", path, e));

    path
}

pub fn write_targets_file(dir: &Path, targets: &[&Path]) -> PathBuf {
    let content = targets
        .iter()
        .map(|target| target.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    let path = dir.join("targets.txt");
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write target list {:?}: {}", path, e));

    path
}
