use std::path::PathBuf;

/// Paths staged, committed and pushed together
///
/// Never empty. Its size is not stored: it is always asked from the size
/// oracle so that every component sees the same cached numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushUnit {
    paths: Vec<PathBuf>,
}

impl PushUnit {
    pub fn single(path: PathBuf) -> Self {
        PushUnit { paths: vec![path] }
    }

    /// `None` when `paths` is empty.
    pub fn group(paths: Vec<PathBuf>) -> Option<Self> {
        if paths.is_empty() {
            None
        } else {
            Some(PushUnit { paths })
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl std::fmt::Display for PushUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let [path] = self.paths.as_slice() {
            return write!(f, "{}", path.display());
        }

        let members = self
            .paths
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>();
        write!(f, "[{}]", members.join(", "))
    }
}
