use crate::areas::stash::Stash;
use crate::artifacts::size::ByteSize;
use anyhow::Context;
use std::path::PathBuf;

impl Stash {
    pub fn size(&mut self, paths: &[PathBuf], bytes: bool) -> anyhow::Result<()> {
        let oracle = self.oracle();

        for path in paths {
            let size = oracle
                .size_of(path)
                .with_context(|| format!("Failed to size {}", path.display()))?;

            if bytes {
                writeln!(self.writer(), "{size}\t{}", path.display())?;
            } else {
                writeln!(self.writer(), "{}\t{}", ByteSize::b(size), path.display())?;
            }
        }

        Ok(())
    }
}
