use crate::areas::size_oracle::SizeOracle;
use std::io::Write;
use std::sync::Arc;

/// Entry point of every command
///
/// Holds the size oracle shared by all the work of one invocation and the
/// writer human-facing output goes to.
pub struct Stash {
    oracle: Arc<SizeOracle>,
    writer: Box<dyn Write + Send>,
}

impl Stash {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self::with_oracle(Arc::new(SizeOracle::new()), writer)
    }

    pub fn with_oracle(oracle: Arc<SizeOracle>, writer: Box<dyn Write + Send>) -> Self {
        Stash { oracle, writer }
    }

    pub fn oracle(&self) -> Arc<SizeOracle> {
        self.oracle.clone()
    }

    pub fn writer(&mut self) -> &mut (dyn Write + Send) {
        self.writer.as_mut()
    }
}
