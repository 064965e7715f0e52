use crate::artifacts::partition::push_unit::PushUnit;
use tokio::sync::mpsc;

/// Receiver of the units produced by the partitioner
pub trait UnitSink {
    fn emit(&mut self, unit: PushUnit) -> anyhow::Result<()>;
}

impl UnitSink for Vec<PushUnit> {
    fn emit(&mut self, unit: PushUnit) -> anyhow::Result<()> {
        self.push(unit);
        Ok(())
    }
}

/// Feeds the push queue from a blocking worker thread.
impl UnitSink for mpsc::Sender<PushUnit> {
    fn emit(&mut self, unit: PushUnit) -> anyhow::Result<()> {
        self.blocking_send(unit)
            .map_err(|err| anyhow::anyhow!("push queue closed, dropping {}", err.0))
    }
}
