use crate::areas::partitioner::Partitioner;
use crate::areas::session::Thresholds;
use crate::areas::stash::Stash;
use crate::artifacts::partition::push_unit::PushUnit;
use crate::artifacts::size::ByteSize;
use crate::artifacts::targets::TargetList;
use colored::Colorize;

const SIZE_WIDTH: usize = 10;

impl Stash {
    /// Print the units a backup of `targets` would push, in push order.
    ///
    /// Units holding a path over the hard ceiling are flagged: a backup would
    /// skip those paths.
    pub fn plan(
        &mut self,
        thresholds: Thresholds,
        targets: &TargetList,
    ) -> anyhow::Result<Vec<PushUnit>> {
        let (resolved, unresolved) = targets.resolve();
        for issue in &unresolved {
            issue.report();
        }

        let oracle = self.oracle();
        let partitioner = Partitioner::new(&oracle, thresholds.soft());
        let mut units = Vec::new();
        for target in &resolved {
            partitioner.partition(target, &mut units)?;
        }

        let ceiling = thresholds.hard().as_u64();
        for unit in &units {
            let size = oracle
                .size_of_all(unit.paths())
                .map(|size| ByteSize::b(size).to_string())
                .unwrap_or_else(|_| "?".to_string());
            let oversize = unit
                .paths()
                .iter()
                .filter(|path| oracle.size_of(path).is_ok_and(|size| size > ceiling))
                .count();

            if oversize == 0 {
                writeln!(self.writer(), "{size:>width$}  {unit}", width = SIZE_WIDTH)?;
            } else {
                writeln!(
                    self.writer(),
                    "{:>width$}  {}  {}",
                    size.red(),
                    unit.to_string().red(),
                    format!("({oversize} over the upload limit)").bold().red(),
                    width = SIZE_WIDTH
                )?;
            }
        }

        Ok(units)
    }
}
