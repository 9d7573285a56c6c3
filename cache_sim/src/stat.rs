use std::fmt;

use crate::{cache::Counters, trace::Operation};

pub trait Stat {
    fn view(&self, max_width: usize) -> Box<dyn StatView + '_>;
}

pub trait StatView: fmt::Display {
    /// header of stat
    fn header(&self) -> &'static str;
    /// body width
    fn width(&self) -> usize;
}

/// the statistics of one run, rendered in push order.
#[derive(Default)]
pub struct Stats {
    stats: Vec<Box<dyn Stat>>,
}

impl Stats {
    pub fn push(&mut self, stat: impl Stat + 'static) -> &mut Self {
        self.stats.push(Box::new(stat));
        self
    }
    pub fn view(&self, max_width: usize) -> StatAllView<'_> {
        StatAllView {
            views: self.stats.iter().map(|s| s.view(max_width)).collect(),
        }
    }
}

pub struct StatAllView<'s> {
    views: Vec<Box<dyn StatView + 's>>,
}

impl fmt::Display for StatAllView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .views
            .iter()
            .map(|s| s.header().len().max(s.width()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:-^width$}", " statistics ")?;
        for sv in &self.views {
            writeln!(f, "{}:", sv.header())?;
            writeln!(f, "{}", sv)?;
        }
        write!(f, "{:-<width$}", "")
    }
}

impl Stat for Counters {
    fn view(&self, _: usize) -> Box<dyn StatView + '_> {
        Box::new(CountersView { stat: self })
    }
}

struct CountersView<'a> {
    stat: &'a Counters,
}

impl StatView for CountersView<'_> {
    fn header(&self) -> &'static str {
        "cache accesses"
    }
    fn width(&self) -> usize {
        24
    }
}

impl fmt::Display for CountersView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Counters {
            hits,
            misses,
            evictions,
        } = *self.stat;
        writeln!(f, "  {:>9}:{hits:>12}", "hits")?;
        writeln!(f, "  {:>9}:{misses:>12}", "misses")?;
        writeln!(f, "  {:>9}:{evictions:>12}", "evictions")?;
        match self.stat.accesses() {
            0 => write!(f, "  {:>9}:{:>12}", "hit rate", "-"),
            n => write!(
                f,
                "  {:>9}:{:>11.2}%",
                "hit rate",
                hits as f64 * 100.0 / n as f64
            ),
        }
    }
}

/// number of trace records per operation kind.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct OperationMix {
    pub loads: usize,
    pub stores: usize,
    pub modifies: usize,
}

impl OperationMix {
    pub fn incr(&mut self, op: Operation) {
        match op {
            Operation::Load => self.loads += 1,
            Operation::Store => self.stores += 1,
            Operation::Modify => self.modifies += 1,
        }
    }
}

impl Stat for OperationMix {
    fn view(&self, _: usize) -> Box<dyn StatView + '_> {
        Box::new(OperationMixView { stat: self })
    }
}

struct OperationMixView<'a> {
    stat: &'a OperationMix,
}

impl StatView for OperationMixView<'_> {
    fn header(&self) -> &'static str {
        "trace records"
    }
    fn width(&self) -> usize {
        24
    }
}

impl fmt::Display for OperationMixView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let OperationMix {
            loads,
            stores,
            modifies,
        } = self.stat;
        writeln!(f, "  {:>9}:{loads:>12}", "load")?;
        writeln!(f, "  {:>9}:{stores:>12}", "store")?;
        write!(f, "  {:>9}:{modifies:>12}", "modify")
    }
}

/// evictions suffered by each set.
#[derive(Clone, Default, Debug)]
pub struct SetEvictionStat {
    pub evictions: Vec<usize>,
}

impl Stat for SetEvictionStat {
    fn view(&self, max_width: usize) -> Box<dyn StatView + '_> {
        Box::new(SetEvictionStatView::new(self, max_width))
    }
}

pub struct SetEvictionStatView<'a> {
    stat: &'a SetEvictionStat,
    chunk_size: usize,
}

/// `"  "` prefix, then cells of `"nnnnnnnnnn: nnnnnnnnnn"` joined by `", "`
const CELL_WIDTH: usize = 22;
const SEPARATOR_WIDTH: usize = 2;

impl<'a> SetEvictionStatView<'a> {
    pub fn new(stat: &'a SetEvictionStat, max_width: usize) -> Self {
        // a row of n cells is n * (CELL_WIDTH + SEPARATOR_WIDTH) wide
        let chunk_size = (max_width / (CELL_WIDTH + SEPARATOR_WIDTH)).max(1);
        Self { stat, chunk_size }
    }
}

impl StatView for SetEvictionStatView<'_> {
    fn header(&self) -> &'static str {
        "evictions per set (format: `set: # of evictions`)"
    }
    fn width(&self) -> usize {
        self.chunk_size * (CELL_WIDTH + SEPARATOR_WIDTH)
    }
}

impl fmt::Display for SetEvictionStatView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self
            .stat
            .evictions
            .iter()
            .enumerate()
            .map(|(set, n)| format!("{set:>10}: {n:<10}"))
            .collect();
        let mut rows = cells.chunks(self.chunk_size).peekable();
        while let Some(row) = rows.next() {
            write!(f, "  {}", row.join(", "))?;
            if rows.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
