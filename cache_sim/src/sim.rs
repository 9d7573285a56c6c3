use std::fmt;

use crate::{
    cache::{Cache, Counters, Outcome},
    geometry::Geometry,
    trace::{Access, Operation},
};

#[cfg(feature = "stat")]
use crate::stat::{OperationMix, SetEvictionStat, Stats};

/// outcomes of a single trace record; a modify yields two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessResult {
    pub first: Outcome,
    pub second: Option<Outcome>,
}

impl AccessResult {
    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> {
        std::iter::once(self.first).chain(self.second)
    }
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if let Some(second) = self.second {
            write!(f, " {second}")?;
        }
        Ok(())
    }
}

/// replays accesses one at a time, in order, against a single cache.
pub struct Simulator {
    geometry: Geometry,
    cache: Cache,
    counters: Counters,
    #[cfg(feature = "stat")]
    mix: OperationMix,
}

impl Simulator {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            cache: Cache::new(&geometry),
            geometry,
            counters: Counters::default(),
            #[cfg(feature = "stat")]
            mix: OperationMix::default(),
        }
    }

    pub fn step(&mut self, access: &Access) -> AccessResult {
        #[cfg(feature = "stat")]
        self.mix.incr(access.op);
        let decoded = self.geometry.decode(access.addr);
        let first = self.cache.access(&decoded, &mut self.counters);
        // the store half of a modify follows its load immediately, so it always hits
        let second = match access.op {
            Operation::Load | Operation::Store => None,
            Operation::Modify => Some(self.cache.access(&decoded, &mut self.counters)),
        };
        let result = AccessResult { first, second };
        log::trace!(
            "{access} (set {:#x}, tag {:#x}): {result}",
            decoded.set_index,
            decoded.tag
        );
        result
    }

    pub fn run<'a, F>(&mut self, trace: impl IntoIterator<Item = &'a Access>, mut on_step: F)
    where
        F: FnMut(&Access, &AccessResult),
    {
        for access in trace {
            let result = self.step(access);
            on_step(access, &result);
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    #[cfg(feature = "stat")]
    pub fn collect_stat(&self) -> Stats {
        let mut ss = Stats::default();
        ss.push(self.counters).push(self.mix).push(SetEvictionStat {
            evictions: self.cache.evictions_per_set(),
        });
        ss
    }
}
