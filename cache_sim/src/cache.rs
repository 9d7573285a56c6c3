use std::fmt;

use serde::Serialize;

use crate::{address::DecodedAddr, geometry::Geometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
    MissWithEviction,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Hit => write!(f, "hit"),
            Outcome::Miss => write!(f, "miss"),
            Outcome::MissWithEviction => write!(f, "miss eviction"),
        }
    }
}

/// aggregate hit / miss / eviction counts of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

impl Counters {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Hit => self.hits += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::MissWithEviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }
    pub fn accesses(&self) -> usize {
        self.hits + self.misses
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

#[derive(Clone, Copy, Default)]
struct Line {
    /// `None` while the slot is empty
    tag: Option<u64>,
    /// insertion order within the set; hits never touch it
    seq: u64,
}

struct Set {
    lines: Box<[Line]>,
    insertions: u64,
    #[cfg(feature = "stat")]
    evictions: usize,
}

impl Set {
    fn new(ways: usize) -> Self {
        Self {
            lines: vec![Line::default(); ways].into_boxed_slice(),
            insertions: 0,
            #[cfg(feature = "stat")]
            evictions: 0,
        }
    }

    fn access(&mut self, tag: u64) -> Outcome {
        if self.insertions == 0 {
            self.insert(0, tag);
            return Outcome::Miss;
        }
        if self.lines.iter().any(|l| l.tag == Some(tag)) {
            return Outcome::Hit;
        }
        if let Some(slot) = self.lines.iter().position(|l| l.tag.is_none()) {
            self.insert(slot, tag);
            return Outcome::Miss;
        }
        // sequence numbers are unique within a set, so the oldest line is unambiguous
        let victim = self
            .lines
            .iter()
            .enumerate()
            .min_by_key(|(_, l)| l.seq)
            .map_or(0, |(slot, _)| slot);
        self.insert(victim, tag);
        #[cfg(feature = "stat")]
        {
            self.evictions += 1;
        }
        Outcome::MissWithEviction
    }

    fn insert(&mut self, slot: usize, tag: u64) {
        self.insertions += 1;
        self.lines[slot] = Line {
            tag: Some(tag),
            seq: self.insertions,
        };
    }
}

/// set-associative cache with insertion-order (FIFO) replacement.
///
/// only tags are tracked; block contents are never modeled.
pub struct Cache {
    sets: Vec<Set>,
}

impl Cache {
    pub fn new(geometry: &Geometry) -> Self {
        log::debug!(
            "allocating {} sets of {} lines",
            geometry.num_sets(),
            geometry.associativity()
        );
        Self {
            sets: (0..geometry.num_sets())
                .map(|_| Set::new(geometry.associativity()))
                .collect(),
        }
    }

    /// classifies one access, inserting the tag on a miss.
    ///
    /// panics if `decoded.set_index` was not produced by this cache's geometry.
    pub fn access(&mut self, decoded: &DecodedAddr, counters: &mut Counters) -> Outcome {
        let outcome = self.sets[decoded.set_index].access(decoded.tag);
        counters.record(outcome);
        outcome
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    #[cfg(feature = "stat")]
    pub fn evictions_per_set(&self) -> Vec<usize> {
        self.sets.iter().map(|s| s.evictions).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Addr;

    fn run(geometry: &Geometry, addrs: &[u64]) -> (Vec<Outcome>, Counters) {
        let mut cache = Cache::new(geometry);
        let mut counters = Counters::default();
        let outcomes = addrs
            .iter()
            .map(|&a| cache.access(&geometry.decode(Addr::new(a)), &mut counters))
            .collect();
        (outcomes, counters)
    }

    #[test]
    fn test_cold_start_is_miss() {
        for (s, e, b) in [(0, 1, 0), (1, 2, 1), (4, 4, 4)] {
            let g = Geometry::new(s, e, b).unwrap();
            assert_eq!(1 << s, Cache::new(&g).num_sets());
            let (o, _) = run(&g, &[0x1234]);
            assert_eq!(vec![Outcome::Miss], o);
        }
    }
    #[test]
    fn test_single_line() {
        let g = Geometry::new(0, 1, 0).unwrap();
        let (o, c) = run(&g, &[0x0, 0x1]);
        assert_eq!(vec![Outcome::Miss, Outcome::MissWithEviction], o);
        assert_eq!(
            Counters {
                hits: 0,
                misses: 2,
                evictions: 1
            },
            c
        );
    }
    #[test]
    fn test_direct_mapped_conflict() {
        let g = Geometry::new(2, 1, 2).unwrap();
        // same set (index 1), tags 0, 1, 0
        let (o, _) = run(&g, &[0x04, 0x14, 0x04, 0x08]);
        assert_eq!(
            vec![
                Outcome::Miss,
                Outcome::MissWithEviction,
                Outcome::MissWithEviction,
                Outcome::Miss
            ],
            o
        );
    }
    #[test]
    fn test_two_way_eviction() {
        let g = Geometry::new(1, 2, 0).unwrap();
        // set 0 with tags 0, 1, 2 then tag 1 again
        let (o, c) = run(&g, &[0b000, 0b010, 0b100, 0b010]);
        assert_eq!(
            vec![
                Outcome::Miss,
                Outcome::Miss,
                Outcome::MissWithEviction,
                Outcome::Hit
            ],
            o
        );
        assert_eq!("hits:1 misses:3 evictions:1", c.to_string());
    }
    #[test]
    fn test_hit_does_not_promote() {
        let g = Geometry::new(0, 2, 0).unwrap();
        let (a, b, c) = (0xa, 0xb, 0xc);
        let (o, _) = run(&g, &[a, b, a, a, a, c, b, a]);
        assert_eq!(
            vec![
                Outcome::Miss,
                Outcome::Miss,
                Outcome::Hit,
                Outcome::Hit,
                Outcome::Hit,
                // a is the oldest insertion even though it was just hit
                Outcome::MissWithEviction,
                Outcome::Hit,
                Outcome::MissWithEviction,
            ],
            o
        );
    }
    #[test]
    fn test_evicts_in_insertion_order() {
        let ways = 4;
        let g = Geometry::new(2, ways, 4).unwrap();
        let mut cache = Cache::new(&g);
        let mut counters = Counters::default();
        let addr = |tag: u64| Addr::new(tag << 6 | 0b10 << 4);
        let mut access = |tag| cache.access(&g.decode(addr(tag)), &mut counters);
        for tag in 0..ways as u64 {
            assert_eq!(Outcome::Miss, access(tag));
        }
        // hits on later lines must not change the victim order
        assert_eq!(Outcome::Hit, access(3));
        assert_eq!(Outcome::Hit, access(1));
        assert_eq!(Outcome::MissWithEviction, access(100));
        // only the first insertion left the set
        for tag in 1..ways as u64 {
            assert_eq!(Outcome::Hit, access(tag), "tag {tag} should still be cached");
        }
        assert_eq!(Outcome::MissWithEviction, access(0));
    }
    #[test]
    fn test_sets_are_independent() {
        let g = Geometry::new(1, 1, 0).unwrap();
        let (o, c) = run(&g, &[0b00, 0b01, 0b00, 0b01]);
        assert_eq!(
            vec![Outcome::Miss, Outcome::Miss, Outcome::Hit, Outcome::Hit],
            o
        );
        assert_eq!(0, c.evictions);
    }
    #[test]
    fn test_counters_json() {
        let c = Counters {
            hits: 1,
            misses: 2,
            evictions: 3,
        };
        assert_eq!(
            r#"{"hits":1,"misses":2,"evictions":3}"#,
            serde_json::to_string(&c).unwrap()
        );
    }
    #[test]
    fn test_zero_tag_is_not_empty() {
        let g = Geometry::new(0, 2, 4).unwrap();
        // tag 0 must not be mistaken for the empty second slot
        let (o, _) = run(&g, &[0x10, 0x00, 0x00]);
        assert_eq!(vec![Outcome::Miss, Outcome::Miss, Outcome::Hit], o);
    }
}
