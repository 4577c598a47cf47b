mod block;
mod replacement;

use enum_as_inner::EnumAsInner;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::{error::ConfigError, trace::Operation};

pub use block::{Block, Set};
pub use replacement::ReplacementPolicy;

use block::Lookup;

/// upper bound on the number of blocks a cache may hold
pub const MAX_BLOCKS: u64 = 1 << 24;

/// the fixed shape of a cache, only built through [`Geometry::new`] so the
/// parameters always divide evenly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    cache_size: u64,
    block_size: u64,
    associativity: u64,
    num_sets: u64,
}

impl Geometry {
    pub fn new(cache_size: u64, block_size: u64, associativity: u64) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("cache_size", cache_size),
            ("block_size", block_size),
            ("associativity", associativity),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        let uneven = ConfigError::UnevenGeometry {
            cache_size,
            block_size,
            associativity,
        };
        let set_bytes = block_size.checked_mul(associativity).ok_or(uneven.clone())?;
        if cache_size % set_bytes != 0 {
            return Err(uneven);
        }
        let num_sets = cache_size / set_bytes;
        // the block array is sized by `num_sets * associativity` in usize
        let blocks = num_sets
            .checked_mul(associativity)
            .filter(|blocks| *blocks <= MAX_BLOCKS)
            .and_then(|blocks| usize::try_from(blocks).ok());
        if blocks.is_none() {
            return Err(ConfigError::TooLarge {
                num_sets,
                associativity,
            });
        }
        Ok(Geometry {
            cache_size,
            block_size,
            associativity,
            num_sets,
        })
    }

    pub fn cache_size(&self) -> u64 {
        self.cache_size
    }
    pub fn block_size(&self) -> u64 {
        self.block_size
    }
    pub fn associativity(&self) -> u64 {
        self.associativity
    }
    pub fn num_sets(&self) -> u64 {
        self.num_sets
    }

    pub fn set_index(&self, addr: u64) -> u64 {
        (addr / self.block_size) % self.num_sets
    }

    pub fn tag(&self, addr: u64) -> u64 {
        (addr / self.block_size) / self.num_sets
    }

    /// return the index of the set and the tag
    pub fn split(&self, addr: u64) -> (u64, u64) {
        (self.set_index(addr), self.tag(addr))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumAsInner)]
pub enum AccessResult {
    Hit(u64),
    Miss(u64),
}

/// set-associative cache with a logical clock.
/// the clock ticks once per access and orders both LRU and FIFO.
pub struct Cache<R = ChaCha8Rng> {
    geometry: Geometry,
    policy: ReplacementPolicy,
    sets: Vec<Set>,
    clock: u64,
    rng: R,
}

impl Cache<ChaCha8Rng> {
    /// Random draws from an entropy-seeded source
    pub fn new(geometry: Geometry, policy: ReplacementPolicy) -> Self {
        Self::with_rng(geometry, policy, ChaCha8Rng::from_entropy())
    }

    pub fn with_seed(geometry: Geometry, policy: ReplacementPolicy, seed: u64) -> Self {
        Self::with_rng(geometry, policy, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Cache<R> {
    pub fn with_rng(geometry: Geometry, policy: ReplacementPolicy, rng: R) -> Self {
        let sets = vec![Set::new(geometry.associativity as usize); geometry.num_sets as usize];
        Cache {
            geometry,
            policy,
            sets,
            clock: 0,
            rng,
        }
    }

    pub fn access(&mut self, addr: u64, op: Operation) -> AccessResult {
        self.clock += 1;
        let clock = self.clock;
        let (set_index, tag) = self.geometry.split(addr);
        let set = &mut self.sets[set_index as usize];

        match set.lookup(tag) {
            Lookup::Hit(way) => {
                set.blocks_mut()[way].touch(clock);
                tracing::debug!(clock, ?op, addr, set_index, tag, way, "hit");
                AccessResult::Hit(tag)
            }
            Lookup::Miss(Some(way)) => {
                set.blocks_mut()[way].fill(tag, clock);
                tracing::debug!(clock, ?op, addr, set_index, tag, way, "miss, fill empty way");
                AccessResult::Miss(tag)
            }
            Lookup::Miss(None) => {
                let way = self.policy.choose_victim(set.blocks(), &mut self.rng);
                let victim = &mut set.blocks_mut()[way];
                tracing::trace!(
                    clock,
                    set_index,
                    way,
                    evicted_tag = victim.tag,
                    policy = %self.policy,
                    "evict"
                );
                victim.fill(tag, clock);
                tracing::debug!(clock, ?op, addr, set_index, tag, way, "miss, evicted");
                AccessResult::Miss(tag)
            }
        }
    }
}

impl<R> Cache<R> {
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }
    pub fn clock(&self) -> u64 {
        self.clock
    }
    pub fn set(&self, index: usize) -> Option<&Set> {
        self.sets.get(index)
    }
    /// check without touching any timestamp
    pub fn contains(&self, addr: u64) -> bool {
        let (set_index, tag) = self.geometry.split(addr);
        self.sets[set_index as usize].contains(tag)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils;

    fn geometry() -> Geometry {
        // 16 sets of 2 ways
        Geometry::new(1024, 32, 2).unwrap()
    }

    #[test]
    fn test_geometry() {
        let g = geometry();
        assert_eq!(g.num_sets(), 16);
        assert_eq!(g.split(0), (0, 0));
        assert_eq!(g.split(31), (0, 0));
        assert_eq!(g.split(32), (1, 0));
        assert_eq!(g.split(32768), (0, 64));
        // 16 sets * 32 bytes, one full lap later is the next tag
        assert_eq!(g.split(512 + 64), (2, 1));
    }

    #[test]
    fn test_geometry_not_power_of_two() {
        let g = Geometry::new(96, 16, 2).unwrap();
        assert_eq!(g.num_sets(), 3);
        assert_eq!(g.split(16 * 4), (1, 1));
    }

    #[test]
    fn test_bad_geometry() {
        assert_eq!(
            Geometry::new(1000, 32, 2),
            Err(ConfigError::UnevenGeometry {
                cache_size: 1000,
                block_size: 32,
                associativity: 2
            })
        );
        assert_eq!(
            Geometry::new(1024, 0, 2),
            Err(ConfigError::NonPositive {
                field: "block_size"
            })
        );
        assert_eq!(
            Geometry::new(0, 32, 2),
            Err(ConfigError::NonPositive {
                field: "cache_size"
            })
        );
        assert_eq!(
            Geometry::new(1024, 32, 0),
            Err(ConfigError::NonPositive {
                field: "associativity"
            })
        );
        // smaller than one set
        assert!(Geometry::new(32, 32, 2).is_err());
    }

    #[test]
    fn test_too_large_geometry() {
        assert_eq!(
            Geometry::new(1 << 62, 1, 1),
            Err(ConfigError::TooLarge {
                num_sets: 1 << 62,
                associativity: 1
            })
        );
        assert_eq!(
            Geometry::new(MAX_BLOCKS * 2 * 64, 64, 2),
            Err(ConfigError::TooLarge {
                num_sets: MAX_BLOCKS,
                associativity: 2
            })
        );
        // exactly at the cap still builds
        let g = Geometry::new(MAX_BLOCKS * 16, 16, 4).unwrap();
        assert_eq!(g.num_sets() * g.associativity(), MAX_BLOCKS);
    }

    #[test]
    fn test_cache() {
        test_utils::init();
        let mut cache = Cache::with_seed(geometry(), ReplacementPolicy::Lru, 0);
        assert_eq!(cache.sets.len(), 16);
        assert!(cache.sets.iter().all(|s| s.blocks().len() == 2));

        // the first one is miss and then the later ones in the block hit
        assert!(cache.access(0, Operation::Load).as_miss().is_some());
        assert!(cache.access(1, Operation::Load).as_hit().is_some());
        assert!(cache.access(31, Operation::Store).as_hit().is_some());
        assert!(cache.access(32, Operation::Load).as_miss().is_some());
        assert_eq!(cache.clock(), 4);

        let block = &cache.set(0).unwrap().blocks()[0];
        assert!(block.valid);
        assert_eq!(block.last_used_time, 3);
        assert_eq!(block.arrival_time, 1);
    }

    #[test]
    fn test_lru_eviction() {
        test_utils::init();
        let mut cache = Cache::with_seed(geometry(), ReplacementPolicy::Lru, 0);
        let stride = 512;
        cache.access(0, Operation::Load);
        cache.access(stride, Operation::Load);
        // touch the first one, so the second is the lru
        cache.access(0, Operation::Load);
        assert_eq!(
            cache.access(2 * stride, Operation::Load),
            AccessResult::Miss(2)
        );
        assert!(cache.contains(0));
        assert!(!cache.contains(stride));
        assert!(cache.contains(2 * stride));
        // eviction overwrites in place, the set never shrinks
        assert!(cache.set(0).unwrap().blocks().iter().all(|b| b.valid));
    }

    #[test]
    fn test_fifo_eviction() {
        test_utils::init();
        let mut cache = Cache::with_seed(geometry(), ReplacementPolicy::Fifo, 0);
        let stride = 512;
        cache.access(0, Operation::Load);
        cache.access(stride, Operation::Load);
        cache.access(0, Operation::Load);
        assert!(cache.access(2 * stride, Operation::Load).as_miss().is_some());
        // the first arrived is evicted even if it was used last
        assert!(!cache.contains(0));
        assert!(cache.contains(stride));
    }

    #[test]
    fn test_random_eviction_keeps_one() {
        test_utils::init();
        let mut cache = Cache::with_seed(geometry(), ReplacementPolicy::Random, 7);
        let stride = 512;
        cache.access(0, Operation::Load);
        cache.access(stride, Operation::Load);
        cache.access(2 * stride, Operation::Load);
        assert!(cache.contains(2 * stride));
        assert!(cache.contains(0) ^ cache.contains(stride));
    }

    #[test]
    fn test_contains_does_not_touch() {
        let mut cache = Cache::with_seed(geometry(), ReplacementPolicy::Lru, 0);
        cache.access(0, Operation::Load);
        assert!(cache.contains(0));
        assert_eq!(cache.clock(), 1);
        assert_eq!(cache.set(0).unwrap().blocks()[0].last_used_time, 1);
    }
}
