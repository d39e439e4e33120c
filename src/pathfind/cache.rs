//! Path cache (part of C6): a bounded, FIFO-evicted map from
//! `(start, end, obstacle-hash)` to the final `Path`, with atomic
//! hit/miss/eviction counters (spec.md §4.4, §9).
//!
//! Grounded on spec.md §9's own sizing note (a 128-bit key: the 64-bit
//! obstacle-region hash concatenated with a 64-bit hash of the
//! endpoints) and on the Fyrox `astar.rs` other-example's practice of
//! keeping search statistics as plain atomics rather than behind the
//! same lock as the data.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::trace;

use crate::geometry::{Path, Point};

const FNV_OFFSET: u64 = 1_469_598_103_934_665_603;
const FNV_PRIME: u64 = 1_099_511_628_211;

/// Samples `blocked` over a margin-expanded rectangle around `start` and
/// `end` and mixes occupied cells into a 64-bit accumulator
/// (spec.md §4.4).
pub fn obstacle_hash(blocked: &impl Fn(Point) -> bool, start: Point, end: Point) -> u64 {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let margin = 5i64.max((dx + dy) / 2).min(20);
    let min_x = start.x.min(end.x) - margin;
    let max_x = start.x.max(end.x) + margin;
    let min_y = start.y.min(end.y) - margin;
    let max_y = start.y.max(end.y) + margin;
    let area = (max_x - min_x + 1).saturating_mul(max_y - min_y + 1);
    let stride = if area > 2000 { 2 } else { 1 };

    let mut acc = FNV_OFFSET;
    let mut y = min_y;
    while y <= max_y {
        let mut x = min_x;
        while x <= max_x {
            if blocked(Point::new(x, y)) {
                let cell = (x as u64).wrapping_mul(31).wrapping_add(y as u64);
                acc = acc.wrapping_mul(FNV_PRIME) ^ cell;
            }
            x += stride;
        }
        y += stride;
    }
    acc = acc.wrapping_mul(FNV_PRIME) ^ (start.x as u64).rotate_left(7) ^ (start.y as u64).rotate_left(13);
    acc = acc.wrapping_mul(FNV_PRIME) ^ (end.x as u64).rotate_left(19) ^ (end.y as u64).rotate_left(23);
    acc
}

fn endpoint_hash(start: Point, end: Point) -> u64 {
    (start.x as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (start.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (end.x as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
        ^ (end.y as u64).wrapping_mul(0x27D4_EB2F_1656_67C5)
}

/// The 128-bit cache key: obstacle-region hash concatenated with an
/// endpoint hash (spec.md §9).
pub fn cache_key(blocked: &impl Fn(Point) -> bool, start: Point, end: Point) -> u128 {
    let obstacles = obstacle_hash(blocked, start, end) as u128;
    let endpoints = endpoint_hash(start, end) as u128;
    (obstacles << 64) | endpoints
}

struct Inner {
    map: HashMap<u128, Path>,
    order: VecDeque<u128>,
}

/// Bounded result cache (spec.md §4.4): not formally LRU, but
/// deterministic — eviction is FIFO by insertion order.
pub struct PathCache {
    capacity: usize,
    inner: RwLock<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl PathCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Inner { map: HashMap::new(), order: VecDeque::new() }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: u128) -> Option<Path> {
        let guard = self.inner.read().unwrap();
        let found = guard.map.get(&key).cloned();
        drop(guard);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = ?key, "path cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = ?key, "path cache miss");
        }
        found
    }

    pub fn put(&self, key: u128, path: Path) {
        let mut guard = self.inner.write().unwrap();
        if guard.map.contains_key(&key) {
            guard.map.insert(key, path);
            return;
        }
        if guard.map.len() >= self.capacity {
            if let Some(oldest) = guard.order.pop_front() {
                guard.map.remove(&oldest);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                trace!(evicted_key = ?oldest, "path cache eviction");
            }
        }
        guard.order.push_back(key);
        guard.map.insert(key, path);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap();
        guard.map.clear();
        guard.order.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> Path {
        Path::new(vec![Point::new(0, 0), Point::new(1, 0)], 10)
    }

    #[test]
    fn get_after_put_is_a_hit() {
        let cache = PathCache::new(4);
        cache.put(1, sample_path());
        assert_eq!(cache.get(1), Some(sample_path()));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn miss_is_counted() {
        let cache = PathCache::new(4);
        assert_eq!(cache.get(42), None);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn eviction_is_fifo_and_bounded() {
        let cache = PathCache::new(2);
        cache.put(1, sample_path());
        cache.put(2, sample_path());
        cache.put(3, sample_path());
        assert_eq!(cache.evictions(), 1);
        assert_eq!(cache.get(1), None);
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_some());
    }

    #[test]
    fn same_obstacle_field_different_endpoints_hash_distinctly() {
        let no_obstacles = |_: Point| false;
        let a = cache_key(&no_obstacles, Point::new(0, 0), Point::new(10, 0));
        let b = cache_key(&no_obstacles, Point::new(0, 0), Point::new(11, 0));
        assert_ne!(a, b);
    }
}
