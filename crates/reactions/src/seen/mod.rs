//! Bounded first-seen cache used for per-channel dedup.

use indexmap::IndexMap;


/// Maximum number of identifiers a channel remembers.
pub const SEEN_CEILING: usize = 320;

/// Reaction identifier to first-seen timestamp (ms since epoch).
///
/// Entries are never updated after insertion. Once the cache grows past its
/// ceiling the oldest entries by timestamp are dropped, ties going to the
/// earlier insertion.
#[derive(Debug, Clone)]
pub struct SeenCache {
	entries: IndexMap<String, i64>,
	ceiling: usize,
}

impl Default for SeenCache {
	fn default() -> Self {
		Self::new()
	}
}

impl SeenCache {
	pub fn new() -> Self {
		Self::with_ceiling(SEEN_CEILING)
	}

	pub(crate) fn with_ceiling(ceiling: usize) -> Self {
		Self {
			entries: IndexMap::new(),
			ceiling,
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// First-seen timestamp of `key`.
	pub fn first_seen(&self, key: &str) -> Option<i64> {
		self.entries.get(key).copied()
	}

	/// Records `key` as seen at `now_ms`. Returns false, leaving the original
	/// timestamp untouched, if the key was already present.
	pub fn insert(&mut self, key: String, now_ms: i64) -> bool {
		if self.entries.contains_key(&key) {
			return false;
		}
		self.entries.insert(key, now_ms);
		true
	}

	/// Drops the oldest entries until the cache is at its ceiling. Returns
	/// the number of entries dropped.
	pub fn prune(&mut self) -> usize {
		let excess = self.entries.len().saturating_sub(self.ceiling);
		if excess == 0 {
			return 0;
		}
		// Stable sort keeps insertion order among equal timestamps.
		self.entries.sort_by(|_, a, _, b| a.cmp(b));
		self.entries.drain(..excess);
		excess
	}
}
