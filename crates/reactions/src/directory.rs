use std::collections::HashMap;
use std::fmt;

use pulse_surface::SurfaceRef;

/// Surfaces the host has registered under a container id.
#[derive(Default, Clone)]
pub struct SurfaceDirectory {
	surfaces: HashMap<String, SurfaceRef>,
}

impl SurfaceDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `surface` under `id`, returning the surface it replaced.
	pub fn insert(&mut self, id: impl Into<String>, surface: SurfaceRef) -> Option<SurfaceRef> {
		self.surfaces.insert(id.into(), surface)
	}

	pub fn remove(&mut self, id: &str) -> Option<SurfaceRef> {
		self.surfaces.remove(id)
	}

	pub fn resolve(&self, id: &str) -> Option<SurfaceRef> {
		self.surfaces.get(id).cloned()
	}

	pub fn len(&self) -> usize {
		self.surfaces.len()
	}

	pub fn is_empty(&self) -> bool {
		self.surfaces.is_empty()
	}
}

impl fmt::Debug for SurfaceDirectory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut ids: Vec<_> = self.surfaces.keys().collect();
		ids.sort();
		f.debug_struct("SurfaceDirectory").field("ids", &ids).finish()
	}
}
