//! Particle records and the owning particle store.
//!
//! The store is a slot arena in struct-of-arrays layout. Slots are addressed
//! by [`ParticleHandle`]s carrying a generation, so a handle to a removed
//! particle never aliases whatever later reuses the slot. The spatial grid
//! only ever holds handles, never borrows particle data across a rebuild.

use serde::{Deserialize, Serialize};

/// Particle kind.
///
/// Solids are fixed-density boundary markers: the density pass pins them to
/// 1.0 and they contribute no weight to fluid neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ParticleKind {
    /// Liquid particle whose density is estimated.
    #[default]
    Fluid = 0,
    /// Solid boundary marker.
    Solid = 1,
}

/// A single particle record, as inserted into and read back from the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position in domain-normalized coordinates, nominally `[0, 1]^3`.
    pub position: [f32; 3],
    /// Fluid or solid.
    pub kind: ParticleKind,
    /// Mass (non-negative).
    pub mass: f32,
    /// Last computed density. Zero until the first density pass.
    pub density: f32,
}

impl Particle {
    /// A fluid particle with zero density. `mass` must be finite and
    /// non-negative.
    pub fn fluid(position: [f32; 3], mass: f32) -> Self {
        Self { position, kind: ParticleKind::Fluid, mass, density: 0.0 }
    }

    /// A solid particle with zero density. `mass` must be finite and
    /// non-negative.
    pub fn solid(position: [f32; 3], mass: f32) -> Self {
        Self { position, kind: ParticleKind::Solid, mass, density: 0.0 }
    }
}

#[inline]
fn valid_mass(mass: f32) -> bool {
    mass.is_finite() && mass >= 0.0
}

/// Stable reference to a particle in a [`ParticleStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleHandle {
    index: u32,
    generation: u32,
}

impl ParticleHandle {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the store's arrays.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Struct-of-arrays particle storage with generational slots.
///
/// All arrays are parallel: slot `i` across every array refers to the same
/// particle. Dead slots keep stale data and are skipped by every pass.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    pub(crate) position: Vec<[f32; 3]>,
    pub(crate) kind: Vec<ParticleKind>,
    pub(crate) mass: Vec<f32>,
    pub(crate) density: Vec<f32>,
    pub(crate) alive: Vec<bool>,
    generation: Vec<u32>,
    free: Vec<u32>,
    live: usize,
    revision: u64,
}

impl ParticleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            position: Vec::with_capacity(capacity),
            kind: Vec::with_capacity(capacity),
            mass: Vec::with_capacity(capacity),
            density: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            generation: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Return `true` if there are no live particles.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, live or dead.
    pub fn slot_count(&self) -> usize {
        self.alive.len()
    }

    /// Mutation counter. Bumped by every change that can move a particle
    /// between grid cells (insert, remove, clear, position update).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Insert a particle, reusing a free slot when one is available.
    ///
    /// `particle.mass` must be finite and non-negative; a negative mass would
    /// drive neighboring fluid densities below zero. Checked in debug builds.
    ///
    /// # Panics
    ///
    /// Panics if the store would grow past `u32::MAX` slots.
    pub fn insert(&mut self, particle: Particle) -> ParticleHandle {
        debug_assert!(valid_mass(particle.mass), "invalid particle mass {}", particle.mass);
        self.revision += 1;
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let i = index as usize;
            self.position[i] = particle.position;
            self.kind[i] = particle.kind;
            self.mass[i] = particle.mass;
            self.density[i] = particle.density;
            self.alive[i] = true;
            return ParticleHandle { index, generation: self.generation[i] };
        }

        let index = u32::try_from(self.alive.len()).expect("particle store exceeds u32 slots");
        self.position.push(particle.position);
        self.kind.push(particle.kind);
        self.mass.push(particle.mass);
        self.density.push(particle.density);
        self.alive.push(true);
        self.generation.push(0);
        ParticleHandle { index, generation: 0 }
    }

    /// Insert every particle from `particles`, returning their handles in order.
    pub fn extend<I>(&mut self, particles: I) -> Vec<ParticleHandle>
    where
        I: IntoIterator<Item = Particle>,
    {
        particles.into_iter().map(|p| self.insert(p)).collect()
    }

    /// Remove a particle. Returns `None` if the handle is stale.
    pub fn remove(&mut self, handle: ParticleHandle) -> Option<Particle> {
        let particle = self.get(handle)?;
        let i = handle.index();
        self.alive[i] = false;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        self.revision += 1;
        Some(particle)
    }

    /// Remove every particle. Outstanding handles all become stale.
    ///
    /// Slots are kept for reuse; the lowest slot is handed out first.
    pub fn clear(&mut self) {
        self.free.clear();
        for i in (0..self.alive.len()).rev() {
            if self.alive[i] {
                self.alive[i] = false;
                self.generation[i] = self.generation[i].wrapping_add(1);
            }
            self.free.push(i as u32);
        }
        self.live = 0;
        self.revision += 1;
    }

    /// Return `true` if `handle` refers to a live particle.
    #[inline]
    pub fn contains(&self, handle: ParticleHandle) -> bool {
        let i = handle.index();
        i < self.alive.len() && self.alive[i] && self.generation[i] == handle.generation
    }

    /// Copy out a particle record.
    pub fn get(&self, handle: ParticleHandle) -> Option<Particle> {
        if !self.contains(handle) {
            return None;
        }
        let i = handle.index();
        Some(Particle {
            position: self.position[i],
            kind: self.kind[i],
            mass: self.mass[i],
            density: self.density[i],
        })
    }

    /// Last computed density of a particle.
    pub fn density(&self, handle: ParticleHandle) -> Option<f32> {
        self.contains(handle).then(|| self.density[handle.index()])
    }

    /// Move a particle. The grid must be re-sorted before the next density pass.
    pub fn set_position(&mut self, handle: ParticleHandle, position: [f32; 3]) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.position[handle.index()] = position;
        self.revision += 1;
        true
    }

    /// Change a particle's mass. Same precondition as [`insert`](Self::insert).
    pub fn set_mass(&mut self, handle: ParticleHandle, mass: f32) -> bool {
        debug_assert!(valid_mass(mass), "invalid particle mass {mass}");
        if !self.contains(handle) {
            return false;
        }
        self.mass[handle.index()] = mass;
        true
    }

    /// Change a particle's kind.
    pub fn set_kind(&mut self, handle: ParticleHandle, kind: ParticleKind) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.kind[handle.index()] = kind;
        true
    }

    /// Handles of all live particles, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = ParticleHandle> + '_ {
        self.alive
            .iter()
            .zip(&self.generation)
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(i, (_, &generation))| ParticleHandle { index: i as u32, generation })
    }

    /// All live particles with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticleHandle, Particle)> + '_ {
        self.handles().filter_map(|h| self.get(h).map(|p| (h, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store() {
        let store = ParticleStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.handles().count(), 0);
    }

    #[test]
    fn insert_and_get() {
        let mut store = ParticleStore::new();
        let h = store.insert(Particle::fluid([0.1, 0.2, 0.3], 2.0));
        assert_eq!(store.len(), 1);
        let p = store.get(h).unwrap();
        assert_eq!(p.position, [0.1, 0.2, 0.3]);
        assert_eq!(p.mass, 2.0);
        assert_eq!(p.kind, ParticleKind::Fluid);
        assert_eq!(p.density, 0.0);
    }

    #[test]
    fn removed_handle_is_stale_after_slot_reuse() {
        let mut store = ParticleStore::new();
        let a = store.insert(Particle::fluid([0.1; 3], 1.0));
        let removed = store.remove(a).unwrap();
        assert_eq!(removed.position, [0.1; 3]);
        assert!(store.remove(a).is_none());

        let b = store.insert(Particle::solid([0.9; 3], 1.0));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(store.get(a).is_none());
        assert!(!store.set_position(a, [0.5; 3]));
        assert_eq!(store.get(b).unwrap().kind, ParticleKind::Solid);
        assert_eq!(store.len(), 1);
        assert_eq!(store.slot_count(), 1);
    }

    #[test]
    fn revision_tracks_grid_relevant_changes() {
        let mut store = ParticleStore::new();
        let r0 = store.revision();
        let h = store.insert(Particle::fluid([0.5; 3], 1.0));
        let r1 = store.revision();
        assert!(r1 > r0);

        assert!(store.set_mass(h, 3.0));
        assert!(store.set_kind(h, ParticleKind::Solid));
        assert_eq!(store.revision(), r1);

        assert!(store.set_position(h, [0.2; 3]));
        assert!(store.revision() > r1);

        let r2 = store.revision();
        store.clear();
        assert!(store.revision() > r2);
        assert!(store.is_empty());
        assert!(!store.contains(h));

        let fresh = store.insert(Particle::fluid([0.5; 3], 1.0));
        assert_eq!(fresh.index(), h.index());
        assert!(store.get(h).is_none());
        assert!(store.get(fresh).is_some());
    }

    #[test]
    fn handles_skip_dead_slots() {
        let mut store = ParticleStore::with_capacity(4);
        let hs = store.extend((0..4).map(|i| Particle::fluid([i as f32 * 0.2; 3], 1.0)));
        store.remove(hs[1]);
        store.remove(hs[3]);
        let live: Vec<_> = store.handles().collect();
        assert_eq!(live, vec![hs[0], hs[2]]);
        let positions: Vec<_> = store.iter().map(|(_, p)| p.position[0]).collect();
        assert_eq!(positions, vec![0.0, 0.4]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid particle mass")]
    fn negative_mass_rejected() {
        let mut store = ParticleStore::new();
        store.insert(Particle::fluid([0.5; 3], -1.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid particle mass")]
    fn nan_mass_update_rejected() {
        let mut store = ParticleStore::new();
        let h = store.insert(Particle::fluid([0.5; 3], 1.0));
        store.set_mass(h, f32::NAN);
    }

    #[test]
    fn kind_repr() {
        assert_eq!(ParticleKind::Fluid as u8, 0);
        assert_eq!(ParticleKind::Solid as u8, 1);
    }
}
