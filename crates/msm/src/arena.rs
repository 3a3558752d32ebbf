//! Zoned bump allocator for scratch memory reused across calls
//!
//! An [`Arena`] owns one contiguous buffer split into a global zone and one
//! local zone per worker thread. Allocation bumps the zone offset and hands
//! out a [`Slab`], a bounds-checked index range into the buffer. Offsets are
//! restored by [`ArenaScope`] guards, so reclamation is stack-like and the
//! buffer can serve the next call. [`Arena::reserve`] grows it only when a
//! zone is too small.
//!
//! Slabs may be written from several threads at once as long as the ranges
//! they touch are disjoint between two barrier waits. The accessors that rely
//! on this are `unsafe`.

use core::cell::UnsafeCell;
use core::ops::Range;
use core::sync::atomic::{AtomicUsize, Ordering};

use dmsm_api::{validate, Error, Result};

const GLOBAL_ZONE: &str = "global";
const LOCAL_ZONE: &str = "local";

/// Which zone an allocation is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Shared zone, allocated from by the coordinator
    Global,
    /// Private zone of the thread with this id
    Local(usize),
}

/// A typed range of arena slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slab {
    start: usize,
    len: usize,
}

impl Slab {
    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the slab holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sub-range of this slab, relative to its start
    pub fn sub(&self, range: Range<usize>) -> Result<Slab> {
        validate::parameter(
            range.start <= range.end && range.end <= self.len,
            "range",
            "sub-range exceeds slab",
        )?;
        Ok(Slab {
            start: self.start + range.start,
            len: range.end - range.start,
        })
    }

    /// The first `len` elements
    pub fn prefix(&self, len: usize) -> Result<Slab> {
        self.sub(0..len)
    }
}

struct ZoneState {
    base: usize,
    capacity: usize,
    offset: AtomicUsize,
}

impl ZoneState {
    fn new(base: usize, capacity: usize) -> Self {
        Self {
            base,
            capacity,
            offset: AtomicUsize::new(0),
        }
    }
}

/// Zone sizes for a new arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaLayout {
    /// Capacity of the global zone
    pub global: usize,
    /// Capacity of each local zone
    pub local: usize,
    /// Number of local zones
    pub threads: usize,
}

/// Zoned storage for `Copy` records
pub struct Arena<T> {
    storage: Box<[UnsafeCell<T>]>,
    zones: Vec<ZoneState>,
    layout: ArenaLayout,
}

// SAFETY: elements are only reached through `Slab` ranges. Shared mutation
// goes through the `unsafe` accessors whose callers guarantee disjointness,
// and the zone offsets are atomics.
unsafe impl<T: Send> Sync for Arena<T> {}

impl<T: Copy + Default> Arena<T> {
    /// Allocate backing storage for `layout`, filled with `T::default()`
    pub fn new(layout: ArenaLayout) -> Result<Self> {
        let locals = layout
            .local
            .checked_mul(layout.threads)
            .ok_or_else(|| Error::param("layout", "local zones overflow usize"))?;
        let total = layout
            .global
            .checked_add(locals)
            .ok_or_else(|| Error::param("layout", "arena size overflows usize"))?;

        let storage = (0..total).map(|_| UnsafeCell::new(T::default())).collect();
        let mut zones = Vec::with_capacity(layout.threads + 1);
        zones.push(ZoneState::new(0, layout.global));
        for t in 0..layout.threads {
            zones.push(ZoneState::new(layout.global + t * layout.local, layout.local));
        }
        Ok(Self {
            storage,
            zones,
            layout,
        })
    }

    /// Arena with a global zone only
    pub fn global(capacity: usize) -> Result<Self> {
        Self::new(ArenaLayout {
            global: capacity,
            local: 0,
            threads: 0,
        })
    }

    /// Zone sizes of the current buffer
    pub fn layout(&self) -> ArenaLayout {
        self.layout
    }

    /// Make room for `layout`, reallocating only when some zone is too small.
    ///
    /// Returns `true` when new storage was allocated. A reused buffer keeps
    /// its contents and zone offsets; new storage grows every dimension to
    /// the larger of the old and requested sizes.
    pub fn reserve(&mut self, layout: ArenaLayout) -> Result<bool> {
        let current = self.layout;
        if current.global >= layout.global
            && current.local >= layout.local
            && current.threads >= layout.threads
        {
            return Ok(false);
        }
        *self = Self::new(ArenaLayout {
            global: current.global.max(layout.global),
            local: current.local.max(layout.local),
            threads: current.threads.max(layout.threads),
        })?;
        Ok(true)
    }

    fn zone(&self, zone: Zone) -> Result<&ZoneState> {
        let (index, name) = match zone {
            Zone::Global => (0, GLOBAL_ZONE),
            Zone::Local(id) => (id + 1, LOCAL_ZONE),
        };
        self.zones.get(index).ok_or_else(|| Error::Capacity {
            zone: name,
            requested: 1,
            available: 0,
        })
    }

    /// Bump-allocate `len` elements; contents are whatever the slots held last
    pub fn alloc(&self, zone: Zone, len: usize) -> Result<Slab> {
        let name = match zone {
            Zone::Global => GLOBAL_ZONE,
            Zone::Local(_) => LOCAL_ZONE,
        };
        let state = self.zone(zone)?;
        let mut current = state.offset.load(Ordering::Relaxed);
        loop {
            validate::capacity(name, len, state.capacity - current)?;
            match state.offset.compare_exchange_weak(
                current,
                current + len,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Ok(Slab {
                        start: state.base + current,
                        len,
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Bump-allocate `len` elements reset to `T::default()`
    pub fn alloc_zeroed(&self, zone: Zone, len: usize) -> Result<Slab> {
        let slab = self.alloc(zone, len)?;
        // SAFETY: the slab was just carved out of the zone, no other handle
        // to these slots exists yet.
        unsafe { self.slice_mut(slab) }.fill(T::default());
        Ok(slab)
    }

    /// Allocate a single element holding `value`
    pub fn alloc_one(&self, zone: Zone, value: T) -> Result<Slab> {
        let slab = self.alloc(zone, 1)?;
        // SAFETY: freshly allocated, see `alloc_zeroed`.
        unsafe { self.write(slab, 0, value) };
        Ok(slab)
    }

    /// Elements still free in `zone`
    pub fn available(&self, zone: Zone) -> usize {
        self.zone(zone)
            .map(|z| z.capacity - z.offset.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Snapshot the offset of `zone`; it is restored when the guard drops
    pub fn scope(&self, zone: Zone) -> Result<ArenaScope<'_>> {
        let state = self.zone(zone)?;
        Ok(ArenaScope {
            offset: &state.offset,
            saved: state.offset.load(Ordering::Acquire),
        })
    }

    /// Scope over the local zone of thread `id`
    pub fn local_scope(&self, id: usize) -> Result<ArenaScope<'_>> {
        self.scope(Zone::Local(id))
    }

    fn cells(&self, slab: Slab) -> &[UnsafeCell<T>] {
        &self.storage[slab.start..slab.start + slab.len]
    }

    /// Copy out element `index` of `slab`
    ///
    /// # Safety
    ///
    /// No other thread may be writing this element concurrently.
    #[inline]
    pub unsafe fn read(&self, slab: Slab, index: usize) -> T {
        let cell = &self.cells(slab)[index];
        // SAFETY: caller excludes concurrent writers.
        unsafe { *cell.get() }
    }

    /// Store `value` into element `index` of `slab`
    ///
    /// # Safety
    ///
    /// No other thread may access this element concurrently.
    #[inline]
    pub unsafe fn write(&self, slab: Slab, index: usize, value: T) {
        let cell = &self.cells(slab)[index];
        // SAFETY: caller guarantees exclusive access to the element.
        unsafe { *cell.get() = value };
    }

    /// Shared view of `slab`
    ///
    /// # Safety
    ///
    /// No thread may write any element of `slab` while the view is alive.
    #[inline]
    pub unsafe fn slice(&self, slab: Slab) -> &[T] {
        let cells = self.cells(slab);
        // SAFETY: `UnsafeCell<T>` has the same layout as `T`, the caller
        // excludes writers for the lifetime of the view.
        unsafe { core::slice::from_raw_parts(cells.as_ptr() as *const T, cells.len()) }
    }

    /// Exclusive view of `slab`
    ///
    /// # Safety
    ///
    /// No other view of any element of `slab` may exist while this one is
    /// alive, on this thread or any other.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slice_mut(&self, slab: Slab) -> &mut [T] {
        let cells = self.cells(slab);
        // SAFETY: layout as in `slice`, exclusivity guaranteed by the caller.
        unsafe { core::slice::from_raw_parts_mut(UnsafeCell::raw_get(cells.as_ptr()), cells.len()) }
    }

    /// Exclusive view of `slab` through a unique borrow of the arena
    pub fn get_mut(&mut self, slab: Slab) -> &mut [T] {
        let cells = &mut self.storage[slab.start..slab.start + slab.len];
        // SAFETY: `&mut self` rules out every other view.
        unsafe {
            core::slice::from_raw_parts_mut(UnsafeCell::raw_get(cells.as_ptr()), cells.len())
        }
    }
}

/// Restores a zone offset on drop
pub struct ArenaScope<'a> {
    offset: &'a AtomicUsize,
    saved: usize,
}

impl Drop for ArenaScope<'_> {
    fn drop(&mut self) {
        self.offset.store(self.saved, Ordering::Release);
    }
}
