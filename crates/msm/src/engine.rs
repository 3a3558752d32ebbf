//! Parallel MSM coordinator
//!
//! One call runs a single broadcast over the worker pool:
//!
//! 1. every thread decomposes its share of the inputs, materializes the
//!    signed points and counts digits per bucket
//! 2. the coordinator prefix-sums the counts, sizes the bucket array and the
//!    per-thread scratch zones, and publishes them
//! 3. every thread copies its points into their buckets
//! 4. every thread folds the buckets of its bucket range with batched affine
//!    additions, one batch per pass
//! 5. every thread reduces its bucket range to per-partition partials
//!
//! Threads meet at a barrier between phases and after every accumulation
//! pass. The caller sums the partials and runs the Horner combination.
//!
//! Scratch arenas belong to the context and outlive the call. Each call
//! scopes their zones on entry, so offsets are back at zero when it returns
//! and the next call reuses the storage, growing it only when too small.

use std::sync::{Mutex, OnceLock, PoisonError, RwLock};

use dmsm_api::{validate, CurveProjective, Error, GlvCurve, MsmScalar, Result};
use dmsm_internal::arith::lt_256;
use tracing::{debug, trace};

use crate::arena::{Arena, ArenaLayout, ArenaScope, Slab, Zone};
use crate::batch_add::{collect_pairs, BatchAdder};
use crate::bucket::{count_digits, expand, scatter, BucketBounds, BucketCounters, ExpandedPoint};
use crate::combine::{combine, sum_partials};
use crate::config::{AdditionMode, MsmConfig};
use crate::digit::WindowGeometry;
use crate::glv::GlvDecomposer;
use crate::pool::{partition_range, run_inline, ThreadContext, WorkerPool};
use crate::reduce::reduce_range;

type Partials<P> = Vec<(usize, P)>;

/// Scalars as field elements or as raw canonical limbs
#[derive(Clone, Copy)]
enum Scalars<'a, S> {
    Field(&'a [S]),
    Limbs(&'a [[u64; 4]]),
}

impl<S: MsmScalar> Scalars<'_, S> {
    fn len(&self) -> usize {
        match self {
            Scalars::Field(s) => s.len(),
            Scalars::Limbs(l) => l.len(),
        }
    }

    #[inline]
    fn limbs(&self, i: usize) -> [u64; 4] {
        match self {
            Scalars::Field(s) => s[i].to_canonical_limbs(),
            Scalars::Limbs(l) => l[i],
        }
    }
}

/// Bucket layout published by the coordinator after pass 1
struct Plan {
    bounds: BucketBounds,
    max_bucket: usize,
    buckets: Slab,
    pairs: usize,
}

fn scratch_poisoned() -> Error {
    Error::Processing {
        operation: "MsmContext::execute",
        details: "pairing scratch lock poisoned",
    }
}

/// Pairing buffers with one local zone per thread, sized once counts are
/// known
struct PairScratch<C: GlvCurve> {
    indices: Arena<u32>,
    prefix: Arena<C::Base>,
}

impl<C: GlvCurve> PairScratch<C> {
    fn new() -> Result<Self> {
        Ok(Self {
            indices: Arena::new(ArenaLayout::default())?,
            prefix: Arena::new(ArenaLayout::default())?,
        })
    }

    fn reserve(&mut self, threads: usize, pairs: usize) -> Result<bool> {
        let indices = self.indices.reserve(ArenaLayout {
            global: 0,
            local: 2 * pairs,
            threads,
        })?;
        let prefix = self.prefix.reserve(ArenaLayout {
            global: 0,
            local: pairs,
            threads,
        })?;
        Ok(indices || prefix)
    }

    /// Carve the buffers of thread `id` out of its local zones
    fn claim(&self, id: usize, pairs: usize) -> Result<PairSlots<'_, C::Base>> {
        let scopes = [self.indices.local_scope(id)?, self.prefix.local_scope(id)?];
        Ok(PairSlots {
            indices: &self.indices,
            prefix: &self.prefix,
            left: self.indices.alloc(Zone::Local(id), pairs)?,
            right: self.indices.alloc(Zone::Local(id), pairs)?,
            products: self.prefix.alloc(Zone::Local(id), pairs)?,
            _scopes: scopes,
        })
    }
}

/// One thread's pairing buffers; the local zones rewind when dropped
struct PairSlots<'s, B> {
    indices: &'s Arena<u32>,
    prefix: &'s Arena<B>,
    left: Slab,
    right: Slab,
    products: Slab,
    _scopes: [ArenaScope<'s>; 2],
}

/// Scratch arenas owned by a context and reused by every call
struct Workspace<C: GlvCurve> {
    expanded: Arena<ExpandedPoint<C>>,
    points: Arena<C>,
    pairs: RwLock<PairScratch<C>>,
}

impl<C: GlvCurve> Workspace<C> {
    fn new() -> Result<Self> {
        Ok(Self {
            expanded: Arena::new(ArenaLayout::default())?,
            points: Arena::new(ArenaLayout::default())?,
            pairs: RwLock::new(PairScratch::new()?),
        })
    }

    /// Grow the global zones for `n` inputs; every signed entry yields at
    /// most one bucket point per partition
    fn prepare(&mut self, n: usize, geometry: &WindowGeometry) -> Result<()> {
        let entries = 2 * n;
        let grew_expanded = self.expanded.reserve(ArenaLayout {
            global: entries,
            ..ArenaLayout::default()
        })?;
        let grew_points = self.points.reserve(ArenaLayout {
            global: entries * geometry.partitions,
            ..ArenaLayout::default()
        })?;
        if grew_expanded || grew_points {
            debug!(
                entries = self.expanded.layout().global,
                bucket_points = self.points.layout().global,
                "scratch arenas grown"
            );
        }
        Ok(())
    }
}

/// State shared by all threads of one call
struct Job<'a, C: GlvCurve> {
    geometry: WindowGeometry,
    mode: AdditionMode,
    bases: &'a [C],
    scalars: Scalars<'a, C::Scalar>,
    decomposer: &'a GlvDecomposer,
    workspace: &'a Workspace<C>,
    entries: Slab,
    counters: BucketCounters,
    plan: OnceLock<Result<Plan>>,
}

impl<'a, C: GlvCurve> Job<'a, C> {
    fn new(
        geometry: WindowGeometry,
        mode: AdditionMode,
        bases: &'a [C],
        scalars: Scalars<'a, C::Scalar>,
        decomposer: &'a GlvDecomposer,
        workspace: &'a Workspace<C>,
    ) -> Result<Self> {
        let entries = workspace.expanded.alloc(Zone::Global, 2 * bases.len())?;
        Ok(Self {
            geometry,
            mode,
            bases,
            scalars,
            decomposer,
            workspace,
            entries,
            counters: BucketCounters::new(geometry.total_buckets()),
            plan: OnceLock::new(),
        })
    }

    /// Everything one thread does during the broadcast.
    ///
    /// A failing phase does not skip later barriers; the error is reported
    /// once every barrier has been passed.
    fn run(&self, ctx: &ThreadContext<'_>) -> Result<Partials<C::Projective>> {
        let expanded = &self.workspace.expanded;
        let points = &self.workspace.points;
        let inputs = ctx.range(self.bases.len());
        let mine = self.entries.sub(2 * inputs.start..2 * inputs.end);

        // pass 1
        if let Ok(mine) = &mine {
            // SAFETY: entries are split by input range, each thread touches
            // only its own sub-slab for the whole call.
            let entries = unsafe { expanded.slice_mut(*mine) };
            for (j, i) in inputs.clone().enumerate() {
                let [a, b] = expand(self.decomposer, &self.bases[i], &self.scalars.limbs(i));
                entries[2 * j] = a;
                entries[2 * j + 1] = b;
            }
            let local_max = count_digits(&self.geometry, &self.counters, entries);
            self.counters.publish_max(local_max);
        }
        ctx.barrier();

        // pass 2
        let plan = match ctx.broadcast_from_main(&self.plan, || self.plan(ctx.threads())) {
            Ok(Ok(plan)) => plan,
            Ok(Err(e)) => return Err(e.clone()),
            Err(e) => return Err(e),
        };
        // pass 3
        if let Ok(mine) = &mine {
            // SAFETY: `entries` as in pass 1. Bucket slots are handed out by
            // the shared cursors and nothing reads the bucket array before
            // the next barrier.
            unsafe {
                let entries = expanded.slice(*mine);
                scatter(&self.geometry, &self.counters, entries, points, plan.buckets);
            }
        }
        ctx.barrier();

        let buckets = ctx.range(self.geometry.total_buckets());
        let span = plan.buckets.sub(plan.bounds.span(buckets.clone()));
        let mut status = mine.and(span.clone()).map(|_| ());

        // accumulation
        let id = ctx.id();
        let scratch = self.workspace.pairs.read().map_err(|_| scratch_poisoned());
        let slots = match &scratch {
            Ok(scratch) => scratch.claim(id, plan.pairs),
            Err(e) => Err(e.clone()),
        };
        if let Err(e) = &slots {
            status = status.and(Err(e.clone()));
        }

        let mut adder = BatchAdder::new(self.mode);
        let mut m = 1;
        while m < plan.max_bucket {
            if let (true, Ok(span), Ok(slots)) = (status.is_ok(), &span, &slots) {
                // SAFETY: bucket ranges, and so bucket array spans, are
                // disjoint between threads; local zones belong to `id`.
                let (bucket_points, left, right, products) = unsafe {
                    (
                        points.slice_mut(*span),
                        slots.indices.slice_mut(slots.left),
                        slots.indices.slice_mut(slots.right),
                        slots.prefix.slice_mut(slots.products),
                    )
                };
                let n = collect_pairs(&plan.bounds, buckets.clone(), m, left, right);
                trace!(thread = id, distance = m, pairs = n, "accumulation pass");
                status = adder.add_pairs(bucket_points, &left[..n], &right[..n], &mut products[..n]);
            }
            ctx.barrier();
            m *= 2;
        }
        if adder.is_degraded() {
            debug!(thread = id, "thread finished in checked mode");
        }
        drop(slots);

        // reduction
        status?;
        let span = span?;
        // SAFETY: accumulation is over on every thread.
        let bucket_points = unsafe { points.slice(span) };
        Ok(reduce_range(&self.geometry, &plan.bounds, buckets, bucket_points))
    }

    /// Pass 2, coordinator only; the other threads wait at the barrier and
    /// hold no pairing scratch
    fn plan(&self, threads: usize) -> Result<Plan> {
        let bounds = self.counters.prefix_sum()?;
        let max_bucket = self.counters.max_bucket() as usize;
        debug_assert_eq!(max_bucket, bounds.max_bucket());

        let buckets = self.workspace.points.alloc(Zone::Global, bounds.total())?;

        let total_buckets = self.geometry.total_buckets();
        let pairs = (0..threads)
            .map(|t| bounds.first_pass_pairs(partition_range(total_buckets, t, threads)))
            .max()
            .unwrap_or(0);
        let grown = self
            .workspace
            .pairs
            .write()
            .map_err(|_| scratch_poisoned())?
            .reserve(threads, pairs)?;

        debug!(
            entries = bounds.total(),
            max_bucket,
            pairs,
            grown,
            "bucket assignment planned"
        );
        Ok(Plan {
            bounds,
            max_bucket,
            buckets,
            pairs,
        })
    }
}

/// Multi-scalar multiplication over a GLV curve, backed by a worker pool
pub struct MsmContext<C: GlvCurve> {
    decomposer: GlvDecomposer,
    pool: WorkerPool,
    config: MsmConfig,
    workspace: Mutex<Workspace<C>>,
}

impl<C: GlvCurve> MsmContext<C> {
    /// Context running on `pool` with `config`
    pub fn new(pool: WorkerPool, config: MsmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            decomposer: GlvDecomposer::for_curve::<C>(),
            pool,
            config,
            workspace: Mutex::new(Workspace::new()?),
        })
    }

    /// Context with a fresh pool of `threads` workers and default settings
    pub fn with_threads(threads: usize) -> Result<Self> {
        Self::new(WorkerPool::start(threads)?, MsmConfig::default())
    }

    /// Current configuration
    pub fn config(&self) -> &MsmConfig {
        &self.config
    }

    /// Worker thread count
    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    /// Scalar decomposer in use
    pub fn decomposer(&self) -> &GlvDecomposer {
        &self.decomposer
    }

    /// Give the worker pool back
    pub fn into_pool(self) -> WorkerPool {
        self.pool
    }

    /// `Σ scalars[i]·bases[i]` in the configured addition mode
    pub fn msm(&self, scalars: &[C::Scalar], bases: &[C]) -> Result<C::Projective> {
        self.execute(Scalars::Field(scalars), bases, self.config.mode)
    }

    /// `Σ scalars[i]·bases[i]` with unchecked bucket additions.
    ///
    /// Intended for inputs where no two bucket entries share an x
    /// coordinate, such as distinct random bases. Collisions are still
    /// detected per batch and handled with checked additions, at the cost
    /// of recomputing that batch.
    pub fn msm_unchecked(&self, scalars: &[C::Scalar], bases: &[C]) -> Result<C::Projective> {
        self.execute(Scalars::Field(scalars), bases, AdditionMode::Unchecked)
    }

    /// `Σ scalars[i]·bases[i]` for scalars given as canonical little-endian
    /// limbs; every value must be below the group order
    pub fn msm_limbs(&self, scalars: &[[u64; 4]], bases: &[C]) -> Result<C::Projective> {
        let modulus = &self.decomposer.parameters().modulus;
        validate::parameter(
            scalars.iter().all(|s| lt_256(s, modulus)),
            "scalars",
            "value is not below the group order",
        )?;
        self.execute(Scalars::Limbs(scalars), bases, self.config.mode)
    }

    #[tracing::instrument(skip_all, name = "MsmContext::execute", fields(points = bases.len()))]
    fn execute(
        &self,
        scalars: Scalars<'_, C::Scalar>,
        bases: &[C],
        mode: AdditionMode,
    ) -> Result<C::Projective> {
        validate::length("scalars", scalars.len(), bases.len())?;
        let n = bases.len();
        if n == 0 {
            return Ok(C::Projective::identity());
        }

        let geometry = WindowGeometry::new(self.decomposer.half_bits(), self.config.window_for(n))?;
        let entries = (2 * n as u128) * geometry.partitions as u128;
        if entries > u32::MAX as u128 {
            return Err(Error::param(
                "points",
                "too many inputs for 32-bit bucket offsets",
            ));
        }

        let sequential = n < self.config.parallel_threshold;
        let threads = if sequential { 1 } else { self.pool.threads() };
        debug!(
            window = geometry.window,
            partitions = geometry.partitions,
            buckets = geometry.buckets_per_partition,
            ?mode,
            threads,
            "window geometry"
        );

        let mut workspace = self.workspace.lock().unwrap_or_else(PoisonError::into_inner);
        workspace.prepare(n, &geometry)?;
        let workspace = &*workspace;
        let _entries_scope = workspace.expanded.scope(Zone::Global)?;
        let _points_scope = workspace.points.scope(Zone::Global)?;

        let job = Job::new(geometry, mode, bases, scalars, &self.decomposer, workspace)?;
        let results = if sequential {
            vec![run_inline(|ctx| job.run(ctx))]
        } else {
            self.pool.run(|ctx| job.run(ctx))
        };

        let partials = results.into_iter().collect::<Result<Vec<_>>>()?;
        let sums = sum_partials(geometry.partitions, partials.into_iter().flatten());
        Ok(combine(&sums, geometry.window))
    }
}

impl<C: GlvCurve> core::fmt::Debug for MsmContext<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MsmContext")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish()
    }
}
