use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::JoinHandle;

use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Condvar, Mutex};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::compositor::inputs::ChartInputs;
use crate::compositor::snapshot::{
    BasalGeometry, ChartGeometry, GeometrySubset, GlucoseGeometry, PublishedSubset,
    SubsetGeometry, SubsetState,
};
use crate::core::axis::{glucose_axis_labels, grid_line_ys, hour_marks};
use crate::core::basal::{
    effective_rate_breakpoints, project_basal_staircase, schedule_rate_breakpoints,
};
use crate::core::layout::ChartLayout;
use crate::core::primitives::decimal_to_f64;
use crate::core::projectors::{
    project_carb_dots, project_dose_dots, project_glucose_dots, project_prediction_dots,
};
use crate::core::targets::project_temp_target_bands;
use crate::core::types::Viewport;
use crate::error::ChartResult;

/// Computes one subset's geometry from a fixed input bundle.
///
/// Pure and synchronization-free: safe to run on any worker, and the basis
/// for the scheduler's idempotent last-completed-wins publishing.
pub fn compute_subset(
    subset: GeometrySubset,
    inputs: &ChartInputs,
    viewport: Viewport,
    layout: ChartLayout,
) -> ChartResult<SubsetGeometry> {
    let mapper = inputs.mapper(viewport, layout)?;

    match subset {
        GeometrySubset::BasalPath => {
            let window = inputs.basal_window()?;
            let max_basal = decimal_to_f64(inputs.max_basal, "max basal")?;
            let effective = effective_rate_breakpoints(
                &inputs.basal_profile,
                &inputs.temp_basals,
                window,
                inputs.schedule_offset,
            )?;
            let scheduled =
                schedule_rate_breakpoints(&inputs.basal_profile, window, inputs.schedule_offset)?;
            Ok(SubsetGeometry::Basal(BasalGeometry {
                effective_path: project_basal_staircase(&effective, window.end, &mapper, max_basal)?,
                scheduled_path: project_basal_staircase(&scheduled, window.end, &mapper, max_basal)?,
            }))
        }
        GeometrySubset::GlucoseDots => {
            let y_range = mapper.glucose_y_range();
            let last_event = inputs.last_sample_secs().unwrap_or_else(|| inputs.now_secs());
            Ok(SubsetGeometry::Glucose(GlucoseGeometry {
                dots: project_glucose_dots(&inputs.glucose, &mapper),
                y_range,
                grid_line_ys: grid_line_ys(y_range, layout.grid_line_count),
                axis_labels: glucose_axis_labels(y_range, layout.grid_line_count, inputs.units),
                hour_marks: hour_marks(&mapper),
                canvas_width: mapper.canvas_width(
                    last_event,
                    inputs.predictions.as_ref(),
                    inputs.delivered_at_secs(),
                ),
            }))
        }
        GeometrySubset::BolusDots => Ok(SubsetGeometry::Dots(project_dose_dots(
            &inputs.boluses,
            &inputs.glucose,
            &mapper,
        )?)),
        GeometrySubset::CarbDots => Ok(SubsetGeometry::Dots(project_carb_dots(
            &inputs.carbs,
            &inputs.glucose,
            &mapper,
        )?)),
        GeometrySubset::TempTargetBands => Ok(SubsetGeometry::Bands(project_temp_target_bands(
            &inputs.temp_targets,
            &mapper,
        ))),
        GeometrySubset::PredictionDots(kind) => {
            match (inputs.predictions.as_ref(), inputs.delivered_at_secs()) {
                (Some(series), Some(delivered_at)) => Ok(SubsetGeometry::PredictionDots(
                    project_prediction_dots(kind, series, delivered_at, &mapper),
                )),
                _ => Ok(SubsetGeometry::PredictionDots(Vec::new())),
            }
        }
    }
}

struct SubsetSlot {
    current: ArcSwap<PublishedSubset>,
    /// Sequence of the currently published result; guards publish ordering.
    publish_gate: Mutex<u64>,
    next_seq: AtomicU64,
    in_flight: AtomicUsize,
}

impl SubsetSlot {
    fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(PublishedSubset::default()),
            publish_gate: Mutex::new(0),
            next_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }
}

struct Shared {
    slots: [SubsetSlot; 9],
    pending: Mutex<usize>,
    idle: Condvar,
}

impl Shared {
    fn slot(&self, subset: GeometrySubset) -> &SubsetSlot {
        &self.slots[subset.index()]
    }

    fn job_started(&self) {
        *self.pending.lock() += 1;
    }

    fn job_finished(&self) {
        let mut pending = self.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

struct Job {
    subset: GeometrySubset,
    seq: u64,
    inputs: Arc<ChartInputs>,
    viewport: Viewport,
    layout: ChartLayout,
}

/// Background recompute scheduler publishing per-subset geometry snapshots.
///
/// Triggers enqueue one job per affected subset on a shared worker pool.
/// Publication is a single atomic replace guarded by a per-subset monotonic
/// sequence: a completion older than what is already published is discarded,
/// so out-of-order completions can never roll a subset backwards. Readers
/// are lock-free and never observe a torn snapshot.
pub struct Compositor {
    shared: Arc<Shared>,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl Compositor {
    /// Starts a compositor with `worker_count` background workers
    /// (a minimum of one is enforced).
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        let shared = Arc::new(Shared {
            slots: [
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
                SubsetSlot::new(),
            ],
            pending: Mutex::new(0),
            idle: Condvar::new(),
        });

        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..worker_count.max(1))
            .map(|_| {
                let shared = Arc::clone(&shared);
                let receiver: Receiver<Job> = receiver.clone();
                std::thread::spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        run_job(&shared, job);
                    }
                })
            })
            .collect();

        Self {
            shared,
            sender: Some(sender),
            workers,
        }
    }

    /// Schedules recomputation of the given subsets against one consistent
    /// input bundle. Returns immediately; results publish asynchronously.
    pub fn trigger(
        &self,
        subsets: &[GeometrySubset],
        inputs: &Arc<ChartInputs>,
        viewport: Viewport,
        layout: ChartLayout,
    ) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };

        let batch: SmallVec<[GeometrySubset; 9]> = subsets.iter().copied().collect();
        for subset in batch {
            let slot = self.shared.slot(subset);
            let seq = slot.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
            slot.in_flight.fetch_add(1, Ordering::SeqCst);
            self.shared.job_started();

            let job = Job {
                subset,
                seq,
                inputs: Arc::clone(inputs),
                viewport,
                layout,
            };
            if sender.send(job).is_err() {
                slot.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.shared.job_finished();
            }
        }
    }

    /// Schedules every subset, e.g. on first layout or a full data refresh.
    pub fn trigger_all(&self, inputs: &Arc<ChartInputs>, viewport: Viewport, layout: ChartLayout) {
        self.trigger(&GeometrySubset::ALL, inputs, viewport, layout);
    }

    /// Lock-free read of a subset's currently published snapshot.
    #[must_use]
    pub fn current(&self, subset: GeometrySubset) -> Arc<PublishedSubset> {
        self.shared.slot(subset).current.load_full()
    }

    /// Collects the currently published snapshot of every subset.
    #[must_use]
    pub fn geometry(&self) -> ChartGeometry {
        let subsets = GeometrySubset::ALL
            .iter()
            .map(|subset| (*subset, self.current(*subset)))
            .collect();
        ChartGeometry::new(subsets)
    }

    #[must_use]
    pub fn state(&self, subset: GeometrySubset) -> SubsetState {
        let slot = self.shared.slot(subset);
        if slot.in_flight.load(Ordering::SeqCst) > 0 {
            return SubsetState::Computing;
        }
        if self.current(subset).seq > 0 {
            return SubsetState::Published;
        }
        SubsetState::Idle
    }

    /// Blocks until every enqueued job has completed. Test support; the
    /// interactive path never calls this.
    pub fn wait_idle(&self) {
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            self.shared.idle.wait(&mut pending);
        }
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn run_job(shared: &Shared, job: Job) {
    let geometry = match compute_subset(job.subset, &job.inputs, job.viewport, job.layout) {
        Ok(geometry) => geometry,
        Err(err) => {
            // No failed state: degraded inputs publish empty geometry.
            warn!(
                subset = job.subset.label(),
                error = %err,
                "subset computation degraded to empty geometry"
            );
            SubsetGeometry::Empty
        }
    };

    let slot = shared.slot(job.subset);
    {
        let mut published_seq = slot.publish_gate.lock();
        if job.seq < *published_seq {
            debug!(
                subset = job.subset.label(),
                seq = job.seq,
                published = *published_seq,
                "discarding stale completion"
            );
        } else {
            *published_seq = job.seq;
            slot.current.store(Arc::new(PublishedSubset {
                seq: job.seq,
                geometry,
            }));
        }
    }

    slot.in_flight.fetch_sub(1, Ordering::SeqCst);
    shared.job_finished();
}
