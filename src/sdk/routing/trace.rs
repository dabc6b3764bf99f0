//! Batched speed annotation of a decoded route shape.
//!
//! The annotation endpoint only accepts bounded-size shapes, so a long route is split into
//! contiguous batches, each batch is sent on its own, and the per-edge speeds in every
//! response are mapped back onto that batch's points. Results are merged in batch order.

use super::coord::Coord;
use super::error::TransportError;
use super::provider::types::{Edge, TraceAttributesResponse};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Maximum number of points per annotation request.
    pub batch_size: NonZeroUsize,
    /// Number of annotation requests allowed in flight at once. `1` runs strictly in order.
    pub max_in_flight: NonZeroUsize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_in_flight: NonZeroUsize::MIN,
        }
    }
}

/// Which response field a sample's speed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedSource {
    PostedLimit,
    Observed,
    Unknown,
}

impl SpeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedSource::PostedLimit => "posted_limit",
            SpeedSource::Observed => "observed",
            SpeedSource::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SpeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub coord: Coord,
    pub speed: Option<f64>,
    pub source: SpeedSource,
}

/// A batch whose request failed and was left out of the result.
#[derive(Debug)]
pub struct BatchFailure {
    pub batch_index: usize,
    /// Index into the full shape of the batch's first point.
    pub first_point: usize,
    pub len: usize,
    pub error: TransportError,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {} (points {}..{}): {}",
            self.batch_index,
            self.first_point,
            self.first_point + self.len,
            self.error
        )
    }
}

#[derive(Debug, Default)]
pub struct AnnotatedRoute {
    pub samples: Vec<SpeedSample>,
    pub failures: Vec<BatchFailure>,
}

impl AnnotatedRoute {
    /// True when every batch was annotated.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits `shape` into contiguous, non-overlapping slices of at most `batch_size` points.
pub fn partition(shape: &[Coord], batch_size: NonZeroUsize) -> Vec<&[Coord]> {
    shape.chunks(batch_size.get()).collect()
}

/// Posted limit when present, otherwise the observed speed.
pub fn edge_speed(edge: &Edge) -> (Option<f64>, SpeedSource) {
    match (edge.speed_limit, edge.speed) {
        (Some(limit), _) => (Some(limit), SpeedSource::PostedLimit),
        (None, Some(speed)) => (Some(speed), SpeedSource::Observed),
        (None, None) => (None, SpeedSource::Unknown),
    }
}

/// Maps every edge's inclusive, batch-local index range onto the batch's points.
///
/// Indices past the end of the batch are dropped. Overlapping edges each emit their own
/// sample for the shared index.
pub fn extract_speed_samples(response: &TraceAttributesResponse, batch: &[Coord]) -> Vec<SpeedSample> {
    let mut samples = Vec::with_capacity(batch.len());

    for edge in &response.edges {
        let begin = edge.begin_shape_index;
        let end = edge.end_shape_index.saturating_add(1).min(batch.len());
        if begin >= end {
            log::trace!(
                "Skipping edge with range {}..={} outside batch of {}",
                edge.begin_shape_index,
                edge.end_shape_index,
                batch.len()
            );
            continue;
        }

        let (speed, source) = edge_speed(edge);
        samples.extend(batch[begin..end].iter().map(|&coord| SpeedSample {
            coord,
            speed,
            source,
        }));
    }

    samples
}

/// Annotates `shape` with speeds, issuing one `request_fn` call per batch.
///
/// A failed batch contributes no samples and is recorded in
/// [`AnnotatedRoute::failures`]; the remaining batches are unaffected. Samples are always
/// ordered by batch, then by position inside the batch, whatever `max_in_flight` is.
pub fn annotate<F>(shape: &[Coord], config: &TraceConfig, request_fn: F) -> AnnotatedRoute
where
    F: Fn(&[Coord]) -> Result<TraceAttributesResponse, TransportError> + Sync,
{
    let batches = partition(shape, config.batch_size);
    log::info!(
        "Annotating {} points in {} batches of up to {}",
        shape.len(),
        batches.len(),
        config.batch_size
    );

    let run_batch = |batch: &&[Coord]| -> Result<Vec<SpeedSample>, TransportError> {
        let response = request_fn(*batch)?;
        Ok(extract_speed_samples(&response, *batch))
    };

    let in_flight = config.max_in_flight.get().min(batches.len());
    let outcomes: Vec<Result<Vec<SpeedSample>, TransportError>> = if in_flight <= 1 {
        batches.iter().map(run_batch).collect()
    } else {
        match ThreadPoolBuilder::new().num_threads(in_flight).build() {
            Ok(pool) => pool.install(|| batches.par_iter().map(run_batch).collect()),
            Err(e) => {
                log::warn!("Could not start {} request threads, running in order: {}", in_flight, e);
                batches.iter().map(run_batch).collect()
            }
        }
    };

    let mut route = AnnotatedRoute::default();
    for (batch_index, (batch, outcome)) in batches.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(samples) => {
                if samples.is_empty() {
                    log::warn!("Batch {} returned no usable speed data", batch_index);
                }
                log::debug!(
                    "Batch {}/{} produced {} samples",
                    batch_index + 1,
                    batches.len(),
                    samples.len()
                );
                route.samples.extend(samples);
            }
            Err(error) => {
                let failure = BatchFailure {
                    batch_index,
                    first_point: batch_index * config.batch_size.get(),
                    len: batch.len(),
                    error,
                };
                log::warn!("Skipping {}", failure);
                route.failures.push(failure);
            }
        }
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn line(n: usize) -> Vec<Coord> {
        (0..n).map(|i| Coord::new(i as f64, 0.5)).collect()
    }

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn edge(begin: usize, end: usize, speed_limit: Option<f64>, speed: Option<f64>) -> Edge {
        Edge {
            begin_shape_index: begin,
            end_shape_index: end,
            speed_limit,
            speed,
        }
    }

    // One single-point edge per coordinate, using the longitude as the speed limit.
    fn per_point_response(batch: &[Coord]) -> TraceAttributesResponse {
        TraceAttributesResponse {
            edges: batch
                .iter()
                .enumerate()
                .map(|(i, c)| edge(i, i, Some(c.lon), None))
                .collect(),
        }
    }

    #[test]
    fn test_partition_reproduces_shape() {
        for n in 0..=23 {
            let shape = line(n);
            for b in 1..=7 {
                let batches = partition(&shape, nz(b));
                assert_eq!(batches.len(), n.div_ceil(b), "n={} b={}", n, b);
                assert!(batches.iter().all(|batch| !batch.is_empty() && batch.len() <= b));
                let joined: Vec<Coord> = batches.concat();
                assert_eq!(joined, shape);
            }
        }
    }

    #[test]
    fn test_extract_maps_inclusive_ranges() {
        let batch = line(6);
        let response = TraceAttributesResponse {
            edges: vec![
                edge(0, 2, Some(30.0), Some(41.0)),
                edge(3, 4, None, Some(52.5)),
                edge(5, 5, None, None),
            ],
        };

        let samples = extract_speed_samples(&response, &batch);
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0].speed, Some(30.0));
        assert_eq!(samples[2].source, SpeedSource::PostedLimit);
        assert_eq!(samples[3].speed, Some(52.5));
        assert_eq!(samples[4].source, SpeedSource::Observed);
        assert_eq!(samples[5].speed, None);
        assert_eq!(samples[5].source, SpeedSource::Unknown);
        for (sample, coord) in samples.iter().zip(&batch) {
            assert_eq!(sample.coord, *coord);
        }
    }

    #[test]
    fn test_extract_clips_out_of_bounds_and_keeps_overlaps() {
        let batch = line(4);
        let response = TraceAttributesResponse {
            edges: vec![
                edge(0, 1, Some(25.0), None),
                edge(1, 9, Some(35.0), None),
                edge(7, 8, Some(45.0), None),
                edge(3, 2, Some(55.0), None),
            ],
        };

        let samples = extract_speed_samples(&response, &batch);
        let speeds: Vec<Option<f64>> = samples.iter().map(|s| s.speed).collect();
        assert_eq!(
            speeds,
            vec![Some(25.0), Some(25.0), Some(35.0), Some(35.0), Some(35.0)]
        );
        assert_eq!(samples[1].coord, samples[2].coord);
    }

    #[test]
    fn test_annotate_preserves_global_order() {
        let shape = line(250);
        let route = annotate(&shape, &TraceConfig::default(), |batch| Ok(per_point_response(batch)));

        assert!(route.is_complete());
        assert_eq!(route.samples.len(), 250);
        for (i, sample) in route.samples.iter().enumerate() {
            assert_eq!(sample.coord, shape[i]);
            assert_eq!(sample.speed, Some(i as f64));
        }
    }

    #[test]
    fn test_annotate_isolates_failed_batch() {
        let shape = line(25);
        let config = TraceConfig {
            batch_size: nz(10),
            ..TraceConfig::default()
        };
        let calls = AtomicUsize::new(0);

        let route = annotate(&shape, &config, |batch| {
            calls.fetch_add(1, Ordering::SeqCst);
            if batch[0].lon == 10.0 {
                Err(TransportError::RawApi {
                    status: 504,
                    body: "timed out".to_string(),
                })
            } else {
                Ok(per_point_response(batch))
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(route.samples.len(), 15);
        let lons: Vec<f64> = route.samples.iter().map(|s| s.coord.lon).collect();
        let expected: Vec<f64> = (0..10).chain(20..25).map(|i| i as f64).collect();
        assert_eq!(lons, expected);

        assert_eq!(route.failures.len(), 1);
        let failure = &route.failures[0];
        assert_eq!(failure.batch_index, 1);
        assert_eq!(failure.first_point, 10);
        assert_eq!(failure.len, 10);
        assert!(matches!(failure.error, TransportError::RawApi { status: 504, .. }));
    }

    #[test]
    fn test_annotate_parallel_matches_sequential() {
        let shape = line(97);
        let sequential = TraceConfig {
            batch_size: nz(8),
            max_in_flight: nz(1),
        };
        let parallel = TraceConfig {
            max_in_flight: nz(4),
            ..sequential
        };
        let request = |batch: &[Coord]| {
            if batch[0].lon == 40.0 {
                Err(TransportError::RawApi {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(per_point_response(batch))
            }
        };

        let a = annotate(&shape, &sequential, request);
        let b = annotate(&shape, &parallel, request);
        assert_eq!(a.samples, b.samples);
        assert_eq!(b.failures.len(), 1);
        assert_eq!(b.failures[0].batch_index, 5);
    }

    #[test]
    fn test_annotate_empty_shape_issues_no_requests() {
        let calls = AtomicUsize::new(0);
        let route = annotate(&[], &TraceConfig::default(), |batch| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(per_point_response(batch))
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(route.samples.is_empty());
        assert!(route.is_complete());
    }

    #[test]
    fn test_annotate_batch_without_edges_contributes_nothing() {
        let shape = line(5);
        let route = annotate(&shape, &TraceConfig::default(), |_| {
            Ok(TraceAttributesResponse::default())
        });
        assert!(route.samples.is_empty());
        assert!(route.is_complete());
    }
}
