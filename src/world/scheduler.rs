use std::ops::Range;

/// Split of the moving set across background workers and the frame thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    pub chunk: usize,
    /// `worker_ranges[i]` is `[i * chunk, (i + 1) * chunk)`.
    pub worker_ranges: Vec<Range<usize>>,
    /// Remainder processed inline by the calling thread.
    pub inline: Range<usize>,
}

impl PartitionPlan {
    /// Plans `len` bodies over `workers` background threads plus the calling thread.
    pub fn new(len: usize, workers: usize) -> Self {
        let chunk = len / (workers + 1);
        let worker_ranges = (0..workers).map(|i| i * chunk..(i + 1) * chunk).collect();
        Self {
            chunk,
            worker_ranges,
            inline: workers * chunk..len,
        }
    }

    /// Partitions that actually contain bodies.
    pub fn active_partitions(&self) -> usize {
        self.worker_ranges.iter().filter(|r| !r.is_empty()).count()
            + usize::from(!self.inline.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_inline() {
        let plan = PartitionPlan::new(10, 2);
        assert_eq!(plan.chunk, 3);
        assert_eq!(plan.worker_ranges, vec![0..3, 3..6]);
        assert_eq!(plan.inline, 6..10);
        assert_eq!(plan.active_partitions(), 3);
    }

    #[test]
    fn fewer_bodies_than_threads() {
        let plan = PartitionPlan::new(2, 7);
        assert_eq!(plan.chunk, 0);
        assert!(plan.worker_ranges.iter().all(Range::is_empty));
        assert_eq!(plan.inline, 0..2);
        assert_eq!(plan.active_partitions(), 1);
    }

    #[test]
    fn ranges_cover_every_body_once() {
        for len in [0usize, 1, 31, 32, 33, 1000] {
            for workers in 0..9 {
                let plan = PartitionPlan::new(len, workers);
                let mut covered: Vec<usize> = plan
                    .worker_ranges
                    .iter()
                    .cloned()
                    .chain(std::iter::once(plan.inline.clone()))
                    .flatten()
                    .collect();
                covered.sort_unstable();
                assert_eq!(covered, (0..len).collect::<Vec<_>>());
            }
        }
    }
}
