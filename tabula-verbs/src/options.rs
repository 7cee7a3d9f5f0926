/// Default number of groups from which grouped evaluation is spread over the rayon pool.
pub const DEFAULT_MIN_PARALLEL_GROUPS: usize = 64;

/// Describes how the per-group evaluation of a verb is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Evaluate groups one after the other on the calling thread.
    Serial,
    /// Evaluate groups on the global rayon pool once there are at least `min_groups` of them.
    Threaded { min_groups: usize },
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::Threaded {
            min_groups: DEFAULT_MIN_PARALLEL_GROUPS,
        }
    }
}

/// Options shared by every verb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub parallelism: Parallelism,
}

impl ExecutionOptions {
    pub fn serial() -> Self {
        Self {
            parallelism: Parallelism::Serial,
        }
    }

    /// Evaluate groups in parallel once there are at least `min_groups` of them.
    pub fn with_min_parallel_groups(mut self, min_groups: usize) -> Self {
        self.parallelism = Parallelism::Threaded { min_groups };
        self
    }

    pub(crate) fn is_parallel(&self, groups: usize) -> bool {
        match self.parallelism {
            Parallelism::Serial => false,
            Parallelism::Threaded { min_groups } => groups > 1 && groups >= min_groups,
        }
    }
}

/// Options for [`arrange`](crate::arrange_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrangeOptions {
    /// Sort by the grouping columns first, so each group's rows become contiguous.
    pub by_group: bool,
}

impl ArrangeOptions {
    pub fn by_group() -> Self {
        Self { by_group: true }
    }
}
