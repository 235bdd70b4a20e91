use std::collections::VecDeque;
use crate::drivers::{DashboardError, Sample};
/// Rolling buffer that keeps the most recent samples for live plotting.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    max_points: usize,
}
impl SampleWindow {
    pub fn new(max_points: usize) -> Result<Self, DashboardError> {
        if max_points == 0 {
            return Err(DashboardError::InvalidWindowSize);
        }
        Ok(Self {
            samples: VecDeque::with_capacity(max_points),
            max_points,
        })
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Appends `sample`, evicting from the front once the bound is exceeded.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.max_points {
            self.samples.pop_front();
        }
    }
    /// Oldest-first copy of the current contents.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }
}
