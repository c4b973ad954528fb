//! Job table

use dashmap::DashMap;

use hw_core::{Job, JobId, ScanReport};

/// Storage for job records
///
/// Every mutation is a read-modify-write on one record and must be atomic
/// with respect to other mutations of that record. Mutations of terminal
/// jobs are refused.
pub trait JobStore: Send + Sync {
    /// Add a new job record
    fn insert(&self, job: Job);

    /// Copy of a job record
    fn get(&self, id: &JobId) -> Option<Job>;

    /// Raise a running job's progress; false if refused
    fn set_progress(&self, id: &JobId, percent: u8) -> bool;

    /// Move a running job to `Completed`
    fn complete(&self, id: &JobId, report: ScanReport) -> bool;

    /// Move a running job to `Errored`
    fn fail(&self, id: &JobId, error: String, partial: Option<ScanReport>) -> bool;

    /// Number of jobs held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local job table
///
/// Jobs live until the process exits.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    fn update(&self, id: &JobId, f: impl FnOnce(&mut Job) -> bool) -> bool {
        match self.jobs.get_mut(id) {
            Some(mut job) => f(&mut job),
            None => false,
        }
    }
}

impl JobStore for InMemoryJobStore {
    fn insert(&self, job: Job) {
        self.jobs.insert(job.id.clone(), job);
    }

    fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.get(id).map(|r| r.clone())
    }

    fn set_progress(&self, id: &JobId, percent: u8) -> bool {
        self.update(id, |job| job.set_progress(percent))
    }

    fn complete(&self, id: &JobId, report: ScanReport) -> bool {
        self.update(id, |job| job.complete(report))
    }

    fn fail(&self, id: &JobId, error: String, partial: Option<ScanReport>) -> bool {
        self.update(id, |job| job.fail(error, partial))
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_core::JobState;

    fn store_with_job() -> (InMemoryJobStore, JobId) {
        let store = InMemoryJobStore::new();
        let id = JobId::generate();
        store.insert(Job::new(id.clone()));
        (store, id)
    }

    #[test]
    fn test_progress_updates() {
        let (store, id) = store_with_job();
        assert!(store.set_progress(&id, 40));
        assert!(!store.set_progress(&id, 10));
        assert_eq!(store.get(&id).unwrap().progress, 40);
    }

    #[test]
    fn test_unknown_job_is_ignored() {
        let store = InMemoryJobStore::new();
        let id = JobId::new("missing");
        assert!(!store.set_progress(&id, 50));
        assert!(!store.complete(&id, ScanReport::new()));
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_terminal_jobs_are_frozen() {
        let (store, id) = store_with_job();
        assert!(store.complete(&id, ScanReport::new()));
        assert!(!store.set_progress(&id, 50));
        assert!(!store.fail(&id, "late".to_string(), None));

        let job = store.get(&id).unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.progress, 100);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_concurrent_progress_never_decreases() {
        let (store, id) = store_with_job();
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = std::sync::Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || {
                    for pct in (t..100).step_by(4) {
                        store.set_progress(&id, pct as u8);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(store.get(&id).unwrap().progress >= 96);
    }
}
