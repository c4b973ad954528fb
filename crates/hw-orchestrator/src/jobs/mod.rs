//! Job lifecycle: the job table and the manager that runs jobs

mod manager;
mod store;

pub use manager::JobManager;
pub use store::{InMemoryJobStore, JobStore};
