//! `JobStore`: "Set of background jobs, each an ordered list of
//! process IDs with a status (running, stopped, done) and a recorded command
//! line."
//!
//! Grounded on `yash-env/src/job.rs`'s `Job`/`JobSet`, narrowed to what the
//! core needs: the teacher's `Job` carries a `nix::unistd::Pid` and a
//! `nix::sys::wait::WaitStatus` because `yash-env` owns the real `wait(2)`
//! call. Process identity and status here are plain data the `Spawner`
//! callback (§6) reports back through, so `Pid` is a bare `i32` and
//! `JobStatus` only distinguishes the three states the spec names; neither
//! `nix` nor `libc` is a dependency of this crate.

use slab::Slab;

/// A process ID as reported by the injected [`crate::callbacks::Spawner`].
pub type Pid = i32;

/// Job identifier (spec: jobs are referred to by an index, e.g. `%1`).
pub type JobId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
    Running,
    Stopped,
    /// Exited or killed by a signal; carries the translated exit status
    ///.
    Done(i32),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    pub pids: Vec<Pid>,
    pub status: JobStatus,
    pub command_line: String,
}

impl Job {
    pub fn new(pids: Vec<Pid>, command_line: impl Into<String>) -> Self {
        Job {
            pids,
            status: JobStatus::Running,
            command_line: command_line.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, JobStatus::Done(_))
    }
}

#[derive(Clone, Debug, Default)]
pub struct JobStore {
    jobs: Slab<Job>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, job: Job) -> JobId {
        self.jobs.insert(job)
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        if self.jobs.contains(id) {
            Some(self.jobs.remove(id))
        } else {
            None
        }
    }

    pub fn set_status(&mut self, id: JobId, status: JobStatus) {
        if let Some(job) = self.jobs.get_mut(id) {
            job.status = status;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobId, &Job)> {
        self.jobs.iter()
    }

    /// Removes every job whose status is `Done`, as the `wait` builtin does
    /// once it has reported a job's final status.
    pub fn reap_done(&mut self) {
        let done: Vec<JobId> = self
        .jobs
        .iter()
        .filter(|(_, j)| j.is_done())
        .map(|(id, _)| id)
        .collect();
        for id in done {
            self.jobs.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_update_status() {
        let mut store = JobStore::new();
        let id = store.add(Job::new(vec![42], "sleep 1 &"));
        assert_eq!(store.get(id).unwrap().status, JobStatus::Running);
        store.set_status(id, JobStatus::Done(0));
        assert!(store.get(id).unwrap().is_done());
    }

    #[test]
    fn reap_only_removes_done() {
        let mut store = JobStore::new();
        let running = store.add(Job::new(vec![1], "a &"));
        let done = store.add(Job::new(vec![2], "b &"));
        store.set_status(done, JobStatus::Done(0));
        store.reap_done();
        assert!(store.get(running).is_some());
        assert!(store.get(done).is_none());
    }
}
