use std::sync::{Arc, Mutex};
use std::time::Duration;

use testlane::backend::{
    FailedQueue, JobHandle, Kwargs, QueueView, SchedulerBackend, CRON_META_KEY,
};
use testlane::errors::{Result, TestlaneError};

/// One `register_recurring` call as observed by the backend.
#[derive(Debug, Clone)]
pub struct Registration {
    pub cron: String,
    pub callback: String,
    pub queue: String,
    pub timeout: Option<Duration>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    scheduled: Vec<JobHandle>,
    queued: Vec<JobHandle>,
    failed: Vec<JobHandle>,
    registrations: Vec<Registration>,
    /// When set, `enqueue_now` binds new jobs to this lane instead of the
    /// requested queue, to exercise the coordinator's routing invariant.
    misroute_lane: Option<String>,
}

/// An in-memory scheduler backend that:
/// - records every `register_recurring` call
/// - keeps scheduled / queued / failed jobs in plain vectors
/// - can be seeded with arbitrary entries and told to misroute enqueues.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `enqueue_now` bind its job to `lane`,
    /// regardless of the queue asked for.
    pub fn misroute_enqueues_to(&self, lane: &str) {
        self.state.lock().unwrap().misroute_lane = Some(lane.to_string());
    }

    pub fn seed_scheduled(&self, job: JobHandle) {
        self.state.lock().unwrap().scheduled.push(job);
    }

    pub fn seed_queued(&self, job: JobHandle) {
        self.state.lock().unwrap().queued.push(job);
    }

    pub fn seed_failed(&self, job: JobHandle) {
        self.state.lock().unwrap().failed.push(job);
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.state.lock().unwrap().registrations.clone()
    }

    pub fn scheduled_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.scheduled.iter().map(|j| j.id.clone()).collect()
    }

    pub fn queued_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.queued.iter().map(|j| j.id.clone()).collect()
    }

    pub fn failed_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.failed.iter().map(|j| j.id.clone()).collect()
    }

    fn fresh_id(state: &mut State) -> String {
        state.next_id += 1;
        format!("job-{}", state.next_id)
    }
}

impl SchedulerBackend for MemoryBackend {
    fn register_recurring(
        &self,
        cron: &str,
        callback: &str,
        kwargs: Kwargs,
        queue: &str,
        timeout: Option<Duration>,
    ) -> Result<JobHandle> {
        let mut state = self.state.lock().unwrap();
        let id = Self::fresh_id(&mut state);

        let mut metadata = Kwargs::new();
        metadata.insert(
            CRON_META_KEY.to_string(),
            serde_json::Value::String(cron.to_string()),
        );

        let job = JobHandle {
            id,
            lane: queue.to_string(),
            bound_kwargs: kwargs,
            metadata,
        };

        state.registrations.push(Registration {
            cron: cron.to_string(),
            callback: callback.to_string(),
            queue: queue.to_string(),
            timeout,
        });
        state.scheduled.push(job.clone());
        Ok(job)
    }

    fn enqueue_now(&self, _callback: &str, kwargs: Kwargs, queue: &str) -> Result<JobHandle> {
        let mut state = self.state.lock().unwrap();
        let id = Self::fresh_id(&mut state);
        let lane = state
            .misroute_lane
            .clone()
            .unwrap_or_else(|| queue.to_string());

        let job = JobHandle {
            id,
            lane,
            bound_kwargs: kwargs,
            metadata: Kwargs::new(),
        };
        state.queued.push(job.clone());
        Ok(job)
    }

    fn fetch_by_id(&self, id: &str) -> Result<JobHandle> {
        let state = self.state.lock().unwrap();
        state
            .scheduled
            .iter()
            .chain(state.queued.iter())
            .chain(state.failed.iter())
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| TestlaneError::JobNotFound(id.to_string()))
    }

    fn list_scheduled(&self) -> Result<Vec<JobHandle>> {
        Ok(self.state.lock().unwrap().scheduled.clone())
    }

    fn cancel(&self, job: &JobHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.scheduled.len();
        state.scheduled.retain(|j| j.id != job.id);
        if state.scheduled.len() == before {
            return Err(TestlaneError::JobNotFound(job.id.clone()));
        }
        Ok(())
    }
}

impl FailedQueue for MemoryBackend {
    fn list_failed(&self) -> Result<Vec<JobHandle>> {
        Ok(self.state.lock().unwrap().failed.clone())
    }

    fn remove(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.failed.len();
        state.failed.retain(|j| j.id != id);
        if state.failed.len() == before {
            return Err(TestlaneError::JobNotFound(id.to_string()));
        }
        Ok(())
    }

    fn requeue(&self, id: &str) -> Result<JobHandle> {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .failed
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| TestlaneError::JobNotFound(id.to_string()))?;

        let job = state.failed.remove(pos);
        state.queued.push(job.clone());
        Ok(job)
    }
}

impl QueueView for MemoryBackend {
    fn list_queued(&self) -> Result<Vec<JobHandle>> {
        Ok(self.state.lock().unwrap().queued.clone())
    }
}
