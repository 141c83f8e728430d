use crate::error::PredictError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps the number of predictor processes running at once.
///
/// Requests beyond the cap wait up to `queue_wait` for a slot and are then
/// turned away with [`PredictError::Busy`].
#[derive(Clone)]
pub struct AdmissionControl {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    queue_wait: Duration,
}

/// A held slot; dropping it frees the slot.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        metrics::gauge!("predictor_in_flight").decrement(1.0);
    }
}

impl AdmissionControl {
    pub fn new(max_concurrent: usize, queue_wait: Duration) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            queue_wait,
        }
    }

    pub async fn acquire(&self) -> Result<AdmissionPermit, PredictError> {
        let permit = tokio::time::timeout(self.queue_wait, self.semaphore.clone().acquire_owned())
            .await
            .map_err(|_| {
                tracing::warn!(
                    max_concurrent = self.max_concurrent,
                    queue_wait_ms = self.queue_wait.as_millis() as u64,
                    "No predictor slot available"
                );
                PredictError::Busy {
                    retry_after_secs: self.queue_wait.as_secs().max(1),
                }
            })?
            // The semaphore is never closed.
            .map_err(|_| PredictError::Internal)?;

        metrics::gauge!("predictor_in_flight").increment(1.0);

        Ok(AdmissionPermit { _permit: permit })
    }

    pub fn in_flight(&self) -> usize {
        self.max_concurrent - self.semaphore.available_permits()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
