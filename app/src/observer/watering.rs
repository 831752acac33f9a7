use super::{ConcurrentObserver, LatestStatus};
use crate::error::ObserverError;
use crate::models::PlantStore;
use greenhouse_core::{Evaluation, ReceivedReading, SensorReading, WateringPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct WateringObserver {
    inner: Arc<ConcurrentObserver>,
}

impl Clone for WateringObserver {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl WateringObserver {
    pub fn new(inner: Arc<ConcurrentObserver>) -> Self {
        WateringObserver { inner }
    }

    /// Judges a data logger reading against every stored plant.
    ///
    /// The reading is remembered for the index page, even if it
    /// turns out to be malformed.
    #[tracing::instrument(skip(self))]
    pub async fn evaluate(&self, reading: SensorReading) -> Result<Evaluation, ObserverError> {
        let received = ReceivedReading::now(reading);
        let store = self.inner.store.as_ref();
        let policy = self.inner.policy;
        let resp = self
            .inner
            .timed(evaluate_plants(store, &received.reading, &policy))
            .await;

        self.inner
            .set_latest(LatestStatus {
                reading: received,
                evaluation: resp.as_ref().ok().cloned(),
            })
            .await;
        resp
    }

    pub async fn latest(&self) -> Option<LatestStatus> {
        self.inner.latest().await
    }
}

/// One evaluation pass.
///
/// Iterates the stored plant ids, a failing lookup only skips that plant
/// and ends up in `Evaluation::failures`.
pub async fn evaluate_plants(
    store: &dyn PlantStore,
    reading: &SensorReading,
    policy: &WateringPolicy,
) -> Result<Evaluation, ObserverError> {
    let soil = reading.soil()?;
    let mut evaluation = Evaluation::new(soil);

    let count = store.count().await?;
    if count == 0 {
        debug!("No plants to evaluate");
        return Ok(evaluation);
    }

    debug!(count, "Evaluating plants");
    for plant_id in store.ids().await? {
        match store.threshold_by_id(plant_id).await {
            Ok(threshold) => {
                let needs_water = policy.needs_water(&soil, threshold);
                if needs_water {
                    info!(
                        plant_id,
                        threshold,
                        moisture = soil.moisture,
                        "Watering needed"
                    );
                }
                evaluation.decide(plant_id, needs_water);
            }
            Err(e) => {
                warn!(plant_id, "Skipped plant: {}", e);
                evaluation.fail(plant_id, e.to_string());
            }
        }
    }

    if evaluation.is_partial() {
        warn!(
            failed = evaluation.failures.len(),
            "Evaluation finished partially"
        );
    }
    Ok(evaluation)
}
