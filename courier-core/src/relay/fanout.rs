//! Best-effort delivery of one event to many destinations.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::destination::Destination;
use super::error::{DeliveryError, RelayError, RelayResult};
use super::types::{PublishConfig, PublishOutcome, PublishReport};
use crate::nostr::Event;

/// Sends `event` to every destination concurrently and collects outcomes.
///
/// Every delivery runs as its own task bounded by `config.timeout`. A
/// destination that fails, times out or panics is recorded and does not
/// affect the others; there are no retries. Returns once every destination
/// has an outcome.
///
/// # Errors
///
/// Returns [`RelayError::NoDestinations`] if `destinations` is empty.
/// Per-destination failures are reported in the [`PublishReport`], never
/// as an error.
pub async fn publish(
    event: &Event,
    destinations: &[Arc<dyn Destination>],
    config: &PublishConfig,
) -> RelayResult<PublishReport> {
    if destinations.is_empty() {
        return Err(RelayError::NoDestinations);
    }

    let shared = Arc::new(event.clone());
    let timeout = config.timeout;
    let tasks = destinations.iter().map(|destination| {
        let id = destination.id().to_string();
        let destination = Arc::clone(destination);
        let event = Arc::clone(&shared);
        let handle =
            tokio::spawn(async move { deliver_one(destination.as_ref(), &event, timeout).await });
        async move {
            handle.await.unwrap_or_else(|e| {
                log::warn!("Delivery task for {id} did not finish: {e}");
                let error = DeliveryError::Publish("delivery task panicked".to_string());
                PublishOutcome::failed(id, error)
            })
        }
    });
    let outcomes = join_all(tasks).await;

    let report = PublishReport {
        event_id: event.id.clone(),
        outcomes,
    };
    log::debug!(
        "Event {} published: {}/{} destinations accepted",
        report.event_id,
        report.success_count(),
        report.outcomes.len()
    );

    Ok(report)
}

async fn deliver_one(
    destination: &dyn Destination,
    event: &Event,
    timeout: Duration,
) -> PublishOutcome {
    let id = destination.id().to_string();

    let result = tokio::time::timeout(timeout, destination.deliver(event))
        .await
        .unwrap_or(Err(DeliveryError::Timeout(timeout)));

    match result {
        Ok(()) => {
            log::info!("Event {} accepted by {id}", event.id);
            PublishOutcome::accepted(id)
        }
        Err(e) => {
            log::warn!("Event {} not delivered to {id}: {e}", event.id);
            PublishOutcome::failed(id, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::clock::FixedClock;
    use crate::nostr::{build_and_sign, KeyPair, KIND_TEXT_NOTE};

    struct Scripted {
        id: String,
        delay: Duration,
        result: Result<(), DeliveryError>,
    }

    impl Scripted {
        fn new(id: &str, delay_ms: u64, result: Result<(), DeliveryError>) -> Arc<dyn Destination> {
            Arc::new(Self {
                id: id.to_string(),
                delay: Duration::from_millis(delay_ms),
                result,
            })
        }
    }

    #[async_trait]
    impl Destination for Scripted {
        fn id(&self) -> &str {
            &self.id
        }

        async fn deliver(&self, _event: &Event) -> Result<(), DeliveryError> {
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    struct Panicking;

    #[async_trait]
    impl Destination for Panicking {
        fn id(&self) -> &str {
            "panicking"
        }

        async fn deliver(&self, _event: &Event) -> Result<(), DeliveryError> {
            panic!("destination bug");
        }
    }

    fn event() -> Event {
        let keys = KeyPair::generate().unwrap();
        build_and_sign(&keys, KIND_TEXT_NOTE, "hello", vec![], &FixedClock(1_700_000_000)).unwrap()
    }

    #[tokio::test]
    async fn empty_destinations_is_an_error() {
        let result = publish(&event(), &[], &PublishConfig::default()).await;
        assert!(matches!(result, Err(RelayError::NoDestinations)));
    }

    #[tokio::test]
    async fn one_outcome_per_destination_in_order() {
        let event = event();
        let destinations = vec![
            Scripted::new("a", 0, Ok(())),
            Scripted::new("b", 0, Err(DeliveryError::Rejected("no".to_string()))),
            Scripted::new("c", 0, Ok(())),
        ];

        let report = publish(&event, &destinations, &PublishConfig::default())
            .await
            .unwrap();

        assert_eq!(report.event_id, event.id);
        let ids: Vec<_> = report.outcomes.iter().map(|o| o.destination.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(report.success_count(), 2);
        assert_eq!(
            report.outcomes[1].error,
            Some(DeliveryError::Rejected("no".to_string()))
        );
    }

    #[tokio::test]
    async fn slow_destination_times_out() {
        let config = PublishConfig {
            timeout: Duration::from_millis(50),
        };
        let destinations = vec![
            Scripted::new("slow", 5_000, Ok(())),
            Scripted::new("fast", 0, Ok(())),
        ];

        let report = publish(&event(), &destinations, &config).await.unwrap();

        assert!(report.is_success());
        assert!(!report.outcomes[0].success);
        assert_eq!(
            report.outcomes[0].error,
            Some(DeliveryError::Timeout(Duration::from_millis(50)))
        );
        assert!(report.outcomes[1].success);
    }

    #[tokio::test]
    async fn deliveries_run_concurrently() {
        let destinations: Vec<_> = (0..5)
            .map(|i| Scripted::new(&format!("d{i}"), 200, Ok(())))
            .collect();

        let started = std::time::Instant::now();
        let report = publish(&event(), &destinations, &PublishConfig::default())
            .await
            .unwrap();

        assert_eq!(report.success_count(), 5);
        assert!(started.elapsed() < Duration::from_millis(900));
    }

    #[tokio::test]
    async fn panicking_destination_becomes_a_failed_outcome() {
        let destinations: Vec<Arc<dyn Destination>> = vec![
            Arc::new(Panicking),
            Scripted::new("good", 0, Ok(())),
        ];

        let report = publish(&event(), &destinations, &PublishConfig::default())
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].destination, "panicking");
        assert_eq!(
            report.outcomes[0].error,
            Some(DeliveryError::Publish("delivery task panicked".to_string()))
        );
        assert!(report.outcomes[1].success);
        assert!(report.is_success());
    }
}
