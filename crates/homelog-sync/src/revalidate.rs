use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::{SyncEvent, SyncSubscription, TRACING_TARGET};

/// Runs `handler` for every event on `subscription` until `cancel` fires or
/// the hub is dropped.
///
/// Events are handled one at a time; events arriving while a handler runs
/// are buffered by the subscription. Returns the number of events handled.
pub async fn revalidate_on<F, Fut>(
    mut subscription: SyncSubscription,
    cancel: CancellationToken,
    mut handler: F,
) -> usize
where
    F: FnMut(SyncEvent) -> Fut,
    Fut: Future<Output = ()>,
{
    let channel = subscription.channel();
    let mut handled = 0;

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.next() => match event {
                Some(event) => event,
                None => break,
            },
        };

        handler(event).await;
        handled += 1;
    }

    tracing::debug!(
        target: TRACING_TARGET,
        channel = %channel,
        handled,
        "revalidation loop stopped"
    );

    handled
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use homelog_auth::grant::{NamedDefinition, PermissionRecord, Principal, PrincipalQuery};
    use homelog_auth::level::AccessLevel;
    use homelog_auth::{AccessControl, PermissionSource};

    use super::*;
    use crate::{DataSync, SyncChannel};

    /// Backend whose grants change between fetches.
    #[derive(Debug, Default)]
    struct ChangingBackend {
        records: Mutex<Vec<PermissionRecord>>,
    }

    #[async_trait::async_trait]
    impl PermissionSource for ChangingBackend {
        async fn fetch_permissions(
            &self,
            _principal: Principal,
        ) -> homelog_auth::Result<Vec<PermissionRecord>> {
            Ok(self.records.lock().unwrap().clone())
        }

        async fn fetch_access_levels(&self) -> homelog_auth::Result<Vec<AccessLevel>> {
            Ok(vec![AccessLevel::new("READ", 10), AccessLevel::new("WRITE", 20)])
        }
    }

    fn house_write_record() -> PermissionRecord {
        let named = |name: &str| NamedDefinition {
            id: None,
            name: name.to_owned(),
        };
        PermissionRecord {
            id: 1,
            user_id: Some(42),
            role_id: None,
            functionality_definition_id: None,
            object_definition_id: None,
            access_level_definition_id: None,
            functionality_definition: Some(named("house")),
            object_definition: Some(named("houseHouse")),
            access_level_definition: Some(AccessLevel::new("WRITE", 20)),
        }
    }

    #[tokio::test]
    async fn test_handler_runs_per_event_until_cancelled() {
        let sync = DataSync::new();
        let cancel = CancellationToken::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn({
            let subscription = sync.subscribe(SyncChannel::Houses);
            let cancel = cancel.clone();
            let seen = seen.clone();
            revalidate_on(subscription, cancel, move |_| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            })
        });

        sync.publish("house", "add").unwrap();
        sync.publish("house-1", "update").unwrap();
        sync.publish("house", "delete").unwrap();

        while seen.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        assert_eq!(task.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stops_when_hub_dropped() {
        let sync = DataSync::new();
        let subscription = sync.subscribe(SyncChannel::Logger(1));
        sync.publish("logger_1", "update").unwrap();
        drop(sync);

        let handled = revalidate_on(subscription, CancellationToken::new(), |_| async {}).await;
        assert_eq!(handled, 1);
    }

    #[tokio::test]
    async fn test_house_update_refreshes_access_control() {
        let backend = ChangingBackend::default();
        let access = AccessControl::new();
        let cancel = CancellationToken::new();
        let query = PrincipalQuery::user(42);

        access.refresh_catalog(&backend, &cancel).await.unwrap();
        access.refresh_permissions(&backend, query, &cancel).await.unwrap();
        assert!(!access.can_write(Some("house"), Some("houseHouse")));

        let sync = DataSync::new();
        let subscription = sync.subscribe(SyncChannel::Houses);
        backend.records.lock().unwrap().push(house_write_record());
        sync.publish("house", "update").unwrap();
        drop(sync);

        let (access_ref, backend_ref, cancel_ref) = (&access, &backend, &cancel);
        let handled = revalidate_on(subscription, cancel.clone(), move |_| async move {
            access_ref
                .refresh_permissions(backend_ref, query, cancel_ref)
                .await
                .unwrap();
        })
        .await;

        assert_eq!(handled, 1);
        assert!(access.can_write(Some("house"), Some("houseHouse")));
    }
}
