use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{self, Either, FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use futures_timer::Delay;

use super::loader::{AssetLoadError, AssetLoader, LoadFuture, LoadedAsset};
use super::unit::LoadUnit;

type UnitOutcome = Result<LoadedAsset, AssetLoadError>;

/// Fan-out of every unit's load with a fan-in over completion order. The
/// caller stops polling (and drops the batch) on the first error, which
/// drops every load and deadline still in flight.
pub(crate) struct LoadBatch {
    pending: FuturesUnordered<LocalBoxFuture<'static, UnitOutcome>>,
}

impl LoadBatch {
    pub(crate) fn spawn<L: AssetLoader + ?Sized>(loader: &L, units: &[LoadUnit]) -> Self {
        let pending = FuturesUnordered::new();
        for unit in units {
            let key = unit.key().to_string();
            let load = match unit.timeout() {
                Some(timeout) => with_timeout(loader.load(unit), unit, timeout),
                None => loader.load(unit),
            };
            pending.push(
                load.map(move |result| result.map(|payload| LoadedAsset { key, payload }))
                    .boxed_local(),
            );
        }
        Self { pending }
    }

    /// `Ready(None)` once every unit has resolved.
    pub(crate) fn poll_next(&mut self, cx: &mut Context<'_>) -> Poll<Option<UnitOutcome>> {
        self.pending.poll_next_unpin(cx)
    }
}

fn with_timeout(load: LoadFuture, unit: &LoadUnit, timeout: Duration) -> LoadFuture {
    let kind = unit.kind();
    let key = unit.key().to_string();
    let deadline = Delay::new(timeout);
    async move {
        match future::select(load, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(AssetLoadError::Timeout { kind, key, timeout }),
        }
    }
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::thread;
    use std::time::Instant;

    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::task::noop_waker_ref;

    use super::super::cache::ModelData;
    use super::super::loader::AssetPayload;
    use super::super::unit::AssetKind;
    use super::*;

    #[derive(Default)]
    struct GatedLoader {
        senders: RefCell<HashMap<String, oneshot::Sender<Result<AssetPayload, AssetLoadError>>>>,
    }

    impl AssetLoader for GatedLoader {
        fn load(&self, unit: &LoadUnit) -> LoadFuture {
            let (sender, receiver) = oneshot::channel();
            self.senders
                .borrow_mut()
                .insert(unit.key().to_string(), sender);
            let (kind, key) = (unit.kind(), unit.key().to_string());
            async move {
                receiver
                    .await
                    .unwrap_or(Err(AssetLoadError::Abandoned { kind, key }))
            }
            .boxed_local()
        }
    }

    impl GatedLoader {
        fn resolve(&self, key: &str) {
            let sender = self.senders.borrow_mut().remove(key).expect("pending key");
            let _ = sender.send(Ok(AssetPayload::Model(ModelData {
                bytes: key.as_bytes().to_vec(),
            })));
        }
    }

    fn model_units(keys: &[&str]) -> Vec<LoadUnit> {
        keys.iter()
            .map(|key| LoadUnit::new(AssetKind::Model, *key, format!("{key}.glb")))
            .collect()
    }

    #[test]
    fn results_arrive_in_completion_order() {
        let loader = GatedLoader::default();
        let mut batch = LoadBatch::spawn(&loader, &model_units(&["a", "b", "c"]));
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(batch.poll_next(&mut cx).is_pending());

        let mut order = Vec::new();
        for key in ["c", "a", "b"] {
            loader.resolve(key);
            match batch.poll_next(&mut cx) {
                Poll::Ready(Some(Ok(asset))) => order.push(asset.key),
                other => panic!("unexpected poll result: {other:?}"),
            }
        }

        assert_eq!(order, vec!["c", "a", "b"]);
        assert!(matches!(batch.poll_next(&mut cx), Poll::Ready(None)));
    }

    #[test]
    fn slow_unit_times_out() {
        let loader = GatedLoader::default();
        let units = vec![
            LoadUnit::new(AssetKind::Sound, "ambient", "ambient.mp3")
                .with_timeout(Duration::from_millis(20)),
        ];
        let mut batch = LoadBatch::spawn(&loader, &units);

        let outcome = block_on(future::poll_fn(|cx| batch.poll_next(cx)));
        match outcome {
            Some(Err(AssetLoadError::Timeout { key, timeout, .. })) => {
                assert_eq!(key, "ambient");
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn deadline_fires_under_noop_waker_polling() {
        let loader = GatedLoader::default();
        let units = vec![LoadUnit::new(AssetKind::Model, "player", "player.glb")
            .with_timeout(Duration::from_millis(10))];
        let mut batch = LoadBatch::spawn(&loader, &units);
        let mut cx = Context::from_waker(noop_waker_ref());

        let started = Instant::now();
        let outcome = loop {
            if let Poll::Ready(outcome) = batch.poll_next(&mut cx) {
                break outcome;
            }
            assert!(started.elapsed() < Duration::from_secs(5), "deadline never fired");
            thread::sleep(Duration::from_millis(5));
        };
        assert!(matches!(outcome, Some(Err(AssetLoadError::Timeout { .. }))));
    }

    #[cfg(target_os = "linux")]
    fn thread_names() -> Vec<String> {
        std::fs::read_dir("/proc/self/task")
            .expect("task dir")
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| std::fs::read_to_string(entry.path().join("comm")).ok())
            .map(|name| name.trim().to_string())
            .collect()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn resolved_loads_leave_no_timer_thread_per_unit() {
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
        let loader = GatedLoader::default();
        let units: Vec<LoadUnit> = model_units(&keys)
            .into_iter()
            .map(|unit| unit.with_timeout(Duration::from_secs(60)))
            .collect();
        let mut batch = LoadBatch::spawn(&loader, &units);
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(batch.poll_next(&mut cx).is_pending());

        for key in keys {
            loader.resolve(key);
        }
        let mut loaded = 0;
        while let Poll::Ready(Some(outcome)) = batch.poll_next(&mut cx) {
            outcome.expect("loaded");
            loaded += 1;
        }
        assert_eq!(loaded, keys.len());
        drop(batch);

        let names = thread_names();
        assert!(names.iter().filter(|name| *name == "futures-timer").count() <= 1);
    }

    #[test]
    fn zero_timeout_waits_for_the_load() {
        let loader = GatedLoader::default();
        let units =
            vec![LoadUnit::new(AssetKind::Model, "a", "a.glb").with_timeout(Duration::ZERO)];
        let mut batch = LoadBatch::spawn(&loader, &units);
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(batch.poll_next(&mut cx).is_pending());

        loader.resolve("a");
        assert!(matches!(batch.poll_next(&mut cx), Poll::Ready(Some(Ok(_)))));
    }

    #[test]
    fn empty_batch_is_immediately_done() {
        let loader = GatedLoader::default();
        let mut batch = LoadBatch::spawn(&loader, &[]);
        let mut cx = Context::from_waker(noop_waker_ref());
        assert!(matches!(batch.poll_next(&mut cx), Poll::Ready(None)));
    }
}
