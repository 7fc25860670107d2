//! Build worker tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use daa::convert::openconfig::OpenConfigConverter;
use daa::convert::{ConfigConverter, ConversionError};
use daa::device::model::{Device, DeviceSet};
use daa::device::repository::DeviceRepository;
use daa::errors::AggregatorError;
use daa::report::model::BuildOutcome;
use daa::report::repository::ReportRepository;
use daa::source::SourceProvider;
use daa::workers::builder::{self, Builder};
use inventory_models::Inventory;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::fakes::{device, inventory, FakeMetrics, FakeSource};

struct Harness {
    source: Arc<FakeSource>,
    devices: Arc<DeviceRepository>,
    reports: Arc<ReportRepository>,
    metrics: Arc<FakeMetrics>,
    builder: Builder,
}

fn harness(source: FakeSource) -> Harness {
    harness_with(source, Arc::new(OpenConfigConverter::new()))
}

fn harness_with(source: FakeSource, converter: Arc<dyn ConfigConverter>) -> Harness {
    let source = Arc::new(source);
    let devices = Arc::new(DeviceRepository::new());
    let reports = Arc::new(ReportRepository::new());
    let metrics = Arc::new(FakeMetrics::default());

    let builder = Builder::new(
        source.clone(),
        converter,
        devices.clone(),
        reports.clone(),
        metrics.clone(),
    );

    Harness {
        source,
        devices,
        reports,
        metrics,
        builder,
    }
}

/// Converter whose work is discarded because shutdown starts while it runs
struct CancellingConverter {
    cancel: CancellationToken,
}

impl ConfigConverter for CancellingConverter {
    fn convert(&self, inventory: &Inventory) -> Result<DeviceSet, ConversionError> {
        self.cancel.cancel();
        OpenConfigConverter::new().convert(inventory)
    }
}

/// Source that fails while shutdown starts
struct FailingDuringShutdown {
    cancel: CancellationToken,
}

#[async_trait]
impl SourceProvider for FailingDuringShutdown {
    async fn fetch(&self) -> Result<Inventory, AggregatorError> {
        self.cancel.cancel();
        Err(AggregatorError::SourceError("inventory unreachable".to_string()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// Converter that always rejects the inventory
struct RejectingConverter;

impl ConfigConverter for RejectingConverter {
    fn convert(&self, _inventory: &Inventory) -> Result<DeviceSet, ConversionError> {
        Err(ConversionError::InvalidDevice {
            hostname: "X".to_string(),
            reason: "invalid VLAN".to_string(),
        })
    }
}

#[tokio::test]
async fn test_empty_snapshot_publishes_empty_set() {
    let h = harness(FakeSource::new(Inventory::default()));

    let report = h.builder.run_cycle(&CancellationToken::new()).await;

    assert_eq!(report.outcome, BuildOutcome::Success { device_count: 0 });
    assert!(report.end_time.is_some());
    assert!(h.devices.is_empty());
    assert_eq!(h.metrics.built_devices(), vec![0]);
    assert_eq!(h.metrics.successes(), 1);
    assert_eq!(h.reports.get_last_successful().unwrap().id, report.id);
}

#[tokio::test]
async fn test_successful_build_publishes_devices() {
    let h = harness(FakeSource::new(inventory(vec![
        device("tor1", true, 10),
        device("tor2", false, 20),
        device("tor3", true, 30),
    ])));

    h.builder.run_cycle(&CancellationToken::new()).await;

    assert_eq!(h.devices.len(), 3);
    let afk: Vec<String> = h
        .devices
        .list_afk_enabled()
        .into_iter()
        .map(|(hostname, _)| hostname)
        .collect();
    assert_eq!(afk, vec!["tor1".to_string(), "tor3".to_string()]);
    assert!(!h.devices.is_afk_enabled("tor2").unwrap());
}

#[tokio::test]
async fn test_conversion_failure_keeps_previous_set() {
    let h = harness(FakeSource::new(inventory(vec![device("X", true, 10)])));
    let cancel = CancellationToken::new();

    let first = h.builder.run_cycle(&cancel).await;
    assert!(first.is_successful());
    let before = h.devices.get_config("X").unwrap();

    h.source.set_inventory(inventory(vec![device("X", true, 5000)]));
    let second = h.builder.run_cycle(&cancel).await;

    let error = second.error().unwrap();
    assert!(error.contains("device X: invalid VLAN 5000"), "{}", error);
    assert_eq!(h.devices.get_config("X").unwrap(), before);
    assert_eq!(h.metrics.successes(), 1);
    assert_eq!(h.metrics.failures(), 1);
    assert_eq!(h.metrics.built_devices(), vec![1]);

    let history = h.reports.history();
    assert_eq!(history.last.as_ref().unwrap().id, second.id);
    assert_eq!(history.last_complete.as_ref().unwrap().id, second.id);
    assert_eq!(history.last_successful.as_ref().unwrap().id, first.id);
}

#[tokio::test]
async fn test_converter_error_is_reported() {
    let h = harness_with(
        FakeSource::new(inventory(vec![device("X", true, 10)])),
        Arc::new(RejectingConverter),
    );

    let report = h.builder.run_cycle(&CancellationToken::new()).await;

    assert!(report.error().unwrap().contains("device X: invalid VLAN"));
    assert!(h.devices.is_empty());
    assert!(matches!(
        h.reports.get_last_successful(),
        Err(AggregatorError::NoReportYet)
    ));
}

#[tokio::test]
async fn test_source_failure_is_reported() {
    let h = harness(FakeSource::new(Inventory::default()));
    h.source.set_error("inventory unreachable");

    let report = h.builder.run_cycle(&CancellationToken::new()).await;

    assert!(report.error().unwrap().contains("inventory unreachable"));
    assert_eq!(h.metrics.failures(), 1);
    assert!(h.metrics.built_devices().is_empty());
}

#[tokio::test]
async fn test_cancelled_cycle_does_not_publish() {
    let h = harness(FakeSource::new(inventory(vec![device("tor1", true, 10)])));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = h.builder.run_cycle(&cancel).await;

    assert_eq!(report.error(), Some("Build cancelled"));
    assert!(h.devices.is_empty());
    assert_eq!(h.metrics.successes(), 0);
    assert_eq!(h.metrics.failures(), 0);
}

#[tokio::test]
async fn test_cancel_during_fetch() {
    let h = harness(
        FakeSource::new(inventory(vec![device("tor1", true, 10)]))
            .with_delay(Duration::from_secs(30)),
    );
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), h.builder.run_cycle(&cancel))
        .await
        .expect("cycle should stop on cancellation");

    assert_eq!(report.error(), Some("Build cancelled"));
    assert!(h.devices.is_empty());
}

#[tokio::test]
async fn test_cancel_during_conversion_discards_result() {
    let cancel = CancellationToken::new();
    let h = harness_with(
        FakeSource::new(inventory(vec![device("tor1", true, 10)])),
        Arc::new(CancellingConverter {
            cancel: cancel.clone(),
        }),
    );
    let before: DeviceSet = [Device::new("spine1", true, json!({"generation": 1}))]
        .into_iter()
        .collect();
    h.devices.set(before.clone());

    let report = h.builder.run_cycle(&cancel).await;

    assert_eq!(report.error(), Some("Build cancelled"));
    assert_eq!(*h.devices.snapshot(), before);
    assert!(h.devices.get_device("tor1").is_err());
    assert_eq!(h.metrics.successes(), 0);
    assert_eq!(h.metrics.failures(), 0);
    assert!(h.metrics.built_devices().is_empty());
}

#[tokio::test]
async fn test_failure_during_shutdown_is_still_counted() {
    let cancel = CancellationToken::new();
    let devices = Arc::new(DeviceRepository::new());
    let reports = Arc::new(ReportRepository::new());
    let metrics = Arc::new(FakeMetrics::default());
    let builder = Builder::new(
        Arc::new(FailingDuringShutdown {
            cancel: cancel.clone(),
        }),
        Arc::new(OpenConfigConverter::new()),
        devices.clone(),
        reports,
        metrics.clone(),
    );

    let report = builder.run_cycle(&cancel).await;

    assert!(cancel.is_cancelled());
    assert!(report.error().unwrap().contains("inventory unreachable"));
    assert_eq!(metrics.failures(), 1);
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_build_timeout() {
    let mut h = harness(FakeSource::new(Inventory::default()).with_delay(Duration::from_secs(30)));
    h.builder = h.builder.with_timeout(Some(Duration::from_millis(50)));

    let report = h.builder.run_cycle(&CancellationToken::new()).await;

    assert!(report.error().unwrap().starts_with("Build timed out"));
    assert_eq!(h.metrics.failures(), 1);
}

#[tokio::test]
async fn test_report_ids_increase() {
    let h = harness(FakeSource::new(Inventory::default()));
    let cancel = CancellationToken::new();

    let first = h.builder.run_cycle(&cancel).await;
    let second = h.builder.run_cycle(&cancel).await;

    assert!(second.id > first.id);
    assert_eq!(h.reports.get_last().unwrap().id, second.id);
}

#[tokio::test]
async fn test_worker_runs_until_cancelled_without_overlap() {
    let h = harness(
        FakeSource::new(inventory(vec![device("tor1", true, 10)]))
            .with_delay(Duration::from_millis(30)),
    );
    let options = builder::Options {
        interval: Duration::from_millis(10),
        timeout: None,
    };
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.cancel();
    });

    tokio::time::timeout(
        Duration::from_secs(5),
        builder::run(&options, &h.builder, cancel),
    )
    .await
    .expect("worker should stop on cancellation");

    assert!(h.source.fetches() >= 2);
    assert_eq!(h.source.max_in_flight(), 1);
    assert_eq!(h.devices.len(), 1);
}
