use delegate_foundation::source::DeviceQuery;
use delegate_foundation::{
    Negotiator, get_effective_feature_level, get_effective_feature_level_from_option,
    get_runtime_feature_level, get_target_devices, negotiate,
};
use delegate_kernel::config::{FileFormat, from_str};
use delegate_kernel::feature_level::{LEVEL_1, LEVEL_3, LEVEL_5, LEVEL_8, REFERENCE_CPU, UNSUPPORTED};
use delegate_kernel::{
    DelegateConfig, DeviceKind, DeviceWrapper, NegotiationContext, TargetDeviceOption,
};
use delegate_testing::MockDeviceSource;

fn names<H>(devices: &[DeviceWrapper<H>]) -> Vec<&str> {
    devices.iter().map(|d| d.name.as_str()).collect()
}

fn phone() -> MockDeviceSource {
    MockDeviceSource::new(LEVEL_8)
        .with_device("gpu0", DeviceKind::Accelerator, 29)
        .with_device("cpu", DeviceKind::Cpu, REFERENCE_CPU)
        .with_device("dsp", DeviceKind::Accelerator, 30)
}

#[test]
fn test_below_threshold_makes_no_device_queries() {
    let source = phone();
    let ctx = NegotiationContext::default().with_runtime_feature_level(LEVEL_1);

    let devices = get_target_devices(&source, &ctx, TargetDeviceOption::All).unwrap();
    assert!(devices.is_empty());
    assert_eq!(source.total_calls(), 0);
}

#[test]
fn test_enumeration_queries_each_device_once() {
    let source = phone();
    let devices = get_target_devices(
        &source,
        &NegotiationContext::default(),
        TargetDeviceOption::CpuDisabled,
    )
    .unwrap();

    assert_eq!(names(&devices), ["gpu0", "dsp"]);
    delegate_testing::assert_queried!(source, DeviceQuery::Count, 1);
    delegate_testing::assert_queried!(source, DeviceQuery::Name, 3);
    delegate_testing::assert_queried!(source, DeviceQuery::FeatureLevel, 3);
}

#[test]
fn test_failure_stops_enumeration_immediately() {
    let source = phone().fail(DeviceQuery::Name, 1, 5, "driver gone");
    let ctx = NegotiationContext::default();

    let report = get_target_devices(&source, &ctx, TargetDeviceOption::All).unwrap_err();
    let rendered = format!("{report:?}");
    assert!(rendered.contains("Getting 1th device's name"));
    assert!(rendered.contains("driver gone"));
    assert_eq!(report.current_context().code(), Some(5));

    // device 2 was never touched
    assert!(source.history().iter().all(|record| record.index != Some(2)));

    assert_eq!(
        get_effective_feature_level_from_option(&source, &ctx, TargetDeviceOption::All),
        UNSUPPORTED
    );
}

#[test]
fn test_count_failure_is_sentinel() {
    let source = phone().fail(DeviceQuery::Count, 0, 3, "unexpected null");
    let outcome = negotiate(
        &source,
        &NegotiationContext::default(),
        TargetDeviceOption::CpuOnly,
    );
    assert_eq!(outcome.effective_level, UNSUPPORTED);
    assert!(outcome.devices.is_empty());
    assert!(
        outcome
            .error
            .unwrap()
            .contains("Getting count of available devices")
    );
}

#[test]
fn test_unknown_type_codes_are_not_cpu() {
    let source = MockDeviceSource::new(LEVEL_8)
        .with_raw_device("mystery", 42, LEVEL_5)
        .with_raw_device("cpu", 2, REFERENCE_CPU);

    let devices = get_target_devices(
        &source,
        &NegotiationContext::default(),
        TargetDeviceOption::CpuDisabled,
    )
    .unwrap();
    assert_eq!(names(&devices), ["mystery"]);
    assert_eq!(devices[0].kind, DeviceKind::Unknown);
    assert_eq!(
        get_effective_feature_level(&source, &NegotiationContext::default(), &devices),
        LEVEL_5
    );
}

#[test]
fn test_platform_clamp_feeds_enumeration_threshold() {
    let source = phone();

    // platform 28 clamps the runtime below the enumeration threshold
    let ctx = NegotiationContext::default().with_platform_api_level(28);
    assert_eq!(get_runtime_feature_level(&source, &ctx), 28);
    assert!(
        get_target_devices(&source, &ctx, TargetDeviceOption::All)
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        get_effective_feature_level_from_option(&source, &ctx, TargetDeviceOption::All),
        28
    );

    let ctx = NegotiationContext::default().with_platform_api_level(LEVEL_3);
    assert_eq!(
        get_effective_feature_level_from_option(&source, &ctx, TargetDeviceOption::CpuDisabled),
        LEVEL_3
    );
}

#[test]
fn test_configured_static_devices_negotiate_end_to_end() {
    let toml = r#"
source = "static"
target_device_option = "cpu_disabled"

[negotiation]
runtime_feature_level = 31

[[devices]]
name = "cpu"
kind = "cpu"
feature_level = 1000

[[devices]]
name = "npu"
kind = "accelerator"
feature_level = 30
"#;
    let config: DelegateConfig = from_str(toml, FileFormat::Toml).unwrap();
    config.validate().unwrap();

    let source = delegate_foundation::source::source_from_config(&config);
    let negotiator = Negotiator::new(source, config.negotiation.clone());
    let outcome = negotiator.negotiate(config.target_device_option);

    assert_eq!(outcome.runtime_level, 31);
    assert_eq!(outcome.effective_level, 30);
    assert!(outcome.is_downgraded());
    assert_eq!(names(&outcome.devices), ["npu"]);

    let all = negotiator.negotiate(TargetDeviceOption::All);
    assert_eq!(names(&all.devices), ["npu", "cpu"]);
    assert_eq!(all.effective_level, 31);
}
