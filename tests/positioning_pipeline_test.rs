//! 定位流水线测试
//!
//! 使用 5m x 5m 房间（四角信标，高度 2.5m）验证整条流水线的行为

use beacon_locate::algorithms::*;
use beacon_locate::simulation::{CircularPath, SimulatedScanner};
use beacon_locate::{PositioningConfig, PositioningPipeline};

const CONFIG: &str = r#"{
    "environment_factor": 2.5,
    "max_outlier_distance": 50.0,
    "min_beacons_required": 3,
    "process_variance": 0.001,
    "measurement_variance": 1.5,
    "beacons": [
        {"uuid": "FDA50693-A4E2-4FB1-AFCF-C6EB07647825", "major": 1, "minor": 1, "name": "Beacon-1", "position": [0.0, 0.0, 2.5]},
        {"uuid": "FDA50693-A4E2-4FB1-AFCF-C6EB07647825", "major": 1, "minor": 2, "name": "Beacon-2", "position": [5.0, 0.0, 2.5]},
        {"uuid": "FDA50693-A4E2-4FB1-AFCF-C6EB07647825", "major": 1, "minor": 3, "name": "Beacon-3", "position": [5.0, 5.0, 2.5]},
        {"uuid": "FDA50693-A4E2-4FB1-AFCF-C6EB07647825", "major": 1, "minor": 4, "name": "Beacon-4", "position": [0.0, 5.0, 2.5]}
    ]
}"#;

fn id(minor: u16) -> BeaconId {
    BeaconId::new("FDA50693-A4E2-4FB1-AFCF-C6EB07647825", 1, minor)
}

fn pipeline() -> PositioningPipeline {
    let config = PositioningConfig::from_json_str(CONFIG).unwrap();
    PositioningPipeline::from_config(&config).unwrap()
}

#[test]
fn test_two_measurements_are_insufficient() {
    let mut pipeline = pipeline();
    let measurements = vec![
        RangeMeasurement::new(Vec3::new(0.0, 0.0, 2.5), 3.0),
        RangeMeasurement::new(Vec3::new(5.0, 0.0, 2.5), 3.0),
    ];

    let outcome = pipeline.process_measurements(&measurements);
    assert_eq!(
        outcome,
        CycleOutcome::InsufficientBeacons {
            count: 2,
            required: 3
        }
    );
    assert!(pipeline.smoother().estimate().is_none());
}

#[test]
fn test_outliers_count_against_minimum() {
    let mut pipeline = pipeline();
    let batch = ScanBatch::from_observations(vec![
        Observation::new(id(1), -65),
        Observation::new(id(2), -66),
        // -59 - 25 * log10(50) ≈ -101.5，超出上限
        Observation::new(id(3), -110),
        Observation::new(id(4), 0),
    ]);

    let outcome = pipeline.process(&batch);
    println!("{}", outcome);
    assert_eq!(
        outcome,
        CycleOutcome::InsufficientBeacons {
            count: 2,
            required: 3
        }
    );
}

#[test]
fn test_unknown_beacons_are_ignored() {
    let mut pipeline = pipeline();
    let batch = ScanBatch::from_observations(vec![
        Observation::new(id(1), -70),
        Observation::new(id(2), -70),
        Observation::new(BeaconId::new("AAAAAAAA-0000-0000-0000-000000000000", 7, 7), -50),
        Observation::new(BeaconId::new("AAAAAAAA-0000-0000-0000-000000000000", 7, 8), -50),
    ]);

    assert!(!pipeline.process(&batch).is_emitted());
}

#[test]
fn test_min_beacons_from_config() {
    let mut config = PositioningConfig::from_json_str(CONFIG).unwrap();
    config.min_beacons_required = 4;
    let mut pipeline = PositioningPipeline::from_config(&config).unwrap();

    let three: ScanBatch = (1..=3).map(|m| Observation::new(id(m), -72)).collect();
    assert_eq!(
        pipeline.process(&three),
        CycleOutcome::InsufficientBeacons {
            count: 3,
            required: 4
        }
    );

    let four: ScanBatch = (1..=4).map(|m| Observation::new(id(m), -72)).collect();
    assert!(pipeline.process(&four).is_emitted());
}

#[test]
fn test_emitted_result_exposes_distances() {
    let mut pipeline = pipeline();
    let batch: ScanBatch = (1..=4)
        .map(|m| Observation::new(id(m), -60 - m as i16 * 3))
        .chain(std::iter::once(Observation::new(id(5), -60)))
        .collect();

    let outcome = pipeline.process(&batch);
    let result = outcome.location().expect("应有定位结果");

    println!("定位结果: {}", result);
    assert_eq!(result.beacon_count, 4);
    assert_eq!(result.beacon_distances.len(), 4);
    for m in 1..=4u16 {
        let expected = estimate_distance(-60 - m as i16 * 3, -59, 2.5);
        assert_eq!(result.beacon_distances[&id(m)], expected);
    }
    // 首个周期平滑输出等于原始输出
    assert_eq!(result.position, result.raw_position);
}

#[test]
fn test_insufficient_cycle_keeps_last_estimate() {
    let mut pipeline = pipeline();
    let full: ScanBatch = (1..=4).map(|m| Observation::new(id(m), -72)).collect();
    let first = pipeline.process(&full);
    let estimate = pipeline.smoother().estimate();
    assert!(first.is_emitted());

    let sparse: ScanBatch = (1..=2).map(|m| Observation::new(id(m), -72)).collect();
    assert!(!pipeline.process(&sparse).is_emitted());
    assert_eq!(pipeline.smoother().estimate(), estimate);
}

#[test]
fn test_stationary_target_without_noise() {
    let truth = Vec3::new(2.5, 2.5, 1.5);
    let mut scanner = SimulatedScanner::square_room(0).with_noise(None);
    let mut pipeline = PositioningPipeline::new(scanner.beacon_set());

    let mut last = None;
    for _ in 0..20 {
        let batch = scanner.scan_at(&truth);
        last = pipeline.process(&batch).location().cloned();
    }

    let result = last.expect("应有定位结果");
    let error = result.distance_to(&truth);
    println!("静止目标: {}，误差 {:.3}m", result, error);
    // RSSI 取整带来的距离偏差
    assert!(error < 0.3);
}

#[test]
fn test_off_centre_target_resolves_to_one_side_of_ceiling() {
    let truth = Vec3::new(1.0, 1.0, 1.2);
    let mirror = Vec3::new(1.0, 1.0, 3.8);
    let mut scanner = SimulatedScanner::square_room(0).with_noise(None);
    let mut pipeline = PositioningPipeline::new(scanner.beacon_set());

    let mut last = None;
    for _ in 0..10 {
        let batch = scanner.scan_at(&truth);
        last = pipeline.process(&batch).location().cloned();
    }

    let result = last.expect("应有定位结果");
    let p = result.position;
    println!("偏离中心目标: {}", result);

    // 信标全部在天花板上，上下两侧的镜像解同样成立
    let error = (p - truth).norm().min((p - mirror).norm());
    assert!(error < 0.6, "误差 {:.3}m", error);
    assert!((p.xy() - truth.xy()).norm() < 0.5);
    assert!((p.z - 2.5).abs() > 0.5);
    // 观测不变时平滑输出与原始输出一致
    assert_eq!(result.position, result.raw_position);
}

#[test]
fn test_stationary_target_with_noise() {
    let truth = Vec3::new(2.5, 2.5, 1.5);
    let mut scanner = SimulatedScanner::square_room(42);
    let mut pipeline = PositioningPipeline::new(scanner.beacon_set());

    let mut last = None;
    for _ in 0..60 {
        let batch = scanner.scan_at(&truth);
        if let Some(result) = pipeline.process(&batch).location() {
            assert!(result.position.iter().all(|v| v.is_finite()));
            last = Some(result.clone());
        }
    }

    let result = last.expect("应有定位结果");
    let error = result.distance_to(&truth);
    println!("噪声下静止目标: {}，误差 {:.3}m", result, error);
    assert!(error < 1.5);
}

#[test]
fn test_moving_target_simulation() {
    let mut scanner = SimulatedScanner::square_room(7)
        .with_path(CircularPath::default())
        .with_cycles(30);
    let mut pipeline = PositioningPipeline::new(scanner.beacon_set());

    let mut emitted = 0;
    while let Some((truth, batch)) = scanner.next_cycle() {
        let outcome = pipeline.process(&batch);
        if let Some(result) = outcome.location() {
            emitted += 1;
            println!(
                "真实 ({:.2}, {:.2}, {:.2}) -> 估算 {}",
                truth.x, truth.y, truth.z, result
            );
            assert!(result.position.iter().all(|v| v.is_finite()));
        }
    }

    assert_eq!(emitted, 30);
}

#[test]
fn test_pipelines_share_reference_set() {
    let scanner = SimulatedScanner::square_room(0);
    let beacons = std::sync::Arc::new(scanner.beacon_set());

    let mut a = PositioningPipeline::new(beacons.clone());
    let mut b = PositioningPipeline::new(beacons.clone());
    let batch: ScanBatch = (1..=4).map(|m| Observation::new(id(m), -70)).collect();

    assert_eq!(
        a.process(&batch).location().map(|r| r.position),
        b.process(&batch).location().map(|r| r.position)
    );
    assert_eq!(std::sync::Arc::strong_count(&beacons), 3);
}
