//! The grabbing tick must not allocate once the grab has started.

use glam::Vec3;
use openhaptic_grabber::prelude::*;
use openhaptic_test_helpers::assert_rt_safe;
use openhaptic_test_helpers::prelude::*;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn grabbing(config: GrabberConfig, capture: FixedCapture) -> Grabber {
    let pose = StylusPose::at(Vec3::new(0.01, 0.002, 0.0)).with_button(true);
    let mut grabber = must(
        GrabberBuilder::new(config)
            .pose_source(FixedPose(pose))
            .capture_service(capture)
            .force_sink(NullForceSink)
            .curve(tissue_curve())
            .build(),
    );
    // The grab itself logs and may allocate.
    let report = grabber.tick(0.001);
    assert!(matches!(report.transition, Transition::Began(_)));
    grabber
}

#[test]
fn curve_tick_with_every_stage_enabled_is_allocation_free() {
    let mut config = GrabberConfig::default();
    config.visco.enabled = true;
    config.visco.eta = 0.5;
    config.visco.tau = 0.01;
    config.prony.enabled = true;
    config.prony.stiffness = vec![2.0, 1.0, 0.5];
    config.prony.tau = vec![0.01, 0.1, 1.0];
    let mut grabber = grabbing(config, FixedCapture::new(Vec3::ZERO));

    let guard = track();
    for _ in 0..1_000 {
        let report = grabber.tick(0.001);
        std::hint::black_box(report);
    }
    assert_rt_safe!(guard, "curve tick");
}

#[test]
fn physics_tick_is_allocation_free() {
    let config = GrabberConfig {
        force_source: ForceSource::Physics,
        ..GrabberConfig::default()
    };
    let mut capture = FixedCapture::new(Vec3::ZERO);
    capture.engine_force = Vec3::new(0.0, 1.0, 0.0);
    let mut grabber = grabbing(config, capture);

    let guard = track();
    for _ in 0..1_000 {
        std::hint::black_box(grabber.render_tick(0.001));
    }
    let report = guard.report("physics tick");
    drop(guard);
    report.assert_zero();
}

#[test]
fn idle_tick_is_allocation_free() {
    let mut grabber = must(
        GrabberBuilder::new(GrabberConfig::default())
            .pose_source(FixedPose(StylusPose::at(Vec3::ZERO)))
            .capture_service(FixedCapture::new(Vec3::ZERO))
            .force_sink(NullForceSink)
            .curve(linear_curve())
            .build(),
    );

    let guard = track();
    for _ in 0..100 {
        std::hint::black_box(grabber.tick(0.001));
    }
    assert_rt_safe!(guard, "idle tick");
}
