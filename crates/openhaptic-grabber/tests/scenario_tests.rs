//! End-to-end force scenarios through the full tick driver.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use openhaptic_filters::GateDecision;
use openhaptic_grabber::{ForceSource, GrabState, GrabberConfig, StylusPose, TickReport, Transition};
use openhaptic_test_helpers::prelude::*;

const DT: f32 = 0.001;

fn scalars(reports: &[TickReport]) -> Vec<f32> {
    reports.iter().map(TickReport::force_scalar).collect()
}

#[test]
fn linear_ramp_reaches_curve_end_at_full_strain() {
    let mut rig = Rig::new(GrabberConfig::default());
    let path = LinearTrajectory::pull_x(0.03, 1000);

    let reports = rig.run(path.poses(), DT);
    assert_eq!(reports.len(), 1001);
    assert_eq!(
        reports.first().map(|r| r.transition),
        Some(Transition::Began(openhaptic_grabber::ParticleHandle(0)))
    );

    for (i, report) in reports.iter().enumerate() {
        let expected = 5.0 * i as f32 / 1000.0;
        assert_approx_eq!(report.force_scalar(), expected, 1e-3, "tick {i}");
    }
    let last = must_some(reports.last(), "ramp produced reports");
    assert_approx_eq!(last.force_scalar(), 5.0, 1e-4);
    assert_non_decreasing!(&scalars(&reports));
}

#[test]
fn command_pushes_back_along_the_pull() {
    let mut rig = Rig::new(GrabberConfig::default());
    let reports = rig.run(LinearTrajectory::pull_x(0.015, 100).poses(), DT);

    let last = must_some(reports.last(), "reports");
    assert_eq!(last.decision(), Some(GateDecision::Accept));
    // strain 0.5 -> force 2.5, scaled by force_coef 0.05 and reversed.
    assert_approx_eq!(last.command().x, -0.125, 1e-4);
    assert_approx_eq!(last.command().y, 0.0, 1e-6);
    assert_eq!(rig.sink.last_force(), Some(last.command()));
}

#[test]
fn first_moving_tick_is_held_then_the_gate_opens() {
    let mut rig = Rig::new(GrabberConfig::default());
    let reports = rig.run(LinearTrajectory::pull_x(0.003, 3).poses(), DT);
    let decisions: Vec<Option<GateDecision>> = reports.iter().map(TickReport::decision).collect();
    assert_eq!(
        decisions,
        [
            Some(GateDecision::Hold),
            Some(GateDecision::Hold),
            Some(GateDecision::Accept),
            Some(GateDecision::Accept),
        ]
    );
    let first = must_some(reports.first(), "reports");
    assert_eq!(first.command(), Vec3::ZERO);
}

#[test]
fn nonlinear_curve_stays_monotone() {
    let mut rig = Rig::with_parts(
        GrabberConfig::default(),
        tissue_curve(),
        RecordingTelemetry::basic(),
    );
    let reports = rig.run(LinearTrajectory::pull_x(0.03, 300).poses(), DT);
    let forces = scalars(&reports);
    assert_non_decreasing!(&forces);
    assert_approx_eq!(*must_some(forces.last(), "forces"), 4.0, 1e-3);
}

#[test]
fn strain_beyond_the_curve_is_flat() {
    let mut rig = Rig::new(GrabberConfig::default());
    let reports = rig.run(LinearTrajectory::pull_x(0.09, 90).poses(), DT);
    let last = must_some(reports.last(), "reports");
    assert_approx_eq!(last.force_scalar(), 5.0, 1e-5);
}

#[test]
fn displacement_mode_feeds_raw_distance() {
    let config = GrabberConfig {
        x_is_strain: false,
        ..GrabberConfig::default()
    };
    let mut rig = Rig::new(config);
    let reports = rig.run(LinearTrajectory::pull_x(0.2, 20).poses(), DT);
    let last = must_some(reports.last(), "reports");
    assert_approx_eq!(last.force_scalar(), 1.0, 1e-4);
}

#[test]
fn prony_overstress_relaxes_to_the_quasi_static_force() {
    let mut config = GrabberConfig::default();
    config.prony.enabled = true;
    config.prony.stiffness = vec![2.0];
    config.prony.tau = vec![0.05];
    let mut rig = Rig::new(config);

    // Step to strain 0.5 and hold for twenty time constants.
    rig.press();
    let hold = std::iter::repeat_n(
        StylusPose::at(Vec3::new(0.015, 0.0, 0.0)).with_button(true),
        1000,
    );
    let reports = rig.run(hold, DT);
    let forces = scalars(&reports);

    let peak = *must_some(forces.first(), "forces");
    assert!(peak > 3.0, "peak {peak} should overshoot 2.5");
    for pair in forces.windows(2) {
        if let [a, b] = pair {
            assert!(b <= a, "overstress should only relax: {a} -> {b}");
        }
    }
    assert_approx_eq!(*must_some(forces.last(), "forces"), 2.5, 1e-3);
}

#[test]
fn prony_step_and_hold_matches_closed_form() {
    let mut config = GrabberConfig::default();
    config.prony.enabled = true;
    config.prony.stiffness = vec![2.0];
    config.prony.tau = vec![0.1];
    let mut rig = Rig::new(config);

    rig.press();
    let reports = rig.run(
        std::iter::repeat_n(StylusPose::at(Vec3::new(0.015, 0.0, 0.0)).with_button(true), 100),
        DT,
    );
    // K * x * a^n with a = exp(-dt / tau), after n updates at the new strain.
    let a = (-DT / 0.1_f32).exp();
    for (n, report) in reports.iter().enumerate() {
        let expected = 2.5 + 2.0 * 0.5 * a.powi(n as i32 + 1);
        assert_approx_eq!(report.force_scalar(), expected, 1e-4, "tick {n}");
    }
}

#[test]
fn viscous_term_adds_rate_force_during_the_ramp() {
    let mut config = GrabberConfig::default();
    config.visco.enabled = true;
    config.visco.eta = 1.0;
    let mut rig = Rig::new(config);

    // Strain rate is 1.0 per second along the whole ramp.
    let reports = rig.run(LinearTrajectory::pull_x(0.03, 1000).poses(), DT);
    for (i, report) in reports.iter().enumerate().skip(1) {
        let expected = 5.0 * i as f32 / 1000.0 + 1.0;
        assert_approx_eq!(report.force_scalar(), expected, 1e-2, "tick {i}");
    }
}

#[test]
fn response_filter_lags_a_step() {
    let mut config = GrabberConfig::default();
    config.visco.tau = 0.01;
    let mut rig = Rig::new(config);

    rig.press();
    let reports = rig.run(
        std::iter::repeat_n(StylusPose::at(Vec3::new(0.015, 0.0, 0.0)).with_button(true), 200),
        DT,
    );
    let forces = scalars(&reports);
    let first = *must_some(forces.first(), "forces");
    assert!(first < 0.5, "first filtered tick {first} should lag");
    assert_non_decreasing!(&forces);
    assert_approx_eq!(*must_some(forces.last(), "forces"), 2.5, 1e-3);
}

#[test]
fn device_rotation_maps_the_command_into_the_device_frame() {
    let mut rig = Rig::new(GrabberConfig::default());
    let rotation = Quat::from_rotation_z(FRAC_PI_2);
    let poses = LinearTrajectory::pull_x(0.015, 10)
        .poses()
        .map(|pose| pose.with_rotation(rotation))
        .collect::<Vec<_>>();

    let reports = rig.run(poses, DT);
    let last = must_some(reports.last(), "reports");
    // World +x is device -y; the command opposes it.
    assert_approx_eq!(last.command().x, 0.0, 1e-5);
    assert_approx_eq!(last.command().y, 0.125, 1e-4);
}

#[test]
fn physics_mode_follows_the_engine_and_holds_on_failure() {
    let config = GrabberConfig {
        force_source: ForceSource::Physics,
        ..GrabberConfig::default()
    };
    let mut rig = Rig::new(config);
    rig.capture.set_engine_force(Vec3::new(0.0, 3.0, 0.0));

    let reports = rig.run(
        std::iter::repeat_n(StylusPose::at(Vec3::ZERO).with_button(true), 3),
        DT,
    );
    let last = must_some(reports.last(), "reports");
    assert_eq!(last.decision(), Some(GateDecision::Accept));
    assert_approx_eq!(last.command().y, -0.15, 1e-6);
    assert_approx_eq!(last.force_scalar(), 3.0, 1e-6);

    rig.capture.fail_engine(true);
    let held = rig.run([StylusPose::at(Vec3::ZERO).with_button(true)], DT);
    let held = must_some(held.first(), "reports");
    assert_eq!(held.decision(), Some(GateDecision::Hold));
    assert_eq!(held.command(), last.command());
    assert_eq!(held.state, GrabState::Grabbing);
}

#[test]
fn switching_to_physics_at_runtime() {
    let mut rig = Rig::new(GrabberConfig::default());
    rig.run(LinearTrajectory::pull_x(0.015, 10).poses(), DT);

    rig.grabber.set_force_source(ForceSource::Physics);
    rig.capture.set_engine_force(Vec3::new(-1.0, 0.0, 0.0));
    let reports = rig.run(
        std::iter::repeat_n(StylusPose::at(Vec3::new(0.015, 0.0, 0.0)).with_button(true), 2),
        DT,
    );
    let last = must_some(reports.last(), "reports");
    assert_approx_eq!(last.force_scalar(), 1.0, 1e-6);
}

#[test]
fn missing_curve_grabs_with_zero_force() {
    let mut rig = Rig::with_parts(
        GrabberConfig::default(),
        openhaptic_curves::SharedCurve::empty(),
        RecordingTelemetry::basic(),
    );
    let reports = rig.run(LinearTrajectory::pull_x(0.03, 10).poses(), DT);
    assert!(reports.iter().all(|r| r.state == GrabState::Grabbing));
    assert!(reports.iter().all(|r| r.force_scalar().abs() < f32::EPSILON));
    assert_eq!(rig.sink.last_force(), Some(Vec3::ZERO));
}

#[test]
fn curve_reload_takes_effect_on_the_next_tick() {
    let mut rig = Rig::new(GrabberConfig::default());
    rig.run(LinearTrajectory::pull_x(0.015, 10).poses(), DT);

    let steeper = openhaptic_curves::StaticCurveSource::from_pairs(
        "steep",
        &[(0.0, 0.0), (1.0, 10.0)],
    );
    must(rig.grabber.reload_curve(&steeper));
    let reports = rig.run(
        [StylusPose::at(Vec3::new(0.015, 0.0, 0.0)).with_button(true)],
        DT,
    );
    let report = must_some(reports.first(), "reports");
    assert_approx_eq!(report.force_scalar(), 5.0, 1e-4);
}
