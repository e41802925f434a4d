//! Property-based tests for the pipeline and the grab state machine.

use glam::{Quat, Vec3};
use openhaptic_curves::CurveTable;
use openhaptic_filters::GateDecision;
use openhaptic_grabber::prelude::*;
use openhaptic_test_helpers::prelude::*;
use proptest::prelude::*;
use quickcheck_macros::quickcheck;

fn arb_position() -> impl Strategy<Value = Vec3> {
    (-0.05f32..0.05, -0.05f32..0.05, -0.05f32..0.05).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_config() -> impl Strategy<Value = GrabberConfig> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        0.0f32..5.0,
        0.0f32..0.05,
        0.0f32..180.0,
        0.001f32..0.1,
    )
        .prop_map(|(strain, visco, prony, eta, tau, angle, thickness)| {
            let mut config = GrabberConfig {
                x_is_strain: strain,
                smooth_angle_deg: angle,
                thickness,
                ..GrabberConfig::default()
            };
            config.visco.enabled = visco;
            config.visco.eta = eta;
            config.visco.tau = tau;
            config.prony.enabled = prony;
            config.prony.stiffness = vec![1.5, 0.5];
            config.prony.tau = vec![0.02, 0.2];
            config
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_force_is_unilateral_and_finite(
        config in arb_config(),
        path in prop::collection::vec(arb_position(), 1..60),
        dt in 0.0f32..0.02,
    ) {
        let pipeline = ForcePipeline::new(PipelineSettings::from_config(&config));
        let mut memory = PipelineMemory::new(&config);
        let curve = must(CurveTable::from_pairs(&[(0.0, 0.0), (0.5, 1.0), (1.0, 5.0)]));

        for stylus in path {
            let input = ForceInput {
                stylus,
                device_rotation: Quat::IDENTITY,
                anchor: Vec3::ZERO,
                thickness: config.thickness,
                dt,
            };
            let out = pipeline.compute_curve(&mut memory, Some(&curve), &input);
            prop_assert!(out.force_scalar >= 0.0, "negative force {}", out.force_scalar);
            prop_assert!(out.command.is_finite());
            prop_assert!(out.command_world.is_finite());
            prop_assert!(out.dt > 0.0);
        }
    }

    #[test]
    fn prop_command_opposes_the_displacement(
        stylus in arb_position().prop_filter("away from anchor", |p| p.length() > 1e-3),
    ) {
        let config = GrabberConfig::default();
        let pipeline = ForcePipeline::new(PipelineSettings::from_config(&config));
        let mut memory = PipelineMemory::new(&config);
        let curve = must(CurveTable::from_pairs(&[(0.0, 0.0), (1.0, 5.0)]));
        let input = ForceInput {
            stylus,
            device_rotation: Quat::IDENTITY,
            anchor: Vec3::ZERO,
            thickness: 0.03,
            dt: 0.001,
        };

        // Second tick in the same direction passes the gate.
        let _ = pipeline.compute_curve(&mut memory, Some(&curve), &input);
        let out = pipeline.compute_curve(&mut memory, Some(&curve), &input);
        prop_assert_eq!(out.decision, GateDecision::Accept);
        prop_assert!(out.command.dot(stylus) < 0.0);
    }

    #[test]
    fn prop_held_ticks_repeat_the_last_accepted_command(
        path in prop::collection::vec(arb_position(), 2..40),
    ) {
        let config = GrabberConfig {
            smooth_angle_deg: 30.0,
            ..GrabberConfig::default()
        };
        let pipeline = ForcePipeline::new(PipelineSettings::from_config(&config));
        let mut memory = PipelineMemory::new(&config);
        let curve = must(CurveTable::from_pairs(&[(0.0, 0.0), (1.0, 5.0)]));

        let mut last_accepted = Vec3::ZERO;
        for stylus in path {
            let input = ForceInput {
                stylus,
                device_rotation: Quat::IDENTITY,
                anchor: Vec3::ZERO,
                thickness: 0.03,
                dt: 0.001,
            };
            let out = pipeline.compute_curve(&mut memory, Some(&curve), &input);
            match out.decision {
                GateDecision::Accept => last_accepted = out.command,
                GateDecision::Hold => prop_assert_eq!(out.command, last_accepted),
            }
        }
    }

    #[test]
    fn prop_sanitized_config_is_clean(
        sensitivity in prop::num::f32::ANY,
        coef in prop::num::f32::ANY,
        angle in prop::num::f32::ANY,
        thickness in prop::num::f32::ANY,
        stiffness in prop::collection::vec(prop::num::f32::ANY, 0..4),
        taus in prop::collection::vec(prop::num::f32::ANY, 0..4),
    ) {
        let mut config = GrabberConfig {
            grab_sensitivity: sensitivity,
            force_coef: coef,
            smooth_angle_deg: angle,
            thickness,
            ..GrabberConfig::default()
        };
        config.prony.stiffness = stiffness;
        config.prony.tau = taus;

        let clean = config.sanitized();
        prop_assert!(clean.diagnostics().is_empty(), "{:?}", clean.diagnostics());
        prop_assert_eq!(clean.prony.stiffness.len(), clean.prony.tau.len());
    }
}

/// Run a button script against a rig with one particle at the origin.
fn run_buttons(buttons: &[bool], drop_at: Option<usize>) -> Rig {
    let mut rig = Rig::new(GrabberConfig::default());
    for (i, &button) in buttons.iter().enumerate() {
        if drop_at == Some(i) {
            rig.capture.drop_particle();
        }
        rig.pose.push(StylusPose::at(Vec3::ZERO).with_button(button));
        let report = rig.grabber.tick(0.001);
        if report.state == GrabState::Grabbing && rig.capture.captured().is_none() {
            return rig;
        }
    }
    rig
}

#[quickcheck]
fn prop_grabbing_implies_a_captured_particle(buttons: Vec<bool>, drop_at: Option<u8>) -> bool {
    let rig = run_buttons(&buttons, drop_at.map(usize::from));
    !rig.grabber.is_grabbing() || rig.capture.captured().is_some()
}

#[quickcheck]
fn prop_visual_alternates(buttons: Vec<bool>, drop_at: Option<u8>) -> bool {
    let rig = run_buttons(&buttons, drop_at.map(usize::from));
    let states = rig.visual.states();
    let alternates = states
        .iter()
        .enumerate()
        .all(|(i, &active)| active == (i % 2 == 0));
    let ends_right = states.last().copied().unwrap_or(false) == rig.grabber.is_grabbing();
    alternates && ends_right
}

#[quickcheck]
fn prop_every_release_zeroes_the_device(buttons: Vec<bool>) -> bool {
    let rig = run_buttons(&buttons, None);
    let releases = rig
        .sink
        .events()
        .iter()
        .filter(|e| matches!(e, DeviceEvent::Release(_)))
        .count();
    let zero_writes = rig.sink.forces().iter().filter(|f| **f == Vec3::ZERO).count();
    releases == rig.capture.releases() && zero_writes >= releases
}
