//! Snapshot tests for curve evaluation and error messages using insta.

use insta::assert_snapshot;
use openhaptic_curves::{CurveError, CurveScale, CurveTable};

fn sample_grid(table: &CurveTable, from: f32, to: f32, steps: usize) -> String {
    (0..=steps)
        .map(|i| {
            let x = from + (to - from) * i as f32 / steps as f32;
            format!("{:.2}", table.evaluate(x))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn snapshot_stiffening_curve() -> Result<(), CurveError> {
    let table = CurveTable::from_pairs(&[(0.0, 0.0), (0.1, 0.5), (0.2, 2.0), (0.3, 6.0)])?;
    assert_snapshot!(
        sample_grid(&table, -0.05, 0.35, 8),
        @"0.00 0.00 0.25 0.50 1.25 2.00 4.00 6.00 6.00"
    );
    Ok(())
}

#[test]
fn snapshot_scaled_curve() -> Result<(), CurveError> {
    let table = CurveTable::from_pairs(&[(0.0, 0.0), (10.0, 1.0)])?
        .with_scale(CurveScale::new(1000.0, 8.0)?);
    assert_snapshot!(sample_grid(&table, 0.0, 0.01, 4), @"0.00 2.00 4.00 6.00 8.00");
    Ok(())
}

#[test]
fn snapshot_error_messages() {
    assert_snapshot!(
        CurveError::TooFewSamples { found: 0 }.to_string(),
        @"Not enough points in curve: need at least 2, found 0"
    );
    assert_snapshot!(
        CurveError::InvalidScale { axis: "x", value: 0.0 }.to_string(),
        @"Invalid x scale 0: must be finite and positive"
    );
    assert_snapshot!(
        CurveError::Source("tissue.csv not found".to_string()).to_string(),
        @"Curve source failed: tissue.csv not found"
    );
}
