/// Example: Print the stereo matrices for one tracker reading
///
/// Usage: cargo run --example print_frustum -- [x y z]
///
/// Uses a 3 m tall screen 10 m away and prints column-major matrices, the
/// order glLoadMatrixf expects.
use std::env;

use anyhow::{bail, Context};
use ftvr_core::{compute_stereo_frustum, Eye, ViewerPose, DEFAULT_PUPIL_DISTANCE};
use nalgebra::{Point3, Vector3};

fn print_matrix(label: &str, m: &[f32; 16]) {
    println!("{label}:");
    for row in 0..4 {
        let cells: Vec<String> = (0..4).map(|col| format!("{:>10.4}", m[col * 4 + row])).collect();
        println!("  {}", cells.join(" "));
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<f32> = env::args()
        .skip(1)
        .map(|arg| arg.parse().with_context(|| format!("not a number: {arg}")))
        .collect::<anyhow::Result<_>>()?;

    let viewer = match args.as_slice() {
        [] => ViewerPose::new(0.0, 0.0, -0.4),
        [x, y, z] => ViewerPose::new(*x, *y, *z),
        _ => bail!("expected zero or three coordinates"),
    };

    let result = compute_stereo_frustum(
        &viewer,
        None,
        None,
        10.0,
        3.0,
        DEFAULT_PUPIL_DISTANCE,
        false,
        &Point3::new(0.1, 0.1, -0.1),
        &Vector3::new(0.0, 0.0, -1.0),
    )
    .map_err(|e| anyhow::anyhow!("frustum rejected (status {}): {e}", e.code()))?;

    for eye in Eye::BOTH {
        let frame = result.eye(eye);
        println!("== {eye:?} eye at {:?}", frame.position.coords.as_slice());
        print_matrix("view", &frame.view_column_major());
        print_matrix("projection", &frame.projection_column_major());
    }

    let pointer = result.pointer_world;
    println!(
        "== pointer (world) at {:?} towards {:?}",
        pointer.position.coords.as_slice(),
        pointer.direction.as_slice()
    );
    Ok(())
}
