#[cfg(not(feature = "serde"))]
fn main() {
    println!("enable the `serde` feature: cargo run --example save_load_json --features serde");
}

#[cfg(feature = "serde")]
fn main() -> online_mlp::Result<()> {
    use online_mlp::{Mlp, RngSource, Samples, TrainConfig};

    let x = Samples::from_columns(&[vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 1.0]])?;
    let y = Samples::from_scalars(&[1.0, 1.0, -1.0])?;

    // Training settings can come from JSON as well.
    let cfg: TrainConfig = serde_json::from_str(
        r#"{"num_iter": 500, "learning_rate": 0.1, "rng": {"kind": "seeded", "seed": 3}}"#,
    )
    .map_err(|e| online_mlp::Error::InvalidConfig(format!("bad config json: {e}")))?;

    let mut mlp = Mlp::new_with_seed(&[2, 2, 1], true, 0)?;
    mlp.train(&x, &y, &cfg)?;

    let path = "target/tmp_mlp.json";
    mlp.save_json(path)?;

    let loaded = Mlp::load_json(path)?;
    let _ = loaded;
    println!("saved and loaded model: {path}");
    Ok(())
}
