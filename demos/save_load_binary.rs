use online_mlp::{Mlp, RngSource, Samples, TrainConfig};

fn main() -> online_mlp::Result<()> {
    env_logger::init();

    let x = Samples::from_columns(&[
        vec![-1.0, -1.0],
        vec![-1.0, 1.0],
        vec![1.0, -1.0],
        vec![1.0, 1.0],
    ])?;
    let y = Samples::from_scalars(&[-1.0, 1.0, 1.0, -1.0])?;

    let mut mlp = Mlp::new_with_seed(&[2, 4, 1], true, 0)?;
    mlp.train(
        &x,
        &y,
        &TrainConfig {
            num_iter: 5000,
            learning_rate: 0.05,
            train_proportion: 1.0,
            error_list_size: 5,
            rng: RngSource::Seeded(0),
        },
    )?;

    let path = "target/tmp_mlp.bin";
    mlp.save(path)?;

    let mut loaded = Mlp::load(path)?;
    let before = mlp.predict_batch(&x)?;
    let after = loaded.predict_batch(&x)?;
    assert_eq!(before, after);
    println!("saved and loaded model: {path}");
    Ok(())
}
