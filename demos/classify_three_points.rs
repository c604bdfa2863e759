use online_mlp::{Mlp, RngSource, Samples, TrainConfig};

fn main() -> online_mlp::Result<()> {
    env_logger::init();

    // Three 2D points, two labelled +1 and one -1.
    let x = Samples::from_columns(&[vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 1.0]])?;
    let y = Samples::from_scalars(&[1.0, 1.0, -1.0])?;

    let mut mlp = Mlp::new_with_seed(&[2, 2, 1], true, 0)?;
    let report = mlp.train(
        &x,
        &y,
        &TrainConfig {
            num_iter: 1000,
            learning_rate: 0.1,
            train_proportion: 0.8,
            error_list_size: 10,
            rng: RngSource::Seeded(0),
        },
    )?;

    for (i, (train, test)) in report
        .train_errors
        .iter()
        .zip(&report.test_errors)
        .enumerate()
    {
        println!("checkpoint {i}: train={train:.6} test={test:.6}");
    }

    let preds = mlp.predict_batch(&x)?;
    for (input, pred) in x.columns().zip(preds.columns()) {
        println!("{input:?} => {:.4}", pred[0]);
    }
    Ok(())
}
