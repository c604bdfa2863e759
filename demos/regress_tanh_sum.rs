use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use online_mlp::{Mlp, RngSource, Samples, TrainConfig};

fn main() -> online_mlp::Result<()> {
    env_logger::init();

    // Task: learn y = tanh(x0 + x1) with a linear output layer.
    let mut rng = StdRng::seed_from_u64(1);
    let dist = Uniform::new(-1.0_f64, 1.0_f64);

    let mut xs = Vec::with_capacity(2 * 320);
    let mut ys = Vec::with_capacity(320);
    for _ in 0..320 {
        let x0 = dist.sample(&mut rng);
        let x1 = dist.sample(&mut rng);
        xs.extend_from_slice(&[x0, x1]);
        ys.push((x0 + x1).tanh());
    }
    let x = Samples::from_flat(xs, 2)?;
    let y = Samples::from_flat(ys, 1)?;

    let mut mlp = Mlp::new_with_seed(&[2, 8, 1], false, 0)?;
    let report = mlp.train(
        &x,
        &y,
        &TrainConfig {
            num_iter: 20_000,
            learning_rate: 0.01,
            train_proportion: 0.8,
            error_list_size: 20,
            rng: RngSource::Seeded(2),
        },
    )?;

    println!(
        "train_mse={:.6} test_mse={:.6} full_mse={:.6}",
        report.train_errors.last().copied().unwrap_or_default(),
        report.test_errors.last().copied().unwrap_or_default(),
        mlp.evaluate_mse(&x, &y)?
    );
    Ok(())
}
