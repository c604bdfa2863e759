use std::fs;

use online_mlp::{BiasSlot, Error, Mlp, RngSource, Samples, TrainConfig};

fn trained(is_classification: bool) -> Mlp {
    let x = Samples::from_columns(&[
        vec![0.0, 1.0, 0.5],
        vec![1.0, 0.0, -0.5],
        vec![0.5, 0.5, 0.0],
        vec![-1.0, 0.25, 1.0],
    ])
    .unwrap();
    let y = Samples::from_columns(&[vec![1.0, -1.0], vec![-1.0, 1.0], vec![0.0, 0.0], vec![1.0, 1.0]])
        .unwrap();

    let mut mlp = Mlp::new_with_seed(&[3, 4, 2], is_classification, 21).unwrap();
    mlp.train(
        &x,
        &y,
        &TrainConfig {
            num_iter: 200,
            learning_rate: 0.05,
            train_proportion: 0.75,
            error_list_size: 4,
            rng: RngSource::Seeded(5),
        },
    )
    .unwrap();
    mlp
}

#[test]
fn save_then_load_reproduces_the_model() {
    let dir = tempfile::tempdir().unwrap();
    for is_classification in [true, false] {
        let mut original = trained(is_classification);
        let path = dir.path().join(format!("model_{is_classification}.bin"));
        original.save(&path).unwrap();

        let mut loaded = Mlp::load(&path).unwrap();
        assert_eq!(loaded.topology(), original.topology());
        assert_eq!(loaded.is_classification(), is_classification);
        for l in 1..=original.last_layer() {
            let a = original.weights(l).as_slice();
            let b = loaded.weights(l).as_slice();
            assert!(a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits()));
        }

        let input = [0.3, -0.2, 0.9];
        let p1 = original.predict(&input).unwrap();
        let p2 = loaded.predict(&input).unwrap();
        for (a, b) in p1.iter().zip(&p2) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn overwritten_model_round_trips_when_policy_is_supplied() {
    let x = Samples::from_columns(&[vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 1.0]]).unwrap();
    let y = Samples::from_scalars(&[1.0, 1.0, -1.0]).unwrap();
    let mut original = Mlp::new_with_seed(&[2, 2, 1], true, 0)
        .unwrap()
        .with_bias_slot(BiasSlot::Overwritten);
    original
        .train(
            &x,
            &y,
            &TrainConfig {
                num_iter: 1000,
                learning_rate: 0.1,
                train_proportion: 0.8,
                error_list_size: 10,
                rng: RngSource::Seeded(0),
            },
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overwritten.bin");
    original.save(&path).unwrap();

    let mut loaded = Mlp::load_with_bias_slot(&path, BiasSlot::Overwritten).unwrap();
    assert_eq!(loaded.bias_slot(), BiasSlot::Overwritten);
    for input in [[3.0, 1.0], [1.0, 1.0], [-0.5, 2.0]] {
        let p1 = original.predict(&input).unwrap();
        let p2 = loaded.predict(&input).unwrap();
        assert_eq!(
            p1.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            p2.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            "input {input:?}"
        );
    }

    assert_eq!(Mlp::load(&path).unwrap().bias_slot(), BiasSlot::Pinned);
}

#[test]
fn file_size_matches_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    Mlp::new_with_seed(&[3, 4, 2], true, 0).unwrap().save(&path).unwrap();

    let weights = (3 + 1) * (4 + 1) + (4 + 1) * (2 + 1);
    let expected = 1 + 4 + 3 * 4 + weights * 8;
    assert_eq!(fs::metadata(&path).unwrap().len(), expected as u64);
}

#[test]
fn save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    Mlp::new_with_seed(&[5, 8, 8, 3], true, 0).unwrap().save(&path).unwrap();
    Mlp::new_with_seed(&[1, 1], false, 0).unwrap().save(&path).unwrap();

    let loaded = Mlp::load(&path).unwrap();
    assert_eq!(loaded.topology().as_slice(), &[1, 1]);
    assert!(!loaded.is_classification());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Mlp::load(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "{err}");

    let mlp = Mlp::new_with_seed(&[1, 1], true, 0).unwrap();
    let err = mlp.save(dir.path().join("no/such/dir/model.bin")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "{err}");
}

#[test]
fn failed_reload_leaves_model_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.bin");
    let mut bytes = Vec::new();
    Mlp::new_with_seed(&[2, 3, 1], false, 1)
        .unwrap()
        .write_to(&mut bytes)
        .unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&path, &bytes).unwrap();

    let mut mlp = Mlp::new_with_seed(&[4, 2], true, 7).unwrap();
    let before = mlp.weights(1).clone();

    let err = mlp.reload(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
    assert_eq!(mlp.topology().as_slice(), &[4, 2]);
    assert!(mlp.is_classification());
    assert_eq!(mlp.weights(1), &before);
}

#[test]
fn reload_swaps_in_new_model_and_keeps_bias_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    let source = trained(false);
    source.save(&path).unwrap();

    let mut mlp = Mlp::new_with_seed(&[1, 1], true, 0)
        .unwrap()
        .with_bias_slot(BiasSlot::Overwritten);
    mlp.reload(&path).unwrap();

    assert_eq!(mlp.topology(), source.topology());
    assert!(!mlp.is_classification());
    assert_eq!(mlp.bias_slot(), BiasSlot::Overwritten);
    assert_eq!(mlp.weights(2), source.weights(2));
    for l in 0..=mlp.last_layer() {
        assert_eq!(mlp.activations(l).bias(), 1.0);
    }
}
