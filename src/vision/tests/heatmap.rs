use crate::assert_err;
use crate::data::DataError;
use crate::tensor::Tensor;
use crate::vision::calculate_heatmap;
use approx::assert_relative_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_heatmap_of_arange_volume() {
    let volume = Tensor::new_arange(&[1, 5, 5, 5]);
    let heatmap = calculate_heatmap(&volume, &[2, 2, 2]).unwrap();
    let probabilities = heatmap.probabilities();
    assert_eq!(probabilities.shape(), &[5, 5, 5]);

    // 窗口为2时合法的中心为每个轴上的[1, 4]
    let mut z = 0.0;
    for x in 1..5 {
        for y in 1..5 {
            for w in 1..5 {
                z += volume[[0, x, y, w]];
            }
        }
    }
    assert_relative_eq!(heatmap.normalizer(), z, max_relative = 1e-6);
    for x in 0..5 {
        for y in 0..5 {
            for w in 0..5 {
                let expected = if x >= 1 && y >= 1 && w >= 1 {
                    volume[[0, x, y, w]] / z
                } else {
                    0.0
                };
                assert_relative_eq!(probabilities[[x, y, w]], expected, epsilon = 1e-7);
            }
        }
    }
    assert_relative_eq!(probabilities.sum(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_heatmap_sums_channels_and_ignores_negatives() {
    let mut volume = Tensor::zeros(&[2, 3, 3, 3]);
    volume[[0, 1, 1, 1]] = 1.0;
    volume[[1, 1, 1, 1]] = 2.0;
    volume[[0, 1, 1, 2]] = -5.0;
    volume[[1, 1, 1, 2]] = 1.0;
    let heatmap = calculate_heatmap(&volume, &[1, 1, 1]).unwrap();
    assert_relative_eq!(heatmap.normalizer(), 4.0);
    assert_relative_eq!(heatmap.probabilities()[[1, 1, 1]], 0.75);
    assert_relative_eq!(heatmap.probabilities()[[1, 1, 2]], 0.25);
}

#[test]
fn test_sampling_follows_concentrated_weight() {
    let mut volume = Tensor::zeros(&[1, 5, 5, 5]);
    volume[[0, 3, 3, 3]] = 5.0;
    let heatmap = calculate_heatmap(&volume, &[2, 2, 2]).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        // 唯一有权重的中心为(3, 3, 3)，窗口起点为中心减去窗口的一半
        assert_eq!(heatmap.sample_offset(&mut rng), vec![2, 2, 2]);
    }
}

#[test]
fn test_sampling_never_picks_zero_weight_centers() {
    let mut volume = Tensor::zeros(&[1, 6, 6, 6]);
    volume[[0, 2, 2, 2]] = 1.0;
    volume[[0, 4, 3, 2]] = 3.0;
    let heatmap = calculate_heatmap(&volume, &[3, 3, 3]).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let mut counts = [0usize; 2];
    for _ in 0..400 {
        match heatmap.sample_offset(&mut rng).as_slice() {
            [1, 1, 1] => counts[0] += 1,
            [3, 2, 1] => counts[1] += 1,
            other => panic!("抽到了权重为0的窗口：{:?}", other),
        }
    }
    assert!(counts[0] > 0 && counts[1] > counts[0]);
}

#[test]
fn test_zero_weight_falls_back_to_uniform() {
    let mut volume = Tensor::zeros(&[1, 4, 4, 4]);
    // 唯一的正值不在合法中心内，相当于全零
    volume[[0, 0, 0, 0]] = 9.0;
    let heatmap = calculate_heatmap(&volume, &[2, 2, 2]).unwrap();
    assert_eq!(heatmap.normalizer(), 0.0);
    assert_relative_eq!(heatmap.probabilities().sum(), 1.0, epsilon = 1e-6);
    assert_relative_eq!(heatmap.probabilities()[[1, 1, 1]], 1.0 / 27.0);

    let mut rng = StdRng::seed_from_u64(3);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..2000 {
        let offset = heatmap.sample_offset(&mut rng);
        assert!(offset.iter().all(|&o| o <= 2));
        seen.insert(offset);
    }
    assert_eq!(seen.len(), 27);
}

#[test]
fn test_heatmap_is_deterministic() {
    let volume = Tensor::new_arange(&[2, 4, 5, 6]);
    let first = calculate_heatmap(&volume, &[3, 2, 4]).unwrap();
    let second = calculate_heatmap(&volume, &[3, 2, 4]).unwrap();
    assert_eq!(first.probabilities(), second.probabilities());
    assert_eq!(first.window(), &[3, 2, 4]);
}

#[test]
fn test_heatmap_errors() {
    let volume = Tensor::zeros(&[1, 4, 4, 4]);
    assert_err!(
        calculate_heatmap(&volume, &[5, 2, 2]).map(|_| ()),
        DataError::WindowTooLarge { .. }
    );
    assert_err!(
        calculate_heatmap(&Tensor::zeros(&[4, 4, 4]), &[2, 2, 2]).map(|_| ()),
        DataError::UnsupportedContainer(_)
    );
    assert_err!(
        calculate_heatmap(&volume, &[2, 2]).map(|_| ()),
        DataError::UnsupportedContainer(_)
    );
}

#[test]
fn test_zero_window_is_config_error() {
    assert_err!(
        calculate_heatmap(&Tensor::zeros(&[1, 4, 4, 4]), &[0, 2, 2]).map(|_| ()),
        DataError::Config(_)
    );
}

#[test]
fn test_infinite_weight_is_rejected() {
    let mut volume = Tensor::zeros(&[1, 4, 4, 4]);
    volume[[0, 1, 1, 1]] = f32::INFINITY;
    assert_err!(
        calculate_heatmap(&volume, &[2, 2, 2]).map(|_| ()),
        DataError::InvalidWeight(_)
    );
    // 无穷大落在合法中心之外时不参与归一化
    let mut outside = Tensor::zeros(&[1, 4, 4, 4]);
    outside[[0, 0, 0, 0]] = f32::INFINITY;
    outside[[0, 2, 2, 2]] = 1.0;
    let heatmap = calculate_heatmap(&outside, &[2, 2, 2]).unwrap();
    assert_eq!(heatmap.normalizer(), 1.0);
}
