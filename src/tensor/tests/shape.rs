use crate::tensor::Tensor;

#[test]
fn test_permute_hwc_to_chw() {
    // [H=2, W=2, C=3]
    let tensor = Tensor::new_arange(&[2, 2, 3]);
    let chw = tensor.permute(&[2, 0, 1]);
    assert_eq!(chw.shape(), &[3, 2, 2]);
    for c in 0..3 {
        for h in 0..2 {
            for w in 0..2 {
                assert_eq!(chw[[c, h, w]], tensor[[h, w, c]]);
            }
        }
    }
}

#[test]
#[should_panic(expected = "需要交换的维度必须是唯一且在[0, <张量维数>)范围内")]
fn test_permute_repeated_axes() {
    Tensor::new_arange(&[2, 2, 3]).permute(&[0, 0, 1]);
}

#[test]
fn test_unsqueeze() {
    let tensor = Tensor::new_arange(&[4, 7]);
    let unsqueezed = tensor.unsqueeze(0);
    assert_eq!(unsqueezed.shape(), &[1, 4, 7]);
    assert_eq!(unsqueezed.to_vec(), tensor.to_vec());
}

#[test]
fn test_flip_last_and_second_last() {
    // [[0, 1, 2],
    //  [3, 4, 5]]
    let tensor = Tensor::new_arange(&[2, 3]);
    assert_eq!(tensor.flip(1).to_vec(), vec![2.0, 1.0, 0.0, 5.0, 4.0, 3.0]);
    assert_eq!(tensor.flip(0).to_vec(), vec![3.0, 4.0, 5.0, 0.0, 1.0, 2.0]);
    // 翻转两次等于没有翻转
    assert_eq!(tensor.flip(1).flip(1), tensor);
}

#[test]
fn test_stack_and_unstack() {
    let a = Tensor::new_arange(&[3, 2]);
    let b = Tensor::zeros(&[3, 2]);
    let stacked = Tensor::stack(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(stacked.shape(), &[2, 3, 2]);
    assert_eq!(stacked.unstack(), vec![a.clone(), b]);
    assert_eq!(stacked.select_first(0), a);

    let selected = stacked.select_many(&[1, 1, 0]);
    assert_eq!(selected.shape(), &[3, 3, 2]);
    assert_eq!(selected.select_first(2), a);
}

#[test]
fn test_stack_inconsistent_shape() {
    let a = Tensor::zeros(&[3, 2]);
    let b = Tensor::zeros(&[2, 3]);
    assert!(Tensor::stack(&[a, b]).is_err());
}
