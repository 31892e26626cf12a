// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/mask.rs - 实例掩码重建
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::{
  GrayImage, Luma,
  imageops::{self, FilterType},
};
use ndarray::{Array2, ArrayView1, ArrayView3, Axis};

pub const MASK_FOREGROUND: u8 = 255;
pub const MASK_BACKGROUND: u8 = 0;

/// 以掩码系数线性组合原型平面，得到 (H', W') 的掩码概率图
///
/// 等价于 (H'·W', P) 矩阵与长度为 P 的系数向量相乘。
/// 调用方保证 `coefficients.len()` 与平面数量一致。
pub fn combine(prototypes: ArrayView3<'_, f32>, coefficients: ArrayView1<'_, f32>) -> Array2<f32> {
  let (_, mask_h, mask_w) = prototypes.dim();
  let mut combined = Array2::<f32>::zeros((mask_h, mask_w));
  for (plane, &weight) in prototypes.axis_iter(Axis(0)).zip(coefficients.iter()) {
    combined.scaled_add(weight, &plane);
  }
  combined
}

/// 严格大于 `threshold` 的位置记为前景 (255)，其余为 0
pub fn binarize(combined: &Array2<f32>, threshold: f32) -> GrayImage {
  let (mask_h, mask_w) = combined.dim();
  GrayImage::from_fn(mask_w as u32, mask_h as u32, |x, y| {
    if combined[[y as usize, x as usize]] > threshold {
      Luma([MASK_FOREGROUND])
    } else {
      Luma([MASK_BACKGROUND])
    }
  })
}

/// 重建单个检测的二值掩码，并缩放到原图尺寸
///
/// 使用最近邻插值，保证结果仍然只含 0 与 255。
pub fn reconstruct(
  prototypes: ArrayView3<'_, f32>,
  coefficients: ArrayView1<'_, f32>,
  threshold: f32,
  original_width: u32,
  original_height: u32,
) -> GrayImage {
  let combined = combine(prototypes, coefficients);
  let mask = binarize(&combined, threshold);
  if mask.dimensions() == (original_width, original_height) {
    return mask;
  }
  imageops::resize(&mask, original_width, original_height, FilterType::Nearest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::{Array1, Array3, array};

  #[test]
  fn test_combine_is_linear() {
    let prototypes = Array3::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 10.0, 20.0]).unwrap();
    let coefficients = array![0.5, 0.25];
    let combined = combine(prototypes.view(), coefficients.view());
    assert_eq!(combined, array![[3.0, 6.0]]);
  }

  #[test]
  fn test_constant_combination_fills_mask() {
    let prototypes = Array3::<f32>::ones((32, 40, 40));
    let mut coefficients = Array1::<f32>::zeros(32);
    coefficients[3] = 0.8;
    let mask = reconstruct(prototypes.view(), coefficients.view(), 0.5, 100, 60);
    assert_eq!(mask.dimensions(), (100, 60));
    assert!(mask.pixels().all(|p| p.0[0] == MASK_FOREGROUND));
  }

  #[test]
  fn test_below_threshold_is_background() {
    let prototypes = Array3::<f32>::ones((4, 8, 8));
    let coefficients = Array1::from_elem(4, 0.125);
    // 组合值恰为 0.5，不严格大于阈值
    let mask = reconstruct(prototypes.view(), coefficients.view(), 0.5, 16, 16);
    assert!(mask.pixels().all(|p| p.0[0] == MASK_BACKGROUND));
  }

  #[test]
  fn test_resize_keeps_mask_binary() {
    let mut prototypes = Array3::<f32>::zeros((1, 4, 4));
    prototypes[[0, 1, 1]] = 1.0;
    prototypes[[0, 1, 2]] = 1.0;
    prototypes[[0, 2, 1]] = 1.0;
    prototypes[[0, 2, 2]] = 1.0;
    let mask = reconstruct(prototypes.view(), array![1.0].view(), 0.5, 37, 23);
    assert_eq!(mask.dimensions(), (37, 23));
    assert!(
      mask
        .pixels()
        .all(|p| p.0[0] == MASK_FOREGROUND || p.0[0] == MASK_BACKGROUND)
    );
    assert!(mask.pixels().any(|p| p.0[0] == MASK_FOREGROUND));
  }
}
