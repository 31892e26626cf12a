// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/model.rs - 模型
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

use ndarray::{Array2, Array3, ArrayView1, ArrayView3, Axis};
use thiserror::Error;

use crate::frame::InputTensor;

/// 检测行中掩码系数之前的列数：框(4) + 置信度(1) + 类别(1)
pub const DETECTION_HEAD_COLUMNS: usize = 6;
/// 置信度所在列
pub const CONFIDENCE_COLUMN: usize = 4;
const CLASS_COLUMN: usize = 5;

/// 实例分割模型
///
/// 输入 (1, 3, H, W) 张量，输出检测表与原型掩码。
pub trait SegmentModel {
  type Error;

  fn infer(&self, input: &InputTensor) -> Result<SegmentOutput, Self::Error>;
}

impl<M: SegmentModel + ?Sized> SegmentModel for &M {
  type Error = M::Error;

  fn infer(&self, input: &InputTensor) -> Result<SegmentOutput, Self::Error> {
    (**self).infer(input)
  }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputShapeError {
  #[error("检测表列数不足: 至少需要 {expected} 列, 实际为 {actual} 列")]
  TooFewColumns { expected: usize, actual: usize },
  #[error("掩码系数数量 {coefficients} 与原型平面数量 {planes} 不一致")]
  CoefficientMismatch { coefficients: usize, planes: usize },
  #[error("原型掩码为空: {0:?}")]
  EmptyPrototypes([usize; 3]),
}

/// 一次推理的原始输出
///
/// `detections` 形状为 (N, 6 + P)，`prototypes` 形状为 (P, H', W')。
#[derive(Debug, Clone)]
pub struct SegmentOutput {
  detections: Array2<f32>,
  prototypes: Array3<f32>,
}

impl SegmentOutput {
  pub fn new(detections: Array2<f32>, prototypes: Array3<f32>) -> Result<Self, OutputShapeError> {
    let columns = detections.ncols();
    if columns < DETECTION_HEAD_COLUMNS {
      return Err(OutputShapeError::TooFewColumns {
        expected: DETECTION_HEAD_COLUMNS,
        actual: columns,
      });
    }

    let (planes, mask_h, mask_w) = prototypes.dim();
    if planes == 0 || mask_h == 0 || mask_w == 0 {
      return Err(OutputShapeError::EmptyPrototypes([planes, mask_h, mask_w]));
    }

    let coefficients = columns - DETECTION_HEAD_COLUMNS;
    if coefficients != planes {
      return Err(OutputShapeError::CoefficientMismatch {
        coefficients,
        planes,
      });
    }

    Ok(Self {
      detections,
      prototypes,
    })
  }

  pub fn num_detections(&self) -> usize {
    self.detections.nrows()
  }

  pub fn num_prototypes(&self) -> usize {
    self.prototypes.dim().0
  }

  /// 原型掩码分辨率 (H', W')
  pub fn mask_size(&self) -> (usize, usize) {
    let (_, h, w) = self.prototypes.dim();
    (h, w)
  }

  pub fn prototypes(&self) -> ArrayView3<'_, f32> {
    self.prototypes.view()
  }

  pub fn detections(&self) -> impl ExactSizeIterator<Item = Detection<'_>> + '_ {
    self
      .detections
      .axis_iter(Axis(0))
      .enumerate()
      .map(|(index, row)| Detection { index, row })
  }
}

/// 检测表中的一行
#[derive(Debug, Clone, Copy)]
pub struct Detection<'a> {
  pub index: usize,
  row: ArrayView1<'a, f32>,
}

impl<'a> Detection<'a> {
  pub fn bbox(&self) -> [f32; 4] {
    [self.row[0], self.row[1], self.row[2], self.row[3]]
  }

  pub fn score(&self) -> f32 {
    self.row[CONFIDENCE_COLUMN]
  }

  pub fn class_id(&self) -> u32 {
    self.row[CLASS_COLUMN].max(0.0) as u32
  }

  pub fn coefficients(&self) -> ArrayView1<'a, f32> {
    self.row.slice_move(ndarray::s![DETECTION_HEAD_COLUMNS..])
  }
}

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use self::onnx::{OnnxError, OnnxSession, OnnxSessionBuilder};
