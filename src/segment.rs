// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/segment.rs - 分割流程：推理、置信度过滤、掩码重建与轮廓选择
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

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  config::SegmentConfig,
  contour::{BestContour, Polygon, largest_external_contour},
  frame::{BgrFrame, FrameError},
  mask,
  model::{Detection, SegmentModel, SegmentOutput},
};

#[derive(Error, Debug)]
pub enum SegmentError<E> {
  #[error("输入图像为空")]
  EmptyImage,
  #[error("帧错误: {0}")]
  Frame(#[from] FrameError),
  #[error("模型推理错误: {0}")]
  Model(E),
}

/// 保留置信度严格大于 `threshold` 的检测
pub fn filter_by_confidence(
  output: &SegmentOutput,
  threshold: f32,
) -> impl Iterator<Item = Detection<'_>> + '_ {
  output
    .detections()
    .filter(move |det| det.score() > threshold)
}

/// 实例分割流程
///
/// 持有推理模型与配置；每次调用相互独立，不保留状态。
pub struct Segmenter<M> {
  model: M,
  config: SegmentConfig,
}

impl<M: SegmentModel> Segmenter<M> {
  pub fn new(model: M) -> Self {
    Self::with_config(model, SegmentConfig::default())
  }

  pub fn with_config(model: M, config: SegmentConfig) -> Self {
    Self { model, config }
  }

  pub fn config(&self) -> &SegmentConfig {
    &self.config
  }

  pub fn model(&self) -> &M {
    &self.model
  }

  /// 对 BGR 图像分割，返回面积最大的外轮廓
  ///
  /// `confidence` 为 `None` 时使用配置中的阈值。没有检测通过过滤、
  /// 或所有掩码都无法追踪出轮廓时返回 `Ok(None)`。
  pub fn segment(
    &self,
    frame: &BgrFrame,
    confidence: Option<f32>,
  ) -> Result<Option<Polygon>, SegmentError<M::Error>> {
    if frame.is_empty() {
      return Err(SegmentError::EmptyImage);
    }

    let tensor = frame.to_input_tensor(self.config.input_width, self.config.input_height)?;

    debug!("执行模型推理");
    let output = self.model.infer(&tensor).map_err(SegmentError::Model)?;

    let threshold = confidence.unwrap_or(self.config.confidence);
    Ok(self.postprocess(
      &output,
      threshold,
      frame.width() as u32,
      frame.height() as u32,
    ))
  }

  /// 对原始模型输出执行后处理
  pub fn postprocess(
    &self,
    output: &SegmentOutput,
    confidence: f32,
    original_width: u32,
    original_height: u32,
  ) -> Option<Polygon> {
    let survivors: Vec<Detection<'_>> = filter_by_confidence(output, confidence).collect();
    debug!(
      "置信度阈值 {}: {} / {} 个检测通过",
      confidence,
      survivors.len(),
      output.num_detections()
    );

    if survivors.is_empty() {
      info!("没有检测通过置信度过滤");
      return None;
    }

    let prototypes = output.prototypes();
    let mask_threshold = self.config.mask_threshold;
    let contour_of = |det: &Detection<'_>| {
      let mask = mask::reconstruct(
        prototypes,
        det.coefficients(),
        mask_threshold,
        original_width,
        original_height,
      );
      largest_external_contour(&mask)
    };

    #[cfg(feature = "parallel")]
    let contours: Vec<Option<Polygon>> = {
      use rayon::prelude::*;
      survivors.par_iter().map(contour_of).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let contours = survivors.iter().map(contour_of);

    let mut best = BestContour::default();
    for (det, contour) in survivors.iter().zip(contours) {
      let Some(contour) = contour else {
        debug!("检测 {} 的掩码没有前景", det.index);
        continue;
      };
      let area = contour.area();
      if best.offer(contour) {
        debug!("检测 {} 成为当前最大轮廓, 面积 {:.1}", det.index, area);
      }
    }

    match best.into_inner() {
      Some(contour) => {
        info!("找到最大轮廓: {} 个顶点, 面积 {:.1}", contour.len(), contour.area());
        Some(contour)
      }
      None => {
        info!("没有找到轮廓");
        None
      }
    }
  }
}
