// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/config.rs - 分割流程配置
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

/// 默认置信度阈值
pub const DEFAULT_CONFIDENCE: f32 = 0.3;
/// 掩码二值化阈值
pub const DEFAULT_MASK_THRESHOLD: f32 = 0.5;
/// 模型输入宽度
pub const DEFAULT_INPUT_WIDTH: u32 = 640;
/// 模型输入高度
pub const DEFAULT_INPUT_HEIGHT: u32 = 640;

/// 分割流程配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
  /// 置信度阈值，得分需严格大于该值
  pub confidence: f32,
  /// 掩码二值化阈值，组合值需严格大于该值
  pub mask_threshold: f32,
  /// 模型输入宽度
  pub input_width: u32,
  /// 模型输入高度
  pub input_height: u32,
}

impl Default for SegmentConfig {
  fn default() -> Self {
    Self {
      confidence: DEFAULT_CONFIDENCE,
      mask_threshold: DEFAULT_MASK_THRESHOLD,
      input_width: DEFAULT_INPUT_WIDTH,
      input_height: DEFAULT_INPUT_HEIGHT,
    }
  }
}

impl SegmentConfig {
  pub fn confidence(mut self, confidence: f32) -> Self {
    self.confidence = confidence;
    self
  }

  pub fn mask_threshold(mut self, threshold: f32) -> Self {
    self.mask_threshold = threshold;
    self
  }

  pub fn input_size(mut self, width: u32, height: u32) -> Self {
    self.input_width = width;
    self.input_height = height;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = SegmentConfig::default();
    assert_eq!(config.confidence, 0.3);
    assert_eq!(config.mask_threshold, 0.5);
    assert_eq!((config.input_width, config.input_height), (640, 640));
  }

  #[test]
  fn test_builder_overrides() {
    let config = SegmentConfig::default()
      .confidence(0.6)
      .mask_threshold(0.25)
      .input_size(320, 256);
    assert_eq!(config.confidence, 0.6);
    assert_eq!(config.mask_threshold, 0.25);
    assert_eq!((config.input_width, config.input_height), (320, 256));
  }
}
