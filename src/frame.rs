// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/frame.rs - BGR 帧与 NCHW 输入张量定义
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
  ImageBuffer, Rgb, RgbImage,
  imageops::{self, FilterType},
};
use ndarray::{Array4, ArrayView4};
use thiserror::Error;
use tracing::debug;

const BGR_CHANNELS: usize = 3;
const PIXEL_SCALE: f32 = 255.0;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("图像为空")]
  EmptyFrame,
}

/// 高×宽×3 的 BGR 图像帧
///
/// 内部借用 `ImageBuffer<Rgb<u8>>` 存储，但通道顺序为 B、G、R。
#[derive(Debug, Clone)]
pub struct BgrFrame {
  buffer: ImageBuffer<Rgb<u8>, Vec<u8>>,
}

impl BgrFrame {
  /// 从交错排列的 BGR 字节构造帧
  pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
    let expected = BGR_CHANNELS * width as usize * height as usize;
    let actual = data.len();
    // ImageBuffer 接受偏长的缓冲区，这里要求长度严格一致
    let buffer = ImageBuffer::from_raw(width, height, data)
      .filter(|buffer: &ImageBuffer<Rgb<u8>, Vec<u8>>| buffer.as_raw().len() == expected)
      .ok_or(FrameError::LengthMismatch { expected, actual })?;
    Ok(Self { buffer })
  }

  pub fn height(&self) -> usize {
    self.buffer.height() as usize
  }

  pub fn width(&self) -> usize {
    self.buffer.width() as usize
  }

  /// 面积为零的帧视为空帧
  pub fn is_empty(&self) -> bool {
    self.buffer.width() == 0 || self.buffer.height() == 0
  }

  pub fn as_bgr(&self) -> &[u8] {
    self.buffer.as_raw()
  }

  pub fn to_rgb_image(&self) -> RgbImage {
    ImageBuffer::from_fn(self.buffer.width(), self.buffer.height(), |x, y| {
      let [b, g, r] = self.buffer.get_pixel(x, y).0;
      Rgb([r, g, b])
    })
  }

  /// 生成模型输入张量
  ///
  /// 缩放到 `width`×`height`，BGR 转 RGB，像素值归一化到 [0, 1]，
  /// 排列为 (1, 3, H, W) 的连续 NCHW 布局。
  pub fn to_input_tensor(&self, width: u32, height: u32) -> Result<InputTensor, FrameError> {
    if self.is_empty() {
      return Err(FrameError::EmptyFrame);
    }

    debug!(
      "预处理: {}x{} -> {}x{}",
      self.buffer.width(),
      self.buffer.height(),
      width,
      height
    );
    let resized = imageops::resize(&self.buffer, width, height, FilterType::Triangle);

    let mut data = Array4::<f32>::zeros((1, BGR_CHANNELS, height as usize, width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
      let [b, g, r] = pixel.0;
      let (x, y) = (x as usize, y as usize);
      data[[0, 0, y, x]] = r as f32 / PIXEL_SCALE;
      data[[0, 1, y, x]] = g as f32 / PIXEL_SCALE;
      data[[0, 2, y, x]] = b as f32 / PIXEL_SCALE;
    }

    Ok(InputTensor { data })
  }
}

impl From<&RgbImage> for BgrFrame {
  fn from(image: &RgbImage) -> Self {
    let buffer = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
      let [r, g, b] = image.get_pixel(x, y).0;
      Rgb([b, g, r])
    });
    Self { buffer }
  }
}

impl From<RgbImage> for BgrFrame {
  fn from(image: RgbImage) -> Self {
    BgrFrame::from(&image)
  }
}

/// (1, 3, H, W) 的 RGB 浮点输入张量，标准（行主序）内存布局
#[derive(Debug, Clone)]
pub struct InputTensor {
  data: Array4<f32>,
}

impl InputTensor {
  pub fn shape(&self) -> [usize; 4] {
    let (n, c, h, w) = self.data.dim();
    [n, c, h, w]
  }

  pub fn view(&self) -> ArrayView4<'_, f32> {
    self.data.view()
  }

  pub fn is_contiguous(&self) -> bool {
    self.data.is_standard_layout()
  }

  /// 按 NCHW 顺序展开的数据
  pub fn to_vec(&self) -> Vec<f32> {
    self.data.iter().copied().collect()
  }
}
