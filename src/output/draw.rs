// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/output/draw.rs - 轮廓可视化
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

use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_circle_mut, draw_hollow_polygon_mut},
  point::Point,
};

use crate::{contour::Polygon, frame::BgrFrame};

const CONTOUR_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const VERTEX_COLOR: [u8; 3] = [255, 0, 0]; // 红色
const VERTEX_RADIUS: i32 = 2;
const FILL_ALPHA: f32 = 0.5;

pub struct Draw {
  contour_color: [u8; 3],
  vertex_color: [u8; 3],
  vertex_radius: i32,
  fill_alpha: f32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      contour_color: CONTOUR_COLOR,
      vertex_color: VERTEX_COLOR,
      vertex_radius: VERTEX_RADIUS,
      fill_alpha: FILL_ALPHA,
    }
  }
}

impl Draw {
  pub fn contour_color(mut self, color: [u8; 3]) -> Self {
    self.contour_color = color;
    self
  }

  // 半透明填充轮廓内部，再描边并标出顶点
  pub fn draw_contour_on_image(&self, image: &mut RgbImage, contour: &Polygon) {
    let (width, height) = image.dimensions();
    let region = contour.rasterize(width, height);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
      if region.get_pixel(x, y).0[0] == 0 {
        continue;
      }
      for c in 0..3 {
        let base = pixel.0[c] as f32;
        let tint = self.contour_color[c] as f32;
        pixel.0[c] = (base * (1.0 - self.fill_alpha) + tint * self.fill_alpha).round() as u8;
      }
    }

    if contour.len() >= 2 {
      let outline: Vec<Point<f32>> = contour
        .points()
        .iter()
        .map(|p| Point::new(p.x as f32, p.y as f32))
        .collect();
      draw_hollow_polygon_mut(image, &outline, Rgb(self.contour_color));
    }

    for p in contour.points() {
      draw_filled_circle_mut(image, (p.x, p.y), self.vertex_radius, Rgb(self.vertex_color));
    }
  }

  pub fn draw_contour(&self, frame: &BgrFrame, contour: Option<&Polygon>) -> RgbImage {
    let mut image = frame.to_rgb_image();
    if let Some(contour) = contour {
      self.draw_contour_on_image(&mut image, contour);
    }
    image
  }
}
