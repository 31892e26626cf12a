// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/contour.rs - 外轮廓提取与选择
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

use image::{GrayImage, Luma, imageops};
use imageproc::{
  contours::{BorderType, find_contours},
  drawing::{draw_line_segment_mut, draw_polygon_mut},
  geometry::{arc_length, contour_area},
  point::Point,
};

use crate::mask::MASK_FOREGROUND;

/// 整数像素坐标的闭合多边形，顶点按边界追踪顺序排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
  points: Vec<Point<i32>>,
}

impl Polygon {
  pub fn new(points: Vec<Point<i32>>) -> Self {
    Self { points }
  }

  pub fn points(&self) -> &[Point<i32>] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// (x, y) 坐标对
  pub fn to_pairs(&self) -> Vec<[i32; 2]> {
    self.points.iter().map(|p| [p.x, p.y]).collect()
  }

  /// 鞋带公式计算的多边形面积
  pub fn area(&self) -> f64 {
    contour_area(&self.points)
  }

  /// 闭合周长
  pub fn perimeter(&self) -> f64 {
    arc_length(&self.points, true)
  }

  /// 填充多边形，生成 `width`×`height` 的二值掩码
  pub fn rasterize(&self, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let color = Luma([MASK_FOREGROUND]);
    match self.points.as_slice() {
      [] => {}
      [p] => {
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
          mask.put_pixel(p.x as u32, p.y as u32, color);
        }
      }
      [a, b] => draw_line_segment_mut(
        &mut mask,
        (a.x as f32, a.y as f32),
        (b.x as f32, b.y as f32),
        color,
      ),
      points => draw_polygon_mut(&mut mask, points, color),
    }
    mask
  }
}

/// 压缩水平、垂直与对角方向上的共线中间点
///
/// 仅保留进入方向与离开方向不同的顶点，多边形形状保持不变。
pub fn simplify(mut points: Vec<Point<i32>>) -> Vec<Point<i32>> {
  if points.len() > 1 && points.first() == points.last() {
    points.pop();
  }

  let n = points.len();
  if n < 3 {
    return points;
  }

  let step = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());
  let kept: Vec<Point<i32>> = (0..n)
    .filter(|&i| {
      let prev = points[(i + n - 1) % n];
      let next = points[(i + 1) % n];
      step(prev, points[i]) != step(points[i], next)
    })
    .map(|i| points[i])
    .collect();

  if kept.is_empty() {
    vec![points[0]]
  } else {
    kept
  }
}

/// 提取二值掩码中所有连通前景区域的外边界
///
/// 孔洞边界以及孔洞内部的岛屿都会被忽略。图像之外视为背景，
/// 因此贴边的区域同样有外边界。
pub fn external_contours(mask: &GrayImage) -> Vec<Polygon> {
  // find_contours 不会在第 0 列起始外边界，先四周补一圈背景
  let mut canvas = GrayImage::new(mask.width() + 2, mask.height() + 2);
  imageops::replace(&mut canvas, mask, 1, 1);

  find_contours::<i32>(&canvas)
    .into_iter()
    .filter(|contour| matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none())
    .map(|contour| {
      let points = contour
        .points
        .into_iter()
        .map(|p| Point::new(p.x - 1, p.y - 1))
        .collect();
      Polygon::new(simplify(points))
    })
    .collect()
}

/// 面积最大的外轮廓，面积相同时保留先出现的轮廓
pub fn largest_external_contour(mask: &GrayImage) -> Option<Polygon> {
  let mut best: Option<(f64, Polygon)> = None;
  for polygon in external_contours(mask) {
    let area = polygon.area();
    if best.as_ref().is_none_or(|(max_area, _)| area > *max_area) {
      best = Some((area, polygon));
    }
  }
  best.map(|(_, polygon)| polygon)
}

/// 跨检测追踪面积最大的轮廓
///
/// 初始最大面积为 0，只有严格更大的轮廓才会替换当前结果。
#[derive(Debug, Clone, Default)]
pub struct BestContour {
  max_area: f64,
  contour: Option<Polygon>,
}

impl BestContour {
  /// 返回该轮廓是否成为新的最佳结果
  pub fn offer(&mut self, polygon: Polygon) -> bool {
    let area = polygon.area();
    if area > self.max_area {
      self.max_area = area;
      self.contour = Some(polygon);
      true
    } else {
      false
    }
  }

  pub fn max_area(&self) -> f64 {
    self.max_area
  }

  pub fn into_inner(self) -> Option<Polygon> {
    self.contour
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fill_rect(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
    for y in y0..y0 + h {
      for x in x0..x0 + w {
        mask.put_pixel(x, y, Luma([MASK_FOREGROUND]));
      }
    }
  }

  fn sorted(points: &[Point<i32>]) -> Vec<(i32, i32)> {
    let mut pairs: Vec<_> = points.iter().map(|p| (p.x, p.y)).collect();
    pairs.sort();
    pairs
  }

  #[test]
  fn test_empty_mask() {
    let mask = GrayImage::new(10, 10);
    assert!(external_contours(&mask).is_empty());
    assert!(largest_external_contour(&mask).is_none());
  }

  #[test]
  fn test_full_mask_is_image_rectangle() {
    let mut mask = GrayImage::new(30, 20);
    fill_rect(&mut mask, 0, 0, 30, 20);
    let polygon = largest_external_contour(&mask).unwrap();
    assert_eq!(
      sorted(polygon.points()),
      vec![(0, 0), (0, 19), (29, 0), (29, 19)]
    );
    assert_eq!(polygon.area(), 29.0 * 19.0);
  }

  #[test]
  fn test_mask_touching_border() {
    // 单像素宽的图像
    let mut mask = GrayImage::new(1, 1);
    fill_rect(&mut mask, 0, 0, 1, 1);
    assert_eq!(external_contours(&mask).len(), 1);

    // 贴着左上角的方块
    let mut mask = GrayImage::new(16, 16);
    fill_rect(&mut mask, 0, 0, 6, 4);
    let polygon = largest_external_contour(&mask).unwrap();
    assert_eq!(sorted(polygon.points()), vec![(0, 0), (0, 3), (5, 0), (5, 3)]);
    assert_eq!(polygon.area(), 15.0);
  }

  #[test]
  fn test_border_ring_with_hole_and_island() {
    let mut mask = GrayImage::new(30, 30);
    fill_rect(&mut mask, 0, 0, 30, 30);
    for y in 5..25 {
      for x in 5..25 {
        mask.put_pixel(x, y, Luma([0]));
      }
    }
    fill_rect(&mut mask, 12, 12, 4, 4);

    let contours = external_contours(&mask);
    assert_eq!(contours.len(), 1);
    assert_eq!(
      sorted(contours[0].points()),
      vec![(0, 0), (0, 29), (29, 0), (29, 29)]
    );
    assert_eq!(contours[0].area(), 29.0 * 29.0);
  }

  #[test]
  fn test_perimeter_is_closed() {
    let polygon = Polygon::new(vec![
      Point::new(0, 0),
      Point::new(3, 0),
      Point::new(3, 4),
    ]);
    assert_eq!(polygon.perimeter(), 12.0);
    assert_eq!(polygon.area(), 6.0);
  }

  #[test]
  fn test_simplify_drops_collinear_points() {
    let points = vec![
      Point::new(0, 0),
      Point::new(1, 0),
      Point::new(2, 0),
      Point::new(2, 1),
      Point::new(2, 2),
      Point::new(1, 1),
    ];
    assert_eq!(
      simplify(points),
      vec![Point::new(0, 0), Point::new(2, 0), Point::new(2, 2)]
    );
  }

  #[test]
  fn test_simplify_thin_line() {
    let points = vec![
      Point::new(0, 0),
      Point::new(1, 0),
      Point::new(2, 0),
      Point::new(1, 0),
    ];
    assert_eq!(simplify(points), vec![Point::new(0, 0), Point::new(2, 0)]);
  }

  #[test]
  fn test_holes_are_ignored() {
    let mut mask = GrayImage::new(20, 20);
    fill_rect(&mut mask, 2, 2, 16, 16);
    for y in 6..14 {
      for x in 6..14 {
        mask.put_pixel(x, y, Luma([0]));
      }
    }
    // 孔洞中的岛屿
    fill_rect(&mut mask, 9, 9, 2, 2);

    let contours = external_contours(&mask);
    assert_eq!(contours.len(), 1);
    assert_eq!(
      sorted(contours[0].points()),
      vec![(2, 2), (2, 17), (17, 2), (17, 17)]
    );
  }

  #[test]
  fn test_largest_of_disjoint_blobs() {
    let mut mask = GrayImage::new(64, 32);
    fill_rect(&mut mask, 1, 1, 10, 10);
    fill_rect(&mut mask, 30, 5, 20, 20);
    let polygon = largest_external_contour(&mask).unwrap();
    assert_eq!(polygon.area(), 19.0 * 19.0);
    assert_eq!(
      sorted(polygon.points()),
      vec![(30, 5), (30, 24), (49, 5), (49, 24)]
    );
  }

  #[test]
  fn test_equal_areas_keep_first() {
    let mut mask = GrayImage::new(40, 10);
    fill_rect(&mut mask, 1, 1, 5, 5);
    fill_rect(&mut mask, 20, 1, 5, 5);
    let polygon = largest_external_contour(&mask).unwrap();
    assert!(polygon.points().iter().all(|p| p.x < 10));
  }

  #[test]
  fn test_single_pixel_has_zero_area() {
    let mut mask = GrayImage::new(5, 5);
    mask.put_pixel(2, 2, Luma([MASK_FOREGROUND]));
    let polygon = largest_external_contour(&mask).unwrap();
    assert_eq!(polygon.points(), &[Point::new(2, 2)]);
    assert_eq!(polygon.area(), 0.0);

    let mut best = BestContour::default();
    assert!(!best.offer(polygon));
    assert!(best.into_inner().is_none());
  }

  #[test]
  fn test_best_contour_strictly_greater() {
    let square = |x0: i32, side: i32| {
      Polygon::new(vec![
        Point::new(x0, 0),
        Point::new(x0 + side, 0),
        Point::new(x0 + side, side),
        Point::new(x0, side),
      ])
    };
    let mut best = BestContour::default();
    assert!(best.offer(square(0, 4)));
    assert!(!best.offer(square(10, 4)));
    assert!(best.offer(square(20, 5)));
    assert_eq!(best.max_area(), 25.0);
    assert_eq!(best.into_inner().unwrap().points()[0], Point::new(20, 0));
  }

  #[test]
  fn test_rasterize_round_trip() {
    let mut mask = GrayImage::new(48, 48);
    fill_rect(&mut mask, 4, 6, 20, 12);
    fill_rect(&mut mask, 4, 18, 8, 10);
    let polygon = largest_external_contour(&mask).unwrap();

    let filled = polygon.rasterize(48, 48);
    let pixels = filled.pixels().filter(|p| p.0[0] == MASK_FOREGROUND).count() as f64;
    assert!((pixels - polygon.area()).abs() <= polygon.perimeter());
  }
}
