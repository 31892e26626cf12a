// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/task.rs - 分割任务
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

use std::time::{Duration, Instant};

use tracing::info;

use crate::{
  contour::Polygon, frame::BgrFrame, model::SegmentModel, output::Render, segment::Segmenter,
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, segmenter: &Segmenter<M>, output: O)
  -> Result<Option<Polygon>, Self::Error>;
}

/// 对第一帧执行一次分割并输出结果
pub struct OneShotTask {
  pub confidence: Option<f32>,
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = BgrFrame>,
  M: SegmentModel<Error = ME>,
  O: Render<Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    segmenter: &Segmenter<M>,
    output: O,
  ) -> Result<Option<Polygon>, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功: {}x{}，开始分割...", frame.width(), frame.height());
    let now = Instant::now();
    let contour = segmenter.segment(&frame, self.confidence)?;
    info!("分割完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&frame, contour.as_ref())?;
    info!("渲染完成");

    Ok(contour)
  }
}

/// 对同一帧重复分割，统计耗时
pub struct RepeatShotTask {
  pub confidence: Option<f32>,
  pub times: usize,
}

impl<
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = BgrFrame>,
  M: SegmentModel<Error = ME>,
  O: Render<Error = RE>,
> Task<I, M, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    segmenter: &Segmenter<M>,
    output: O,
  ) -> Result<Option<Polygon>, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始分割...");

    let mut times = Vec::with_capacity(self.times);
    let mut contour = None;
    for i in 0..self.times.max(1) {
      let now = Instant::now();
      contour = segmenter.segment(&frame, self.confidence)?;
      let elapsed = now.elapsed();
      info!("({})分割完成，耗时: {:.2?}", i, elapsed);
      times.push(elapsed);
    }
    output.render_result(&frame, contour.as_ref())?;

    let total: Duration = times.iter().sum();
    let average = total / times.len() as u32;
    let min = times.iter().min().copied().unwrap_or_default();
    let max = times.iter().max().copied().unwrap_or_default();
    info!(
      "共 {} 次，平均耗时: {:.2?}，最短: {:.2?}，最长: {:.2?}",
      times.len(),
      average,
      min,
      max
    );

    Ok(contour)
  }
}
