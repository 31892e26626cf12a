// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/bin/segment.rs - 单张图像分割
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use lunkuo::{
  FromUrl, SegmentConfig, Segmenter,
  config::{DEFAULT_CONFIDENCE, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH, DEFAULT_MASK_THRESHOLD},
  input::InputWrapper,
  model::OnnxSessionBuilder,
  output::{OutputWrapper, contour_json},
  task::{OneShotTask, RepeatShotTask, Task},
};
use tracing::info;

/// Lunkuo 分割参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径，例如 onnx:///models/best.onnx
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源，例如 image:///data/photo.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，可多次指定（json:///... 或 image:///...）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Vec<Url>,
  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_CONFIDENCE, value_name = "THRESHOLD")]
  pub confidence: f32,
  /// 掩码二值化阈值
  #[arg(long, default_value_t = DEFAULT_MASK_THRESHOLD, value_name = "THRESHOLD")]
  pub mask_threshold: f32,
  /// 模型输入宽度
  #[arg(long, default_value_t = DEFAULT_INPUT_WIDTH)]
  pub input_width: u32,
  /// 模型输入高度
  #[arg(long, default_value_t = DEFAULT_INPUT_HEIGHT)]
  pub input_height: u32,
  /// ONNX Runtime 线程数
  #[arg(long)]
  pub threads: Option<usize>,
  /// 重复次数，大于 1 时统计耗时
  #[arg(long, default_value_t = 1)]
  pub repeat: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {:?}", args.output);
  info!("置信度阈值: {}", args.confidence);

  let input = InputWrapper::from_url(&args.input)?;
  let mut builder = OnnxSessionBuilder::from_url(&args.model)?;
  if let Some(threads) = args.threads {
    builder = builder.intra_threads(threads);
  }
  let model = builder.build()?;
  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  let config = SegmentConfig::default()
    .confidence(args.confidence)
    .mask_threshold(args.mask_threshold)
    .input_size(args.input_width, args.input_height);
  let segmenter = Segmenter::with_config(model, config);

  let contour = if args.repeat > 1 {
    RepeatShotTask {
      confidence: None,
      times: args.repeat,
    }
    .run_task(input, &segmenter, outputs)?
  } else {
    OneShotTask { confidence: None }.run_task(input, &segmenter, outputs)?
  };

  println!("{}", contour_json(contour.as_ref()));

  Ok(())
}
