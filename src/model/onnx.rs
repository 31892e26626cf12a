// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/model/onnx.rs - ONNX Runtime 推理后端
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

use std::sync::Mutex;

use ndarray::{Array2, Array3};
use ort::{session::Session, value::Tensor};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::InputTensor,
  model::{OutputShapeError, SegmentModel, SegmentOutput},
};

const ONNX_NUM_OUTPUTS: usize = 2;

#[derive(Error, Debug)]
pub enum OnnxError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(std::io::Error),
  #[error("ONNX Runtime 错误: {0}")]
  RuntimeError(ort::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("输出张量形状错误: {0}")]
  OutputShape(#[from] OutputShapeError),
  #[error("推理会话锁已失效")]
  SessionPoisoned,
}

impl From<std::io::Error> for OnnxError {
  fn from(err: std::io::Error) -> Self {
    OnnxError::ModelLoadError(err)
  }
}

impl From<ort::Error> for OnnxError {
  fn from(err: ort::Error) -> Self {
    OnnxError::RuntimeError(err)
  }
}

/// 基于 ONNX Runtime 的分割模型会话
///
/// `run` 需要独占会话，调用通过互斥锁串行化。
pub struct OnnxSession {
  session: Mutex<Session>,
}

pub struct OnnxSessionBuilder {
  model_path: String,
  intra_threads: Option<usize>,
}

impl FromUrlWithScheme for OnnxSessionBuilder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for OnnxSessionBuilder {
  type Error = OnnxError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OnnxError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    Ok(OnnxSessionBuilder {
      model_path: url.path().to_string(),
      intra_threads: None,
    })
  }
}

impl OnnxSessionBuilder {
  pub fn intra_threads(mut self, threads: usize) -> Self {
    self.intra_threads = Some(threads);
    self
  }

  pub fn build(self) -> Result<OnnxSession, OnnxError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 ONNX Runtime 推理会话");
    let mut builder = Session::builder()?;
    if let Some(threads) = self.intra_threads {
      builder = builder.with_intra_threads(threads)?;
    }
    let session = builder.commit_from_memory(&model_data)?;
    info!("模型加载完成");

    let num_outputs = session.outputs.len();
    if num_outputs != ONNX_NUM_OUTPUTS {
      error!(
        "预期模型输出数量为 {}, 实际为 {}",
        ONNX_NUM_OUTPUTS, num_outputs
      );
      return Err(OnnxError::ModelInvalid(format!(
        "预期模型输出数量为 {}, 实际为 {}",
        ONNX_NUM_OUTPUTS, num_outputs
      )));
    }
    debug!("模型输入数量: {}", session.inputs.len());
    debug!("模型输出数量: {}", num_outputs);

    Ok(OnnxSession {
      session: Mutex::new(session),
    })
  }
}

/// 去掉批次维度后的张量形状
fn unbatched(shape: &[i64], rank: usize, name: &str) -> Result<Vec<usize>, OnnxError> {
  if shape.len() != rank + 1 || shape[0] != 1 || shape.iter().any(|&d| d < 0) {
    error!("{} 形状异常: {:?}", name, shape);
    return Err(OnnxError::ModelInvalid(format!(
      "{} 形状异常: {:?}",
      name, shape
    )));
  }
  Ok(shape[1..].iter().map(|&d| d as usize).collect())
}

impl SegmentModel for OnnxSession {
  type Error = OnnxError;

  fn infer(&self, input: &InputTensor) -> Result<SegmentOutput, Self::Error> {
    debug!("设置模型输入: {:?}", input.shape());
    let tensor = Tensor::from_array((input.shape(), input.to_vec().into_boxed_slice()))?;

    let mut session = self.session.lock().map_err(|_| OnnxError::SessionPoisoned)?;

    debug!("执行模型推理");
    let outputs = session.run(ort::inputs![tensor])?;

    debug!("获取模型输出");
    let values: Vec<_> = outputs.iter().map(|(_, value)| value).collect();
    if values.len() != ONNX_NUM_OUTPUTS {
      return Err(OnnxError::ModelInvalid(format!(
        "预期模型输出数量为 {}, 实际为 {}",
        ONNX_NUM_OUTPUTS,
        values.len()
      )));
    }

    let (det_shape, det_data) = values[0].try_extract_tensor::<f32>()?;
    let det_dims = unbatched(det_shape, 2, "检测输出")?;
    let detections = Array2::from_shape_vec((det_dims[0], det_dims[1]), det_data.to_vec())
      .map_err(|e| OnnxError::ModelInvalid(e.to_string()))?;

    let (proto_shape, proto_data) = values[1].try_extract_tensor::<f32>()?;
    let proto_dims = unbatched(proto_shape, 3, "原型掩码输出")?;
    let prototypes = Array3::from_shape_vec(
      (proto_dims[0], proto_dims[1], proto_dims[2]),
      proto_data.to_vec(),
    )
    .map_err(|e| OnnxError::ModelInvalid(e.to_string()))?;

    debug!(
      "检测输出形状 {:?}, 原型掩码形状 {:?}",
      detections.dim(),
      prototypes.dim()
    );

    Ok(SegmentOutput::new(detections, prototypes)?)
  }
}
