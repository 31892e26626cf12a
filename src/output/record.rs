// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/output/record.rs - 轮廓 JSON 记录
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

use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, contour::Polygon, frame::BgrFrame, output::Render,
};

const NO_CONTOUR_MESSAGE: &str = "No contour found";

/// 轮廓的 JSON 表示
///
/// 找到轮廓时为 `{"contour": [[x, y], ...]}`，否则为 `{"error": "No contour found"}`。
pub fn contour_json(contour: Option<&Polygon>) -> Value {
  match contour {
    Some(contour) => json!({ "contour": contour.to_pairs() }),
    None => json!({ "error": NO_CONTOUR_MESSAGE }),
  }
}

#[derive(Error, Debug)]
pub enum ContourRecordError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 将轮廓写入 JSON 文件
pub struct ContourRecord {
  path: String,
}

impl FromUrlWithScheme for ContourRecord {
  const SCHEME: &'static str = "json";
}

impl FromUrl for ContourRecord {
  type Error = ContourRecordError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(ContourRecordError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(ContourRecord {
      path: uri.path().to_string(),
    })
  }
}

impl ContourRecord {
  pub fn record(&self, contour: Option<&Polygon>) -> Result<(), ContourRecordError> {
    if let Some(parent) = Path::new(&self.path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let body = serde_json::to_string(&contour_json(contour))?;
    std::fs::write(&self.path, body)?;
    info!("保存轮廓记录到文件: {}", self.path);
    Ok(())
  }
}

impl Render for ContourRecord {
  type Error = ContourRecordError;

  fn render_result(&self, _frame: &BgrFrame, contour: Option<&Polygon>) -> Result<(), Self::Error> {
    self.record(contour)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use imageproc::point::Point;

  #[test]
  fn test_contour_json() {
    let polygon = Polygon::new(vec![Point::new(1, 2), Point::new(5, 2), Point::new(5, 9)]);
    assert_eq!(
      contour_json(Some(&polygon)),
      json!({ "contour": [[1, 2], [5, 2], [5, 9]] })
    );
    assert_eq!(contour_json(None), json!({ "error": "No contour found" }));
  }

  #[test]
  fn test_record_writes_file() {
    let path = std::env::temp_dir()
      .join(format!("lunkuo-record-{}", std::process::id()))
      .join("contour.json");
    let url = Url::parse(&format!("json://{}", path.display())).unwrap();
    let record = ContourRecord::from_url(&url).unwrap();

    let polygon = Polygon::new(vec![Point::new(0, 0), Point::new(3, 0), Point::new(3, 3)]);
    record.record(Some(&polygon)).unwrap();

    let body: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(body["contour"][1], json!([3, 0]));

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[test]
  fn test_scheme_mismatch() {
    let url = Url::parse("image:///tmp/out.json").unwrap();
    assert!(matches!(
      ContourRecord::from_url(&url),
      Err(ContourRecordError::SchemeMismatch(_))
    ));
  }
}
