// 该文件是 Lunkuo （轮廓） 项目的一部分。
// src/output.rs - 结果输出
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

use crate::{FromUrl, contour::Polygon, frame::BgrFrame};

pub trait Render {
  type Error;
  fn render_result(&self, frame: &BgrFrame, contour: Option<&Polygon>) -> Result<(), Self::Error>;
}

mod record;
pub use self::record::{ContourRecord, ContourRecordError, contour_json};

#[cfg(feature = "save_image_file")]
mod draw;
#[cfg(feature = "save_image_file")]
pub use self::draw::Draw;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("Contour record error: {0}")]
  ContourRecordError(#[from] ContourRecordError),
  #[cfg(feature = "save_image_file")]
  #[error("Save image file error: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[error("URI scheme mismatch")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  ContourRecord(ContourRecord),
  #[cfg(feature = "save_image_file")]
  SaveImageFile(SaveImageFileOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    use crate::FromUrlWithScheme;

    if url.scheme() == ContourRecord::SCHEME {
      return Ok(OutputWrapper::ContourRecord(ContourRecord::from_url(url)?));
    }
    #[cfg(feature = "save_image_file")]
    {
      if url.scheme() == SaveImageFileOutput::SCHEME {
        let output = SaveImageFileOutput::from_url(url)?;
        return Ok(OutputWrapper::SaveImageFile(output));
      }
    }
    Err(OutputError::SchemeMismatch)
  }
}

impl Render for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &BgrFrame, contour: Option<&Polygon>) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::ContourRecord(output) => output.render_result(frame, contour)?,
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFile(output) => output.render_result(frame, contour)?,
    }
    Ok(())
  }
}

impl<O: Render> Render for Vec<O> {
  type Error = O::Error;

  fn render_result(&self, frame: &BgrFrame, contour: Option<&Polygon>) -> Result<(), Self::Error> {
    for output in self {
      output.render_result(frame, contour)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_wrapper_dispatches_by_scheme() {
    let url = url::Url::parse("json:///tmp/contour.json").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Ok(OutputWrapper::ContourRecord(_))
    ));

    let url = url::Url::parse("folder:///tmp/out").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch)
    ));
  }
}
