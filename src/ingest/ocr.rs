use anyhow::{anyhow, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::ProgressObserver;

/// OCR引擎的抽象接口。实现方只需对一张图片返回识别出的文本，
/// 进度通过回调上报，准确率与内部算法不在本工具关心范围内
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        image_path: &Path,
        lang: &str,
        progress: &dyn ProgressObserver,
    ) -> Result<String>;
}

/// 调用系统 tesseract 可执行文件的OCR实现
pub struct TesseractOcr {
    binary: String,
}

impl TesseractOcr {
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract".to_string())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(
        &self,
        image_path: &Path,
        lang: &str,
        progress: &dyn ProgressObserver,
    ) -> Result<String> {
        progress.on_progress("正在对图片进行OCR识别...");
        debug!("tesseract 输入: {}", image_path.display());

        let result = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .output();

        let output = match result {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(anyhow!(
                    "未找到 tesseract 可执行文件: {}，请安装后重试",
                    self.binary
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("tesseract 退出异常: {}", stderr.trim()));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        info!("OCR识别完成，输出 {} 字符", text.len());
        progress.on_progress("OCR识别完成");
        Ok(text)
    }
}
