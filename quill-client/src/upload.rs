use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use quill_core::ImageHost;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::settings::ClientSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Картинка, прочитанная с диска.
pub struct ImageFile {
    /// Имя файла для multipart-части.
    pub file_name: String,
    /// Содержимое.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Читает файл целиком.
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponseDto {
    secure_url: Option<String>,
}

#[derive(Debug, Clone)]
/// Загрузка картинок на внешний хостинг (`multipart`, поле `file` + `upload_preset`).
pub struct ImageUploader {
    upload_url: String,
    preset: Option<String>,
    client: Client,
}

impl ImageUploader {
    /// Создаёт загрузчик, если в настройках задан `upload_url`.
    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Option<Self>> {
        let Some(upload_url) = settings.upload_url.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Some(Self {
            upload_url,
            preset: settings.upload_preset.clone(),
            client,
        }))
    }
}

#[async_trait(?Send)]
impl ImageHost for ImageUploader {
    type Image = ImageFile;
    type Error = ClientError;

    async fn upload(&self, image: ImageFile) -> ClientResult<String> {
        debug!(file = %image.file_name, size = image.bytes.len(), "uploading image");

        let part = Part::bytes(image.bytes).file_name(image.file_name);
        let mut form = Form::new().part("file", part);
        if let Some(preset) = &self.preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upload(format!("image host returned {status}")));
        }

        let dto = response
            .json::<UploadResponseDto>()
            .await
            .map_err(ClientError::from_reqwest)?;
        dto.secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClientError::Upload("image host returned no secure_url".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploader_is_optional() {
        let settings = ClientSettings::new("http://api.local");
        let uploader = ImageUploader::from_settings(&settings).expect("settings are valid");
        assert!(uploader.is_none());

        let mut settings = settings;
        settings.upload_url = Some("http://img.local/upload".to_string());
        let uploader = ImageUploader::from_settings(&settings).expect("settings are valid");
        assert!(uploader.is_some());
    }

    #[tokio::test]
    async fn image_file_reads_name_and_bytes() {
        let path = std::env::temp_dir().join(format!("quill-upload-{}.png", std::process::id()));
        tokio::fs::write(&path, b"png-bytes").await.expect("write temp file");

        let image = ImageFile::from_path(&path).await.expect("read image");
        assert!(image.file_name.ends_with(".png"));
        assert_eq!(image.bytes, b"png-bytes");

        let _ = tokio::fs::remove_file(&path).await;
    }
}
