use serde::{Deserialize, Serialize};
use shared::Messages;
use std::env;

use crate::store::DEFAULT_CAPACITY;

/// Findings produced by the chest X-ray classifier, in output order.
pub const DEFAULT_LABELS: [&str; 14] = [
    "No Finding",
    "Enlarged Cardiomediastinum",
    "Cardiomegaly",
    "Lung Opacity",
    "Lung Lesion",
    "Edema",
    "Consolidation",
    "Pneumonia",
    "Atelectasis",
    "Pneumothorax",
    "Pleural Effusion",
    "Pleural Other",
    "Fracture",
    "Support Devices",
];

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set. Check the .env file.")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("Failed to read locale file: {0}")]
    LocaleRead(#[from] std::io::Error),
    #[error("Failed to parse locale file: {0}")]
    LocaleParse(#[from] serde_yaml::Error),
}

/// Backend strings returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerMessages {
    pub no_file: String,
    pub not_an_image: String,
    pub file_too_large: String,
    pub inference_failed: String,
    pub invalid_request: String,
    pub image_id_required: String,
    pub image_not_found: String,
    pub predictions_saved: String,
    pub comment_required: String,
    pub comment_saved: String,
    pub no_high_findings: String,
    pub no_medium_findings: String,
    pub report_api_error: String,
    /// `{high}` and `{medium}` are replaced with the finding lists.
    pub rate_limited_report: String,
}

impl Default for ServerMessages {
    fn default() -> Self {
        Self {
            no_file: "Dosya seçilmedi".into(),
            not_an_image: "Yüklenen dosya geçerli bir görüntü değil".into(),
            file_too_large: "Dosya boyutu 16 MB sınırını aşıyor".into(),
            inference_failed: "Tahmin yapılamadı. Lütfen tekrar deneyin.".into(),
            invalid_request: "Geçersiz istek".into(),
            image_id_required: "Resim ID'si gerekli".into(),
            image_not_found: "Resim bulunamadı".into(),
            predictions_saved: "Tahminler ve bilgiler başarıyla kaydedildi".into(),
            comment_required: "Resim ID ve yorum gerekli".into(),
            comment_saved: "Yorum başarıyla kaydedildi".into(),
            no_high_findings: "Yüksek olasılıklı hastalık tespit edilmedi".into(),
            no_medium_findings: "Orta olasılıklı hastalık tespit edilmedi".into(),
            report_api_error: "API hatası".into(),
            rate_limited_report: "API kullanım limiti aşıldı. Lütfen birkaç dakika bekleyip tekrar deneyin.

Bulgular:
- Yüksek olasılıklı hastalıklar: {high}
- Orta olasılıklı hastalıklar: {medium}

Değerlendirme:
- Lütfen birkaç dakika bekleyip raporu tekrar oluşturmayı deneyin.

Öneriler:
- Sistem şu anda yoğun kullanımda, lütfen daha sonra tekrar deneyin.

Takip Planı:
- Rapor oluşturma işlemini birkaç dakika sonra tekrar deneyebilirsiniz."
                .into(),
        }
    }
}

/// Client and server strings, loadable from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub client: Messages,
    pub server: ServerMessages,
}

impl Locale {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub url: String,
    pub labels: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_address: String,
    pub frontend_dir: String,
    pub max_upload_bytes: usize,
    pub max_stored_reviews: usize,
    pub inference: InferenceConfig,
    pub report: ReportConfig,
    pub locale: Locale,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT").unwrap_or_else(|| "8081".to_string());
        let frontend_dir = lookup("FRONTEND_DIR").unwrap_or_else(|| {
            match lookup("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => format!("{}/../frontend/dist", manifest_dir),
                None => "/usr/src/app/frontend/dist".to_string(),
            }
        });

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                value,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        let max_stored_reviews = match lookup("MAX_STORED_REVIEWS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_STORED_REVIEWS",
                value,
            })?,
            None => DEFAULT_CAPACITY,
        };

        let labels = match lookup("INFERENCE_LABELS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_LABELS.iter().map(|label| label.to_string()).collect(),
        };
        let timeout_secs = match lookup("INFERENCE_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "INFERENCE_TIMEOUT_SECS",
                value,
            })?,
            None => 60,
        };

        let inference = InferenceConfig {
            url: lookup("INFERENCE_URL").ok_or(ConfigError::Missing("INFERENCE_URL"))?,
            labels,
            timeout_secs,
        };

        let report = ReportConfig {
            api_key: lookup("GOOGLE_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            generation: GenerationConfig::default(),
        };

        let locale = match lookup("LOCALE_FILE") {
            Some(path) => Locale::load(&path)?,
            None => Locale::default(),
        };

        Ok(Self {
            bind_address: format!("0.0.0.0:{}", port),
            frontend_dir,
            max_upload_bytes,
            max_stored_reviews,
            inference,
            report,
            locale,
        })
    }
}
