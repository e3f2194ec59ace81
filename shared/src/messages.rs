use serde::{Deserialize, Serialize};

/// User-facing strings of the review client.
///
/// Defaults are Turkish. Any field missing from a deserialized locale falls
/// back to its default, so partial translations are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub invalid_file_type: String,
    pub no_file_selected: String,
    pub generic_retry: String,
    pub select_at_least_one: String,
    pub save_success: String,
    pub history_save_success: String,
    pub history_load_failed: String,
    pub upload_placeholder: String,
    pub predict_button: String,
    pub predict_busy: String,
    pub save_button: String,
    pub save_busy: String,
    pub saved_button: String,
    pub patient_name_label: String,
    pub doctor_comment_label: String,
    pub predictions_title: String,
    pub report_title: String,
    pub analysis_tab: String,
    pub history_tab: String,
    pub history_empty: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_file_type: "Lütfen geçerli bir görüntü dosyası seçin.".into(),
            no_file_selected: "Lütfen bir görüntü seçin.".into(),
            generic_retry: "Bir hata oluştu. Lütfen tekrar deneyin.".into(),
            select_at_least_one: "Lütfen en az bir tahmin seçin.".into(),
            save_success: "Tahminler ve bilgiler başarıyla kaydedildi.".into(),
            history_save_success: "Tahminler başarıyla kaydedildi.".into(),
            history_load_failed: "Geçmiş yüklenemedi. Lütfen tekrar deneyin.".into(),
            upload_placeholder: "Görüntü yüklemek için tıklayın".into(),
            predict_button: "Tahmin Et".into(),
            predict_busy: "İşleniyor...".into(),
            save_button: "Seçili Tahminleri Kaydet".into(),
            save_busy: "Kaydediliyor...".into(),
            saved_button: "Kaydedildi".into(),
            patient_name_label: "Hasta Adı".into(),
            doctor_comment_label: "Doktor Yorumu".into(),
            predictions_title: "Tahminler".into(),
            report_title: "Rapor".into(),
            analysis_tab: "Analiz".into(),
            history_tab: "Geçmiş".into(),
            history_empty: "Henüz kayıt yok.".into(),
        }
    }
}
