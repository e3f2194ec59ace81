use shared::{prediction::labels_in_tier, ConfidenceTier, Prediction};

use crate::config::ServerMessages;

/// High and medium tier findings, in classifier order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingSummary {
    pub high: Vec<String>,
    pub medium: Vec<String>,
}

impl FindingSummary {
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let collect = |tier| {
            labels_in_tier(predictions, tier)
                .into_iter()
                .map(String::from)
                .collect()
        };
        Self {
            high: collect(ConfidenceTier::High),
            medium: collect(ConfidenceTier::Medium),
        }
    }

    fn high_text(&self, messages: &ServerMessages) -> String {
        join_or(&self.high, &messages.no_high_findings)
    }

    fn medium_text(&self, messages: &ServerMessages) -> String {
        join_or(&self.medium, &messages.no_medium_findings)
    }
}

fn join_or(labels: &[String], none: &str) -> String {
    if labels.is_empty() {
        none.to_string()
    } else {
        labels.join(", ")
    }
}

pub fn build_prompt(summary: &FindingSummary, messages: &ServerMessages) -> String {
    format!(
        "Sen deneyimli bir radyoloji uzmanısın. Aşağıdaki X-ray görüntüsünde tespit edilen hastalıklar için kısa ve öz bir tıbbi rapor hazırla.

Yüksek olasılıklı hastalıklar: {high}
Orta olasılıklı hastalıklar: {medium}

Lütfen aşağıdaki başlıklar altında kısa ve öz bir rapor hazırla:
1. Bulgular: Tespit edilen hastalıkların kısa açıklaması
2. Değerlendirme: Hastalıkların ciddiyeti ve etkileri
3. Öneriler: Kısa ve net öneriler
4. Takip Planı: Gerekli takip adımları

Önemli:
- Her bölümü 2-3 cümle ile özetle
- Bölümleri birer boş satırla ayır, her bölümün ilk satırı başlık olsun
- Gereksiz detaylardan kaçın
- Tıbbi terminolojiyi kullan
- Raporu Türkçe olarak hazırla
- Hasta bilgileri ve radyolog bilgilerini raporda belirtme",
        high = summary.high_text(messages),
        medium = summary.medium_text(messages),
    )
}

pub fn rate_limited_report(summary: &FindingSummary, messages: &ServerMessages) -> String {
    messages
        .rate_limited_report
        .replace("{high}", &summary.high_text(messages))
        .replace("{medium}", &summary.medium_text(messages))
}
