use std::sync::Arc;

use crate::config::Locale;
use crate::inference::Classifier;
use crate::report::ReportGenerator;
use crate::store::ReviewStore;

/// Shared handler state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: ReviewStore,
    pub classifier: Arc<dyn Classifier>,
    pub reports: Arc<dyn ReportGenerator>,
    pub locale: Arc<Locale>,
    pub max_upload_bytes: usize,
}
