use std::collections::VecDeque;

use crate::api::{execute, ReviewApi};
use crate::workflow::{Command, Msg, Request, Workflow};

/// Single-threaded task queue around a [`Workflow`].
///
/// `dispatch` runs a handler and parks the requests it emits; nothing is sent
/// until `run_until_idle`, which performs them in order and feeds each reply
/// back through the workflow. Timers are collected and fired on demand.
pub struct Driver<A> {
    workflow: Workflow,
    api: A,
    pending: VecDeque<Request>,
    timers: Vec<(u32, Msg)>,
}

impl<A: ReviewApi> Driver<A> {
    pub fn new(api: A, workflow: Workflow) -> Self {
        Self {
            workflow,
            api,
            pending: VecDeque::new(),
            timers: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        for command in self.workflow.update(msg) {
            match command {
                Command::Request(request) => self.pending.push_back(request),
                Command::Schedule { after_ms, msg } => self.timers.push((after_ms, msg)),
            }
        }
    }

    /// Runs queued requests, including ones emitted by replies. Returns how
    /// many were performed.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut performed = 0;
        while let Some(request) = self.pending.pop_front() {
            let reply = execute(&self.api, request).await;
            performed += 1;
            self.dispatch(reply);
        }
        performed
    }

    /// Fires every armed timer, shortest delay first.
    pub fn fire_timers(&mut self) {
        let mut timers = std::mem::take(&mut self.timers);
        timers.sort_by_key(|(after_ms, _)| *after_ms);
        for (_, msg) in timers {
            self.dispatch(msg);
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;

    use super::*;
    use crate::error::TransportError;
    use crate::history::HistoryControl;
    use crate::prediction::Prediction;
    use crate::session::SaveState;
    use crate::upload::{ImageSubmission, SelectedFile, UploadDisplay};
    use crate::wire::{
        HistoryLabel, HistoryRecord, SavePredictionsRequest, SaveResponse, UploadResponse,
    };

    #[derive(Default)]
    struct FakeApi {
        uploads: RefCell<VecDeque<Result<UploadResponse, TransportError>>>,
        saves: RefCell<VecDeque<Result<SaveResponse, TransportError>>>,
        history: RefCell<Vec<HistoryRecord>>,
        calls: RefCell<Vec<String>>,
        saved: RefCell<Vec<SavePredictionsRequest>>,
    }

    impl ReviewApi for FakeApi {
        async fn upload(&self, submission: &ImageSubmission) -> Result<UploadResponse, TransportError> {
            self.calls.borrow_mut().push(format!("upload {}", submission.file_name()));
            self.uploads
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("no reply queued".into())))
        }

        async fn save_predictions(&self, body: &SavePredictionsRequest) -> Result<SaveResponse, TransportError> {
            self.calls.borrow_mut().push(format!("save {}", body.image_id));
            self.saved.borrow_mut().push(body.clone());
            self.saves
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(SaveResponse::ok("ok")))
        }

        async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, TransportError> {
            self.calls.borrow_mut().push("history".into());
            Ok(self.history.borrow().clone())
        }
    }

    fn png() -> SelectedFile {
        SelectedFile {
            name: "chest.png".into(),
            media_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn upload_review_and_empty_save_scenario() {
        let api = FakeApi::default();
        api.uploads.borrow_mut().push_back(Ok(UploadResponse::accepted(
            vec![Prediction::new("Pneumonia", 0.72), Prediction::new("Edema", 0.3)],
            "Findings\nClear lungs.\n\nImpression\nNormal.".into(),
            "img123".into(),
        )));
        let mut driver = Driver::new(api, Workflow::default());

        driver.dispatch(Msg::FileSelected(png()));
        assert!(matches!(driver.workflow().session.display(), UploadDisplay::Preview(_)));

        driver.dispatch(Msg::SubmitUpload);
        assert!(!driver.workflow().session.is_submit_enabled());
        assert_eq!(block_on(driver.run_until_idle()), 1);
        assert!(driver.workflow().session.is_submit_enabled());

        let review = driver.workflow().session.review().unwrap();
        assert_eq!(review.triage.labels(), vec!["Pneumonia", "Edema"]);
        assert!(review.triage.is_selected("Pneumonia"));
        assert!(!review.triage.is_selected("Edema"));
        let titles: Vec<_> = review.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Findings", "Impression"]);

        driver.dispatch(Msg::PredictionToggled {
            key: "Pneumonia".into(),
            checked: false,
        });
        driver.dispatch(Msg::SaveClicked);
        assert_eq!(driver.pending_requests(), 0);
        assert_eq!(block_on(driver.run_until_idle()), 0);
        assert_eq!(*driver.api().calls.borrow(), vec!["upload chest.png".to_string()]);
        let messages = &driver.workflow().messages;
        assert_eq!(
            driver.workflow().session.notice().unwrap().text,
            messages.select_at_least_one
        );
    }

    #[test]
    fn second_submit_while_in_flight_is_dropped() {
        let api = FakeApi::default();
        api.uploads.borrow_mut().push_back(Ok(UploadResponse::rejected("Dosya seçilmedi")));
        let mut driver = Driver::new(api, Workflow::default());

        driver.dispatch(Msg::FileSelected(png()));
        driver.dispatch(Msg::SubmitUpload);
        driver.dispatch(Msg::SubmitUpload);
        assert_eq!(driver.pending_requests(), 1);

        block_on(driver.run_until_idle());
        let session = &driver.workflow().session;
        assert!(session.is_submit_enabled());
        assert_eq!(session.notice().unwrap().text, "Dosya seçilmedi");
        assert!(session.review().is_none());
    }

    #[test]
    fn failed_save_round_trip_never_marks_saved() {
        let api = FakeApi::default();
        api.uploads.borrow_mut().push_back(Ok(UploadResponse::accepted(
            vec![Prediction::new("Cardiomegaly", 0.8)],
            "Bulgular\nKardiyomegali.".into(),
            "9".into(),
        )));
        api.saves
            .borrow_mut()
            .push_back(Err(TransportError::Malformed {
                status: 500,
                detail: "expected value".into(),
            }));
        let mut driver = Driver::new(api, Workflow::default());

        driver.dispatch(Msg::FileSelected(png()));
        driver.dispatch(Msg::SubmitUpload);
        block_on(driver.run_until_idle());
        driver.dispatch(Msg::PatientNameChanged("Mehmet Kaya".into()));
        driver.dispatch(Msg::DoctorCommentChanged("Kontrol önerilir".into()));
        driver.dispatch(Msg::SaveClicked);
        assert!(driver.workflow().session.is_saving());
        block_on(driver.run_until_idle());

        let session = &driver.workflow().session;
        assert_eq!(session.save_state(), SaveState::Ready);
        assert!(!session.is_saving());
        let saved = driver.api().saved.borrow();
        assert_eq!(saved[0].patient_name.as_deref(), Some("Mehmet Kaya"));
        assert_eq!(saved[0].doctor_comment.as_deref(), Some("Kontrol önerilir"));

        drop(saved);
        driver.dispatch(Msg::SaveClicked);
        block_on(driver.run_until_idle());
        assert_eq!(driver.workflow().session.save_state(), SaveState::Saved);
    }

    #[test]
    fn history_save_and_notice_timer() {
        let api = FakeApi::default();
        api.history.borrow_mut().push(HistoryRecord {
            image_id: "3".into(),
            filename: "old.png".into(),
            created_at: "2025-02-01T08:00:00Z".into(),
            patient_name: Some("Ali Veli".into()),
            llm_report: None,
            labels: vec![HistoryLabel {
                disease_name: "Lung Opacity".into(),
                confidence: 0.45,
                is_confirmed: false,
            }],
            comments: vec![],
            media_type: None,
            image_base64: None,
        });
        let mut driver = Driver::new(api, Workflow::default());

        driver.dispatch(Msg::HistoryRequested);
        block_on(driver.run_until_idle());
        assert!(driver.workflow().history.is_loaded());

        driver.dispatch(Msg::HistoryToggled {
            image_id: "3".into(),
            key: "Lung_Opacity".into(),
            checked: true,
        });
        driver.dispatch(Msg::HistorySaveClicked("3".into()));
        block_on(driver.run_until_idle());

        let entry = driver.workflow().history.get(&"3".into()).unwrap();
        assert_eq!(entry.control(), HistoryControl::Saved);
        assert!(entry.notice().is_some());
        assert_eq!(driver.armed_timers(), 1);
        assert_eq!(driver.api().saved.borrow()[0].patient_name, None);

        driver.fire_timers();
        assert!(driver.workflow().history.get(&"3".into()).unwrap().notice().is_none());
        assert_eq!(driver.armed_timers(), 0);
    }
}
