use derive_more::Display;

use crate::error::{TransportError, WorkflowError};
use crate::messages::Messages;
use crate::report::{render_report, ReportSection};
use crate::triage::TriageList;
use crate::upload::{ImageSubmission, SelectedFile, UploadDisplay};
use crate::wire::{ImageId, SavePredictionsRequest, SaveResponse, UploadResponse};

/// Identifies one outstanding request; replies carry it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub struct Ticket(u64);

impl Ticket {
    pub(crate) fn issue(counter: &mut u64) -> Self {
        *counter += 1;
        Ticket(*counter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Caption state of the confirmation control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveState {
    #[default]
    Ready,
    Saved,
}

/// The review currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub image_id: ImageId,
    pub triage: TriageList,
    pub sections: Vec<ReportSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub ticket: Ticket,
    pub submission: ImageSubmission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: Ticket,
    pub body: SavePredictionsRequest,
}

/// In-memory context of one live review session.
///
/// Nothing here is durable: the staged file, the last prediction set, the
/// last report and the current image id live only until they are replaced.
#[derive(Debug, Default)]
pub struct ReviewSession {
    staged: Option<ImageSubmission>,
    display: UploadDisplay,
    input_reset_pending: bool,
    upload_in_flight: Option<Ticket>,
    review: Option<Review>,
    save_area_visible: bool,
    save_state: SaveState,
    save_in_flight: Option<Ticket>,
    save_sent: Vec<String>,
    patient_name: String,
    doctor_comment: String,
    notice: Option<Notice>,
    next_ticket: u64,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_file(&mut self, file: SelectedFile, messages: &Messages) -> Result<(), WorkflowError> {
        match ImageSubmission::stage(file) {
            Ok(submission) => {
                self.display = UploadDisplay::Preview(submission.data_url());
                self.staged = Some(submission);
                self.notice = None;
                Ok(())
            }
            Err(err) => {
                log::warn!("Rejected file selection: {}", err);
                self.staged = None;
                self.display = UploadDisplay::Placeholder;
                self.input_reset_pending = true;
                Err(self.fail(err, messages))
            }
        }
    }

    /// Returns `true` once after a rejected selection; the host then clears
    /// its file input.
    pub fn take_input_reset(&mut self) -> bool {
        std::mem::take(&mut self.input_reset_pending)
    }

    pub fn begin_submit(&mut self, messages: &Messages) -> Result<UploadRequest, WorkflowError> {
        if self.upload_in_flight.is_some() {
            return Err(WorkflowError::SubmissionInFlight);
        }
        let Some(submission) = self.staged.clone() else {
            return Err(self.fail(WorkflowError::NoFileStaged, messages));
        };

        let ticket = Ticket::issue(&mut self.next_ticket);
        self.upload_in_flight = Some(ticket);
        self.save_area_visible = false;
        // a pending save belongs to the review being replaced
        self.save_in_flight = None;

        Ok(UploadRequest { ticket, submission })
    }

    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<UploadResponse, TransportError>,
        messages: &Messages,
    ) -> Result<(), WorkflowError> {
        if self.upload_in_flight != Some(ticket) {
            log::debug!("Ignoring stale upload reply {}", ticket);
            return Ok(());
        }
        self.upload_in_flight = None;

        let payload = result
            .map_err(WorkflowError::from)
            .and_then(UploadResponse::into_payload);

        match payload {
            Ok(payload) => {
                self.review = Some(Review {
                    image_id: payload.image_id,
                    triage: TriageList::render(payload.predictions),
                    sections: render_report(&payload.report),
                });
                self.save_area_visible = true;
                self.save_state = SaveState::Ready;
                self.notice = None;
                Ok(())
            }
            Err(err) => {
                if let WorkflowError::Transport(detail) = &err {
                    log::warn!("Prediction request failed: {}", detail);
                }
                Err(self.fail(err, messages))
            }
        }
    }

    pub fn toggle_prediction(&mut self, key: &str, checked: bool) -> Result<(), WorkflowError> {
        let review = self.review.as_mut().ok_or(WorkflowError::NoActiveReview)?;
        if !review.triage.set_selected(key, checked) {
            return Err(WorkflowError::UnknownLabel(key.to_string()));
        }
        self.save_state = SaveState::Ready;
        Ok(())
    }

    pub fn set_patient_name(&mut self, value: String) {
        self.patient_name = value;
    }

    pub fn set_doctor_comment(&mut self, value: String) {
        self.doctor_comment = value;
    }

    pub fn begin_save(&mut self, messages: &Messages) -> Result<SaveRequest, WorkflowError> {
        let (image_id, confirmed_labels) = match &self.review {
            Some(review) if self.save_area_visible => {
                (review.image_id.clone(), review.triage.selected_labels())
            }
            _ => return Err(WorkflowError::NoActiveReview),
        };
        if self.save_in_flight.is_some() {
            return Err(WorkflowError::SaveInFlight);
        }
        if confirmed_labels.is_empty() {
            return Err(self.fail(WorkflowError::EmptySelection, messages));
        }

        self.save_sent = confirmed_labels.clone();
        let body = SavePredictionsRequest {
            image_id,
            confirmed_labels,
            patient_name: non_blank(&self.patient_name),
            doctor_comment: non_blank(&self.doctor_comment),
        };
        let ticket = Ticket::issue(&mut self.next_ticket);
        self.save_in_flight = Some(ticket);

        Ok(SaveRequest { ticket, body })
    }

    /// On failure the save state is left exactly as it was before the call.
    /// A success only marks the review saved while the selection still equals
    /// the label set that was sent.
    pub fn finish_save(
        &mut self,
        ticket: Ticket,
        result: Result<SaveResponse, TransportError>,
        messages: &Messages,
    ) -> Result<(), WorkflowError> {
        if self.save_in_flight != Some(ticket) {
            log::debug!("Ignoring stale save reply {}", ticket);
            return Ok(());
        }
        self.save_in_flight = None;
        let sent = std::mem::take(&mut self.save_sent);

        match result.map_err(WorkflowError::from).and_then(SaveResponse::into_result) {
            Ok(()) => {
                let unchanged = self
                    .review
                    .as_ref()
                    .is_some_and(|review| review.triage.selected_labels() == sent);
                if unchanged {
                    self.save_state = SaveState::Saved;
                } else {
                    log::debug!("Selection changed while save {} was in flight", ticket);
                }
                self.notice = Some(Notice::new(NoticeLevel::Success, &messages.save_success));
                Ok(())
            }
            Err(err) => {
                if let WorkflowError::Transport(detail) = &err {
                    log::warn!("Save request failed: {}", detail);
                }
                Err(self.fail(err, messages))
            }
        }
    }

    fn fail(&mut self, err: WorkflowError, messages: &Messages) -> WorkflowError {
        let level = match err {
            WorkflowError::EmptySelection => NoticeLevel::Warning,
            _ => NoticeLevel::Danger,
        };
        self.notice = Some(Notice::new(level, err.user_message(messages)));
        err
    }

    pub fn staged(&self) -> Option<&ImageSubmission> {
        self.staged.as_ref()
    }

    pub fn display(&self) -> &UploadDisplay {
        &self.display
    }

    pub fn is_submitting(&self) -> bool {
        self.upload_in_flight.is_some()
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.upload_in_flight.is_none()
    }

    pub fn review(&self) -> Option<&Review> {
        self.review.as_ref()
    }

    pub fn current_image_id(&self) -> Option<&ImageId> {
        self.review.as_ref().map(|review| &review.image_id)
    }

    pub fn save_area_visible(&self) -> bool {
        self.save_area_visible
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight.is_some()
    }

    pub fn is_save_enabled(&self) -> bool {
        self.save_area_visible && self.save_in_flight.is_none()
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn doctor_comment(&self) -> &str {
        &self.doctor_comment
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn predict_caption<'a>(&self, messages: &'a Messages) -> &'a str {
        if self.is_submitting() {
            &messages.predict_busy
        } else {
            &messages.predict_button
        }
    }

    pub fn save_caption<'a>(&self, messages: &'a Messages) -> &'a str {
        match (self.is_saving(), self.save_state) {
            (true, _) => &messages.save_busy,
            (false, SaveState::Saved) => &messages.saved_button,
            (false, SaveState::Ready) => &messages.save_button,
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
