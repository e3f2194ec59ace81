//! Event dispatch for the review client.
//!
//! Every user interaction and every completed request enters as a [`Msg`].
//! [`Workflow::update`] runs the matching handler to completion and returns
//! the [`Command`]s the host must carry out: requests to send (the only
//! suspension points) and timers to arm. Replies come back as `Msg`s tagged
//! with the ticket of the request that produced them.

use crate::error::TransportError;
use crate::history::{HistoryBoard, NOTICE_DISMISS_MS};
use crate::messages::Messages;
use crate::session::{ReviewSession, Ticket};
use crate::upload::{ImageSubmission, SelectedFile};
use crate::wire::{HistoryRecord, ImageId, SavePredictionsRequest, SaveResponse, UploadResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    // Live review
    FileSelected(SelectedFile),
    SubmitUpload,
    UploadFinished {
        ticket: Ticket,
        result: Result<UploadResponse, TransportError>,
    },
    PredictionToggled {
        key: String,
        checked: bool,
    },
    PatientNameChanged(String),
    DoctorCommentChanged(String),
    SaveClicked,
    SaveFinished {
        ticket: Ticket,
        result: Result<SaveResponse, TransportError>,
    },

    // History
    HistoryRequested,
    HistoryFetched {
        ticket: Ticket,
        result: Result<Vec<HistoryRecord>, TransportError>,
    },
    HistoryToggled {
        image_id: ImageId,
        key: String,
        checked: bool,
    },
    HistorySaveClicked(ImageId),
    HistorySaveFinished {
        image_id: ImageId,
        ticket: Ticket,
        result: Result<SaveResponse, TransportError>,
    },
    HistoryNoticeExpired {
        image_id: ImageId,
        seq: u64,
    },

    MessagesLoaded(Messages),
}

/// A network call the host must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Upload {
        ticket: Ticket,
        submission: ImageSubmission,
    },
    SavePredictions {
        ticket: Ticket,
        body: SavePredictionsRequest,
    },
    SaveHistory {
        ticket: Ticket,
        body: SavePredictionsRequest,
    },
    FetchHistory {
        ticket: Ticket,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Request(Request),
    /// Deliver `msg` after `after_ms` milliseconds.
    Schedule { after_ms: u32, msg: Msg },
}

#[derive(Debug, Default)]
pub struct Workflow {
    pub messages: Messages,
    pub session: ReviewSession,
    pub history: HistoryBoard,
}

impl Workflow {
    pub fn new(messages: Messages) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Command> {
        let messages = &self.messages;
        match msg {
            Msg::FileSelected(file) => {
                let _ = self.session.select_file(file, messages);
                vec![]
            }
            Msg::SubmitUpload => match self.session.begin_submit(messages) {
                Ok(request) => vec![Command::Request(Request::Upload {
                    ticket: request.ticket,
                    submission: request.submission,
                })],
                Err(err) => {
                    log::debug!("Upload not started: {}", err);
                    vec![]
                }
            },
            Msg::UploadFinished { ticket, result } => {
                let _ = self.session.finish_submit(ticket, result, messages);
                vec![]
            }
            Msg::PredictionToggled { key, checked } => {
                if let Err(err) = self.session.toggle_prediction(&key, checked) {
                    log::warn!("Toggle ignored: {}", err);
                }
                vec![]
            }
            Msg::PatientNameChanged(value) => {
                self.session.set_patient_name(value);
                vec![]
            }
            Msg::DoctorCommentChanged(value) => {
                self.session.set_doctor_comment(value);
                vec![]
            }
            Msg::SaveClicked => match self.session.begin_save(messages) {
                Ok(request) => vec![Command::Request(Request::SavePredictions {
                    ticket: request.ticket,
                    body: request.body,
                })],
                Err(err) => {
                    log::debug!("Save not started: {}", err);
                    vec![]
                }
            },
            Msg::SaveFinished { ticket, result } => {
                let _ = self.session.finish_save(ticket, result, messages);
                vec![]
            }

            Msg::HistoryRequested => {
                let ticket = self.history.begin_fetch();
                vec![Command::Request(Request::FetchHistory { ticket })]
            }
            Msg::HistoryFetched { ticket, result } => {
                let _ = self.history.finish_fetch(ticket, result, messages);
                vec![]
            }
            Msg::HistoryToggled {
                image_id,
                key,
                checked,
            } => {
                if let Err(err) = self.history.toggle(&image_id, &key, checked) {
                    log::warn!("History toggle ignored: {}", err);
                }
                vec![]
            }
            Msg::HistorySaveClicked(image_id) => match self.history.begin_save(&image_id, messages) {
                Ok(request) => vec![Command::Request(Request::SaveHistory {
                    ticket: request.ticket,
                    body: request.body,
                })],
                Err(err) => {
                    log::debug!("History save for {} not started: {}", image_id, err);
                    vec![]
                }
            },
            Msg::HistorySaveFinished {
                image_id,
                ticket,
                result,
            } => match self.history.finish_save(&image_id, ticket, result, messages) {
                Ok(Some(seq)) => vec![Command::Schedule {
                    after_ms: NOTICE_DISMISS_MS,
                    msg: Msg::HistoryNoticeExpired { image_id, seq },
                }],
                _ => vec![],
            },
            Msg::HistoryNoticeExpired { image_id, seq } => {
                self.history.dismiss_notice(&image_id, seq);
                vec![]
            }

            Msg::MessagesLoaded(messages) => {
                self.messages = messages;
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Prediction;

    fn png() -> SelectedFile {
        SelectedFile {
            name: "a.png".into(),
            media_type: "image/png".into(),
            bytes: vec![1],
        }
    }

    #[test]
    fn submit_emits_one_upload_request() {
        let mut workflow = Workflow::default();
        assert!(workflow.update(Msg::SubmitUpload).is_empty());

        workflow.update(Msg::FileSelected(png()));
        let commands = workflow.update(Msg::SubmitUpload);
        assert!(matches!(commands.as_slice(), [Command::Request(Request::Upload { .. })]));
        assert!(workflow.update(Msg::SubmitUpload).is_empty());
    }

    #[test]
    fn empty_selection_emits_no_request() {
        let mut workflow = Workflow::default();
        workflow.update(Msg::FileSelected(png()));
        let Command::Request(Request::Upload { ticket, .. }) =
            workflow.update(Msg::SubmitUpload).remove(0)
        else {
            panic!("expected upload request");
        };
        workflow.update(Msg::UploadFinished {
            ticket,
            result: Ok(UploadResponse::accepted(
                vec![Prediction::new("Edema", 0.1)],
                String::new(),
                "1".into(),
            )),
        });
        assert!(workflow.update(Msg::SaveClicked).is_empty());
    }

    #[test]
    fn history_success_schedules_dismissal() {
        let mut workflow = Workflow::default();
        let Command::Request(Request::FetchHistory { ticket }) =
            workflow.update(Msg::HistoryRequested).remove(0)
        else {
            panic!("expected fetch request");
        };
        workflow.update(Msg::HistoryFetched {
            ticket,
            result: Ok(vec![HistoryRecord {
                image_id: "5".into(),
                filename: "a.png".into(),
                created_at: String::new(),
                patient_name: None,
                llm_report: None,
                labels: vec![crate::wire::HistoryLabel {
                    disease_name: "Edema".into(),
                    confidence: 0.3,
                    is_confirmed: true,
                }],
                comments: vec![],
                media_type: None,
                image_base64: None,
            }]),
        });

        let Command::Request(Request::SaveHistory { ticket, body }) =
            workflow.update(Msg::HistorySaveClicked("5".into())).remove(0)
        else {
            panic!("expected save request");
        };
        assert_eq!(body.confirmed_labels, vec!["Edema".to_string()]);

        let commands = workflow.update(Msg::HistorySaveFinished {
            image_id: "5".into(),
            ticket,
            result: Ok(SaveResponse::ok("ok")),
        });
        assert_eq!(
            commands,
            vec![Command::Schedule {
                after_ms: NOTICE_DISMISS_MS,
                msg: Msg::HistoryNoticeExpired {
                    image_id: "5".into(),
                    seq: 1,
                },
            }]
        );
    }

    #[test]
    fn loaded_messages_replace_defaults() {
        let mut workflow = Workflow::default();
        let messages = Messages {
            predict_button: "Predict".into(),
            ..Messages::default()
        };
        workflow.update(Msg::MessagesLoaded(messages));
        assert_eq!(workflow.session.predict_caption(&workflow.messages), "Predict");
    }
}
