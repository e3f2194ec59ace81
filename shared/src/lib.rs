pub mod api;
pub mod error;
pub mod history;
pub mod messages;
pub mod prediction;
pub mod report;
pub mod runtime;
pub mod session;
pub mod triage;
pub mod upload;
pub mod wire;
pub mod workflow;

pub use api::{execute, ReviewApi};
pub use error::{ErrorKind, TransportError, WorkflowError};
pub use history::{HistoryBoard, HistoryControl, HistoryEntry, HistoryLabelState, NOTICE_DISMISS_MS};
pub use messages::Messages;
pub use prediction::{ConfidenceTier, Prediction};
pub use report::{render_report, ReportSection};
pub use runtime::Driver;
pub use session::{Notice, NoticeLevel, Review, ReviewSession, SaveState, Ticket};
pub use triage::{item_key, TriageItem, TriageList};
pub use upload::{is_image_media_type, FileReads, ImageSubmission, SelectedFile, UploadDisplay};
pub use wire::{
    decode_response, CommentRecord, HistoryLabel, HistoryRecord, ImageId, SaveCommentRequest,
    SavePredictionsRequest, SaveResponse, UploadPayload, UploadResponse,
};
pub use workflow::{Command, Msg, Request, Workflow};
