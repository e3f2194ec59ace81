use std::collections::BTreeMap;

use crate::error::{TransportError, WorkflowError};
use crate::messages::Messages;
use crate::prediction::ConfidenceTier;
use crate::report::{render_report, ReportSection};
use crate::session::{Notice, NoticeLevel, Ticket};
use crate::triage::item_key;
use crate::wire::{CommentRecord, HistoryRecord, ImageId, SavePredictionsRequest, SaveResponse};

/// Delay before a history success notice disappears.
pub const NOTICE_DISMISS_MS: u32 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLabelState {
    pub key: String,
    pub label: String,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub checked: bool,
}

impl HistoryLabelState {
    pub fn percentage(&self) -> String {
        format!("{:.1}", self.confidence * 100.0)
    }
}

/// Which of the two per-record buttons is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryControl {
    Save,
    Saved,
}

/// One stored review shown for re-confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub image_id: ImageId,
    pub filename: String,
    pub created_at: String,
    pub patient_name: Option<String>,
    pub sections: Vec<ReportSection>,
    pub comments: Vec<CommentRecord>,
    pub preview: Option<String>,
    labels: Vec<HistoryLabelState>,
    control: HistoryControl,
    save_in_flight: Option<Ticket>,
    save_sent: Vec<String>,
    notice: Option<(u64, Notice)>,
}

impl HistoryEntry {
    fn from_record(record: HistoryRecord) -> Self {
        // stored order, no tier pre-check
        let labels: Vec<HistoryLabelState> = record
            .labels
            .into_iter()
            .map(|label| HistoryLabelState {
                key: item_key(&label.disease_name),
                tier: ConfidenceTier::of(label.confidence),
                label: label.disease_name,
                confidence: label.confidence,
                checked: label.is_confirmed,
            })
            .collect();
        let control = if labels.iter().any(|label| label.checked) {
            HistoryControl::Saved
        } else {
            HistoryControl::Save
        };
        let preview = match (record.media_type, record.image_base64) {
            (Some(media_type), Some(data)) => Some(format!("data:{media_type};base64,{data}")),
            _ => None,
        };

        Self {
            image_id: record.image_id,
            filename: record.filename,
            created_at: record.created_at,
            patient_name: record.patient_name,
            sections: record.llm_report.as_deref().map(render_report).unwrap_or_default(),
            comments: record.comments,
            preview,
            labels,
            control,
            save_in_flight: None,
            save_sent: Vec::new(),
            notice: None,
        }
    }

    pub fn labels(&self) -> &[HistoryLabelState] {
        &self.labels
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.labels.iter().any(|label| label.key == key && label.checked)
    }

    pub fn checked_labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .filter(|label| label.checked)
            .map(|label| label.label.clone())
            .collect()
    }

    pub fn control(&self) -> HistoryControl {
        self.control
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref().map(|(_, notice)| notice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySaveRequest {
    pub ticket: Ticket,
    pub body: SavePredictionsRequest,
}

/// Per-record confirmation state of the history view.
///
/// Every record owns its selection, buttons, pending request and notice, so
/// saving one record never touches another even when labels coincide.
#[derive(Debug, Default)]
pub struct HistoryBoard {
    order: Vec<ImageId>,
    entries: BTreeMap<ImageId, HistoryEntry>,
    fetch_in_flight: Option<Ticket>,
    loaded: bool,
    alert: Option<String>,
    notice: Option<Notice>,
    next_ticket: u64,
    next_notice: u64,
}

impl HistoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new fetch supersedes any outstanding one.
    pub fn begin_fetch(&mut self) -> Ticket {
        let ticket = Ticket::issue(&mut self.next_ticket);
        self.fetch_in_flight = Some(ticket);
        ticket
    }

    pub fn finish_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<HistoryRecord>, TransportError>,
        messages: &Messages,
    ) -> Result<(), WorkflowError> {
        if self.fetch_in_flight != Some(ticket) {
            log::debug!("Ignoring stale history reply {}", ticket);
            return Ok(());
        }
        self.fetch_in_flight = None;

        match result {
            Ok(records) => {
                self.load(records);
                Ok(())
            }
            Err(err) => {
                log::warn!("History request failed: {}", err);
                self.notice = Some(Notice::new(NoticeLevel::Danger, &messages.history_load_failed));
                Err(err.into())
            }
        }
    }

    /// Replaces every entry; pending saves of replaced entries become stale.
    pub fn load(&mut self, records: Vec<HistoryRecord>) {
        self.order.clear();
        self.entries.clear();
        self.notice = None;
        for record in records {
            let entry = HistoryEntry::from_record(record);
            if self.entries.contains_key(&entry.image_id) {
                log::warn!("Duplicate history record {}", entry.image_id);
                continue;
            }
            self.order.push(entry.image_id.clone());
            self.entries.insert(entry.image_id.clone(), entry);
        }
        self.loaded = true;
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_in_flight.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Entries in the order the backend listed them.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn get(&self, id: &ImageId) -> Option<&HistoryEntry> {
        self.entries.get(id)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// The host shows the alert once and clears it.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    fn entry_mut(&mut self, id: &ImageId) -> Result<&mut HistoryEntry, WorkflowError> {
        self.entries
            .get_mut(id)
            .ok_or_else(|| WorkflowError::UnknownRecord(id.to_string()))
    }

    /// Changing a record's selection re-arms only that record's save button.
    pub fn toggle(&mut self, id: &ImageId, key: &str, checked: bool) -> Result<(), WorkflowError> {
        let entry = self.entry_mut(id)?;
        let label = entry
            .labels
            .iter_mut()
            .find(|label| label.key == key)
            .ok_or_else(|| WorkflowError::UnknownLabel(key.to_string()))?;
        label.checked = checked;
        entry.control = HistoryControl::Save;
        Ok(())
    }

    pub fn begin_save(&mut self, id: &ImageId, messages: &Messages) -> Result<HistorySaveRequest, WorkflowError> {
        let entry = self.entry_mut(id)?;
        if entry.save_in_flight.is_some() {
            return Err(WorkflowError::SaveInFlight);
        }
        let confirmed_labels = entry.checked_labels();
        if confirmed_labels.is_empty() {
            let err = WorkflowError::EmptySelection;
            self.alert = Some(err.user_message(messages));
            return Err(err);
        }

        let ticket = Ticket::issue(&mut self.next_ticket);
        let entry = self.entry_mut(id)?;
        entry.save_in_flight = Some(ticket);
        entry.save_sent = confirmed_labels.clone();

        Ok(HistorySaveRequest {
            ticket,
            body: SavePredictionsRequest {
                image_id: id.clone(),
                confirmed_labels,
                patient_name: None,
                doctor_comment: None,
            },
        })
    }

    /// On success returns the sequence number of the notice to dismiss after
    /// `NOTICE_DISMISS_MS`. Stale replies return `Ok(None)`. The control only
    /// flips to `Saved` while the checked labels still equal the ones sent.
    pub fn finish_save(
        &mut self,
        id: &ImageId,
        ticket: Ticket,
        result: Result<SaveResponse, TransportError>,
        messages: &Messages,
    ) -> Result<Option<u64>, WorkflowError> {
        let Some(entry) = self.entries.get_mut(id) else {
            log::debug!("Ignoring save reply for vanished record {}", id);
            return Ok(None);
        };
        if entry.save_in_flight != Some(ticket) {
            log::debug!("Ignoring stale save reply {} for {}", ticket, id);
            return Ok(None);
        }
        entry.save_in_flight = None;
        let sent = std::mem::take(&mut entry.save_sent);

        match result.map_err(WorkflowError::from).and_then(SaveResponse::into_result) {
            Ok(()) => {
                self.next_notice += 1;
                let seq = self.next_notice;
                if entry.checked_labels() == sent {
                    entry.control = HistoryControl::Saved;
                }
                entry.notice = Some((
                    seq,
                    Notice::new(NoticeLevel::Success, &messages.history_save_success),
                ));
                Ok(Some(seq))
            }
            Err(err) => {
                if let WorkflowError::Transport(detail) = &err {
                    log::warn!("History save for {} failed: {}", id, detail);
                }
                self.alert = Some(err.user_message(messages));
                Err(err)
            }
        }
    }

    /// A later notice on the same record is left alone.
    pub fn dismiss_notice(&mut self, id: &ImageId, seq: u64) {
        if let Some(entry) = self.entries.get_mut(id) {
            if entry.notice.as_ref().is_some_and(|(current, _)| *current == seq) {
                entry.notice = None;
            }
        }
    }
}
