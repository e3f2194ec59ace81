use crate::{Model, Msg, Page};
use gloo_file::File as GlooFile;
use gloo_file::futures::read_as_bytes;
use gloo_timers::callback::Timeout;
use shared::{execute, is_image_media_type, Command, SelectedFile};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn handle_workflow(model: &mut Model, ctx: &Context<Model>, msg: shared::Msg) -> bool {
    let commands = model.workflow.update(msg);
    run_commands(model, ctx, commands);

    if model.workflow.session.take_input_reset() {
        clear_file_input();
    }
    if let Some(alert) = model.workflow.history.take_alert() {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(&alert);
        }
    }

    true
}

fn run_commands(model: &Model, ctx: &Context<Model>, commands: Vec<Command>) {
    for command in commands {
        match command {
            Command::Request(request) => {
                let api = model.api.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let reply = execute(&api, request).await;
                    link.send_message(Msg::Workflow(reply));
                });
            }
            Command::Schedule { after_ms, msg } => {
                let link = ctx.link().clone();
                Timeout::new(after_ms, move || link.send_message(Msg::Workflow(msg))).forget();
            }
        }
    }
}

fn clear_file_input() {
    let input = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("file-input"))
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok());
    if let Some(input) = input {
        input.set_value("");
    }
}

pub fn handle_show_page(model: &mut Model, ctx: &Context<Model>, page: Page) -> bool {
    model.page = page;
    if page == Page::History {
        ctx.link()
            .send_message(Msg::Workflow(shared::Msg::HistoryRequested));
    }
    true
}

/// Non-images are rejected from their MIME type alone; images are read off
/// the UI thread and tagged so a slower, older read cannot replace a newer pick.
pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    let seq = model.file_reads.begin();
    let media_type = file.raw_mime_type();

    if !is_image_media_type(&media_type) {
        let selected = SelectedFile {
            name: file.name(),
            media_type,
            bytes: Vec::new(),
        };
        return handle_workflow(model, ctx, shared::Msg::FileSelected(selected));
    }

    let link = ctx.link().clone();
    spawn_local(async move {
        match read_as_bytes(&file).await {
            Ok(bytes) => {
                let selected = SelectedFile {
                    name: file.name(),
                    media_type,
                    bytes,
                };
                link.send_message(Msg::FileRead(seq, selected));
            }
            Err(e) => log::error!("Failed to read {}: {}", file.name(), e),
        }
    });
    false
}

pub fn handle_file_read(model: &mut Model, ctx: &Context<Model>, seq: u64, file: SelectedFile) -> bool {
    if !model.file_reads.is_current(seq) {
        log::debug!("Dropping superseded read of {}", file.name);
        return false;
    }
    handle_workflow(model, ctx, shared::Msg::FileSelected(file))
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    let file = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| files.item(0));
    if let Some(file) = file {
        ctx.link().send_message(Msg::FileChosen(GlooFile::from(file)));
    }

    true
}
