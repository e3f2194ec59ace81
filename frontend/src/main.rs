mod api;
mod components;

use api::ApiClient;
use components::handlers::{
    handle_drop, handle_file_chosen, handle_file_read, handle_show_page, handle_workflow,
};
use components::header::render_header;
use components::history::render_history_page;
use components::results::{render_predictions, render_report};
use components::save_panel::render_save_panel;
use components::upload_section::render_upload_section;
use components::utils::render_notice;
use gloo_file::File as GlooFile;
use shared::{FileReads, SelectedFile, Workflow};
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Analysis,
    History,
}

pub enum Msg {
    Workflow(shared::Msg),
    ShowPage(Page),
    FileChosen(GlooFile),
    FileRead(u64, SelectedFile),
    SetDragging(bool),
    HandleDrop(DragEvent),
}

pub struct Model {
    pub workflow: Workflow,
    pub api: ApiClient,
    pub page: Page,
    pub is_dragging: bool,
    pub file_reads: FileReads,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let api = ApiClient;

        let link = ctx.link().clone();
        let loader = api.clone();
        spawn_local(async move {
            match loader.fetch_messages().await {
                Ok(messages) => link.send_message(Msg::Workflow(shared::Msg::MessagesLoaded(messages))),
                Err(e) => log::warn!("Using built-in messages: {}", e),
            }
        });

        Self {
            workflow: Workflow::default(),
            api,
            page: Page::Analysis,
            is_dragging: false,
            file_reads: FileReads::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Workflow(msg) => handle_workflow(self, ctx, msg),
            Msg::ShowPage(page) => handle_show_page(self, ctx, page),
            Msg::FileChosen(file) => handle_file_chosen(self, ctx, file),
            Msg::FileRead(seq, file) => handle_file_read(self, ctx, seq, file),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header(self, ctx) }

                <main class="main-content">
                {
                    match self.page {
                        Page::Analysis => html! {
                            <>
                                { render_upload_section(self, ctx) }
                                { render_notice(self.workflow.session.notice()) }
                                { render_predictions(self, ctx) }
                                { render_report(self) }
                                { render_save_panel(self, ctx) }
                            </>
                        },
                        Page::History => render_history_page(self, ctx),
                    }
                }
                </main>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Model>::new().render();
}
