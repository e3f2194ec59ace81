use super::utils::debounce;
use crate::{Model, Msg};
use gloo_file::File as GlooFile;
use shared::UploadDisplay;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="upload-section">
            { render_file_input_area(model, ctx) }
            { render_predict_button(model, ctx) }
        </div>
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        input
            .files()
            .and_then(|files| files.item(0))
            .map(|file| Msg::FileChosen(GlooFile::from(file)))
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"))
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                { render_display(model) }
            </div>
        </>
    }
}

fn render_display(model: &Model) -> Html {
    match model.workflow.session.display() {
        UploadDisplay::Preview(url) => html! {
            <img id="image-preview" src={url.clone()} alt="Preview" />
        },
        UploadDisplay::Placeholder => html! {
            <div class="upload-placeholder">
                <i class="fa-solid fa-cloud-arrow-up"></i>
                <p>{ &model.workflow.messages.upload_placeholder }</p>
            </div>
        },
    }
}

fn render_predict_button(model: &Model, ctx: &Context<Model>) -> Html {
    let session = &model.workflow.session;
    let link = ctx.link().clone();

    html! {
        <div class="button-container">
            <button
                class="analyze-btn"
                disabled={!session.is_submit_enabled()}
                onclick={debounce(300, move || link.send_message(Msg::Workflow(shared::Msg::SubmitUpload)))}
            >
                {
                    if session.is_submitting() {
                        html! { <i class="fa-solid fa-spinner fa-spin"></i> }
                    } else {
                        html! { <i class="fa-solid fa-magnifying-glass"></i> }
                    }
                }
                { format!(" {}", session.predict_caption(&model.workflow.messages)) }
            </button>
        </div>
    }
}
