use super::utils::debounce;
use crate::{Model, Msg};
use shared::SaveState;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

/// Patient details and the confirmation button; hidden until a review
/// is on screen.
pub fn render_save_panel(model: &Model, ctx: &Context<Model>) -> Html {
    let session = &model.workflow.session;
    if !session.save_area_visible() {
        return html! {};
    }
    let messages = &model.workflow.messages;
    let link = ctx.link();

    let on_name = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::Workflow(shared::Msg::PatientNameChanged(input.value()))
    });
    let on_comment = link.callback(|e: InputEvent| {
        let input: HtmlTextAreaElement = e.target_unchecked_into();
        Msg::Workflow(shared::Msg::DoctorCommentChanged(input.value()))
    });
    let on_save = {
        let link = link.clone();
        debounce(300, move || link.send_message(Msg::Workflow(shared::Msg::SaveClicked)))
    };

    html! {
        <div class="save-panel">
            <label for="patient-name">{ &messages.patient_name_label }</label>
            <input
                id="patient-name"
                type="text"
                value={session.patient_name().to_string()}
                oninput={on_name}
            />
            <label for="doctor-comment">{ &messages.doctor_comment_label }</label>
            <textarea
                id="doctor-comment"
                value={session.doctor_comment().to_string()}
                oninput={on_comment}
            />
            <button
                class={classes!("analyze-btn", (session.save_state() == SaveState::Saved).then_some("saved"))}
                disabled={!session.is_save_enabled()}
                onclick={on_save}
            >
                { session.save_caption(messages) }
            </button>
        </div>
    }
}
