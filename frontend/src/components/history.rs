use super::results::render_sections;
use super::utils::{debounce, render_notice, tier_class};
use crate::{Model, Msg};
use shared::{HistoryControl, HistoryEntry, HistoryLabelState};
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_history_page(model: &Model, ctx: &Context<Model>) -> Html {
    let history = &model.workflow.history;

    let body = if history.is_loading() && !history.is_loaded() {
        html! { <p class="loading"><i class="fa-solid fa-spinner fa-spin"></i></p> }
    } else if history.is_loaded() && history.entries().next().is_none() {
        html! { <p class="no-results-message">{ &model.workflow.messages.history_empty }</p> }
    } else {
        history
            .entries()
            .map(|entry| render_entry(model, ctx, entry))
            .collect::<Html>()
    };

    html! {
        <div class="history-page">
            { render_notice(history.notice()) }
            { body }
        </div>
    }
}

fn render_entry(model: &Model, ctx: &Context<Model>, entry: &HistoryEntry) -> Html {
    let messages = &model.workflow.messages;
    let link = ctx.link().clone();
    let image_id = entry.image_id.clone();

    let caption = match (entry.is_saving(), entry.control()) {
        (true, _) => &messages.save_busy,
        (false, HistoryControl::Saved) => &messages.saved_button,
        (false, HistoryControl::Save) => &messages.save_button,
    };

    html! {
        <div class="history-entry" key={entry.image_id.to_string()}>
            <div class="history-meta">
                {
                    match &entry.preview {
                        Some(src) => html! { <img class="history-image" src={src.clone()} alt={entry.filename.clone()} /> },
                        None => html! {},
                    }
                }
                <h3>{ &entry.filename }</h3>
                <p class="history-date">{ &entry.created_at }</p>
                {
                    match &entry.patient_name {
                        Some(name) => html! { <p class="history-patient">{ name }</p> },
                        None => html! {},
                    }
                }
            </div>
            <div class="prediction-list">
                { for entry.labels().iter().map(|label| render_label(ctx, entry, label)) }
            </div>
            <button
                class={classes!("analyze-btn", (entry.control() == HistoryControl::Saved).then_some("saved"))}
                disabled={entry.is_saving()}
                onclick={debounce(300, move || {
                    link.send_message(Msg::Workflow(shared::Msg::HistorySaveClicked(image_id.clone())))
                })}
            >
                { caption }
            </button>
            { render_notice(entry.notice()) }
            <div class="report-container">{ render_sections(&entry.sections) }</div>
            <ul class="comments">
                { for entry.comments.iter().map(|c| html! { <li>{ format!("{}: {}", c.created_at, c.comment) }</li> }) }
            </ul>
        </div>
    }
}

fn render_label(ctx: &Context<Model>, entry: &HistoryEntry, label: &HistoryLabelState) -> Html {
    let image_id = entry.image_id.clone();
    let key = label.key.clone();
    let onchange = ctx.link().callback(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::Workflow(shared::Msg::HistoryToggled {
            image_id: image_id.clone(),
            key: key.clone(),
            checked: input.checked(),
        })
    });

    html! {
        <label class={tier_class(label.tier)} key={label.key.clone()}>
            <input type="checkbox" checked={label.checked} {onchange} />
            <span class="result-label">{ &label.label }</span>
            <span class="result-value">{ format!("{}%", label.percentage()) }</span>
        </label>
    }
}
