use super::utils::tier_class;
use crate::{Model, Msg};
use shared::{ReportSection, TriageItem};
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_predictions(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(review) = model.workflow.session.review() else {
        return html! {};
    };

    html! {
        <div class="results-container">
            <h2>{ &model.workflow.messages.predictions_title }</h2>
            <div class="prediction-list">
                { for review.triage.items().iter().map(|item| render_prediction_item(ctx, item)) }
            </div>
        </div>
    }
}

fn render_prediction_item(ctx: &Context<Model>, item: &TriageItem) -> Html {
    let key = item.key.clone();
    let onchange = ctx.link().callback(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::Workflow(shared::Msg::PredictionToggled {
            key: key.clone(),
            checked: input.checked(),
        })
    });

    html! {
        <label class={tier_class(item.tier)} key={item.key.clone()}>
            <input
                type="checkbox"
                id={format!("pred_{}", item.key)}
                checked={item.selected}
                {onchange}
            />
            <span class="result-label">{ &item.label }</span>
            <div class="result-bar-container">
                <div class="result-bar" style={format!("width: {}%", item.percentage())}></div>
            </div>
            <span class="result-value">{ format!("{}%", item.percentage()) }</span>
        </label>
    }
}

pub fn render_report(model: &Model) -> Html {
    match model.workflow.session.review() {
        Some(review) if !review.sections.is_empty() => html! {
            <div class="report-container">
                <h2>{ &model.workflow.messages.report_title }</h2>
                { render_sections(&review.sections) }
            </div>
        },
        _ => html! {},
    }
}

pub fn render_sections(sections: &[ReportSection]) -> Html {
    sections
        .iter()
        .map(|section| {
            html! {
                <div class="report-section">
                    <h3>{ &section.title }</h3>
                    { for section.body.lines().map(|line| html! { <p>{ line }</p> }) }
                </div>
            }
        })
        .collect::<Html>()
}
