use crate::{Model, Msg, Page};
use yew::prelude::*;

/// Title bar with the analysis/history tabs.
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let messages = &model.workflow.messages;
    let tab = |page: Page, label: &str, icon: &'static str| {
        html! {
            <button
                class={classes!("nav-tab", (model.page == page).then_some("active"))}
                onclick={ctx.link().callback(move |_| Msg::ShowPage(page))}
            >
                <i class={icon}></i>{ format!(" {}", label) }
            </button>
        }
    };

    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-lungs"></i>{" X-Ray Review"}</h1>
            <nav class="nav-tabs">
                { tab(Page::Analysis, &messages.analysis_tab, "fa-solid fa-magnifying-glass") }
                { tab(Page::History, &messages.history_tab, "fa-solid fa-clock-rotate-left") }
            </nav>
        </header>
    }
}
