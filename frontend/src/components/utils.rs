use gloo_timers::callback::Timeout;
use shared::{Notice, NoticeLevel};
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || inner_callback()));
    })
}

pub fn render_notice(notice: Option<&Notice>) -> Html {
    let Some(notice) = notice else {
        return html! {};
    };
    let (class, icon) = match notice.level {
        NoticeLevel::Success => ("alert alert-success", "fa-solid fa-circle-check"),
        NoticeLevel::Warning => ("alert alert-warning", "fa-solid fa-triangle-exclamation"),
        NoticeLevel::Danger => ("alert alert-danger", "fa-solid fa-circle-exclamation"),
    };
    html! {
        <div class={class} role="alert">
            <i class={icon}></i>
            <p>{ &notice.text }</p>
        </div>
    }
}

pub fn tier_class(tier: shared::ConfidenceTier) -> String {
    format!("prediction-item tier-{}", tier)
}
