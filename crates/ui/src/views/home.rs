use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let target = Route::for_topic(ctx.topic_id(), ctx.course_id());
    let topic_id = ctx.topic_id();

    rsx! {
        div { class: "page",
            h2 { "Home" }
            p { "Topic #{topic_id}" }
            Link { class: "btn btn-primary", to: target, "Start practice" }
        }
    }
}
