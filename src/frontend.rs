use crate::gallery::{
    Catalog, ClickTarget, CloseTrigger, Gallery, GalleryAction, InlineFrame, InlineRegistry,
    InlineSlot, ModalFrame, NavCommand,
};
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Element, HtmlElement, KeyboardEvent, MouseEvent};
use yew::prelude::*;

const MOUNT_POINT_ID: &str = "app";

fn project_slots() -> Vec<InlineSlot> {
    vec![
        InlineSlot::new(
            "fumart",
            "FumArt",
            "Storefront and brand kit for an independent art studio.",
        ),
        InlineSlot::new(
            "inget",
            "Inget",
            "Inventory tracker for a small community pantry.",
        ),
        InlineSlot::new(
            "poster",
            "Poster Series",
            "Event poster designed for a campus hackathon.",
        ),
    ]
}

#[derive(Clone, PartialEq)]
struct GalleryModel {
    gallery: Gallery,
}

impl Reducible for GalleryModel {
    type Action = GalleryAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.gallery.dispatch(action);
        Rc::new(next)
    }
}

/// Holds `overflow: hidden` on `<body>` until dropped.
struct ScrollLock {
    body: HtmlElement,
}

impl ScrollLock {
    fn acquire() -> Option<Self> {
        let body = window()?.document()?.body()?;
        let _ = body.style().set_property("overflow", "hidden");
        Some(Self { body })
    }
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        let _ = self.body.style().set_property("overflow", "auto");
    }
}

#[hook]
fn use_scroll_lock(locked: bool) {
    use_effect_with(locked, |locked| {
        let guard = if *locked { ScrollLock::acquire() } else { None };
        move || drop(guard)
    });
}

#[hook]
fn use_escape_to_close(dispatcher: UseReducerDispatcher<GalleryModel>) {
    use_effect_with((), move |_| {
        let listener = window().and_then(|w| w.document()).and_then(|document| {
            let callback = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                if let Some(trigger) = CloseTrigger::from_key(&event.key()) {
                    dispatcher.dispatch(GalleryAction::CloseModal(trigger));
                }
            });

            document
                .add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())
                .ok()?;
            Some((document, callback))
        });

        move || {
            if let Some((document, callback)) = listener {
                let _ = document.remove_event_listener_with_callback(
                    "keydown",
                    callback.as_ref().unchecked_ref(),
                );
            }
        }
    });
}

#[derive(Properties, PartialEq)]
struct InlineGalleryProps {
    slot: InlineSlot,
    frame: InlineFrame,
    on_action: Callback<GalleryAction>,
}

#[function_component(InlineGallery)]
fn inline_gallery(props: &InlineGalleryProps) -> Html {
    let project = props.frame.project.clone();

    let on_open = {
        let on_action = props.on_action.clone();
        let project = project.clone();
        Callback::from(move |_: MouseEvent| on_action.emit(GalleryAction::OpenModal(project.clone())))
    };

    let on_previous = {
        let on_action = props.on_action.clone();
        let project = project.clone();
        Callback::from(move |_: MouseEvent| {
            on_action.emit(GalleryAction::Navigate(NavCommand::previous(project.clone())))
        })
    };

    let on_next = {
        let on_action = props.on_action.clone();
        let project = project.clone();
        Callback::from(move |_: MouseEvent| {
            on_action.emit(GalleryAction::Navigate(NavCommand::next(project.clone())))
        })
    };

    html! {
        <article class="project-card" data-project={project.to_string()}>
            <div class="project-gallery">
                <button
                    class="gallery-open"
                    type="button"
                    aria-label={format!("Open {} gallery", props.slot.title)}
                    onclick={on_open}
                >
                    <img class="gallery-image" src={props.frame.src.clone()} alt={props.frame.alt.clone()} loading="lazy" />
                </button>
                if props.frame.total > 1 {
                    <button class="gallery-nav gallery-prev" type="button" aria-label="Previous image" onclick={on_previous}>{"❮"}</button>
                    <button class="gallery-nav gallery-next" type="button" aria-label="Next image" onclick={on_next}>{"❯"}</button>
                }
                <p class="gallery-counter">
                    <span class="current">{props.frame.counter_text()}</span>
                    {" / "}
                    <span class="total">{props.frame.total.to_string()}</span>
                </p>
            </div>
            <h3>{props.slot.title.clone()}</h3>
            <p class="muted">{props.slot.summary.clone()}</p>
        </article>
    }
}

#[derive(Properties, PartialEq)]
struct ImageModalProps {
    frame: Option<ModalFrame>,
    on_action: Callback<GalleryAction>,
}

#[function_component(ImageModal)]
fn image_modal(props: &ImageModalProps) -> Html {
    let overlay = use_node_ref();

    let on_click = {
        let on_action = props.on_action.clone();
        let overlay = overlay.clone();
        Callback::from(move |event: MouseEvent| {
            let target = ClickTarget::classify(
                event.target_dyn_into::<Element>().as_ref(),
                overlay.cast::<Element>().as_ref(),
            );
            on_action.emit(GalleryAction::CloseModal(CloseTrigger::Click(target)));
        })
    };

    let Some(frame) = props.frame.as_ref() else {
        return html! { <div id="imageModal" class="modal" aria-hidden="true" ref={overlay}></div> };
    };

    let on_close = {
        let on_action = props.on_action.clone();
        Callback::from(move |_: MouseEvent| {
            on_action.emit(GalleryAction::CloseModal(CloseTrigger::Programmatic))
        })
    };

    let controls = frame
        .controls
        .iter()
        .map(|control| {
            let on_action = props.on_action.clone();
            let command = control.command.clone();
            let onclick = Callback::from(move |_: MouseEvent| {
                on_action.emit(GalleryAction::Navigate(command.clone()))
            });

            html! {
                <button class="modal-nav-btn" type="button" aria-label={control.aria_label()} onclick={onclick}>
                    {control.label}
                </button>
            }
        })
        .collect::<Html>();

    html! {
        <div
            id="imageModal"
            ref={overlay}
            class={classes!("modal", "show")}
            role="dialog"
            aria-modal="true"
            aria-label={format!("{} gallery", frame.project)}
            onclick={on_click}
        >
            <div class="modal-content">
                <button class="modal-close" type="button" aria-label="Close gallery" onclick={on_close}>{"×"}</button>
                <img id="modalImage" src={frame.src.clone()} alt={frame.alt.clone()} />
                <p class="modal-counter">
                    <span class="current">{frame.current.to_string()}</span>
                    {"/"}
                    <span class="total">{frame.total.to_string()}</span>
                </p>
                <div id="navContainer" class="modal-nav">{controls}</div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct AppProps {
    catalog: Catalog,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let catalog = props.catalog.clone();
    let model = use_reducer(move || GalleryModel {
        gallery: Gallery::new(catalog, InlineRegistry::new(project_slots())),
    });

    use_escape_to_close(model.dispatcher());
    use_scroll_lock(model.gallery.scroll_locked());

    let on_action = {
        let dispatcher = model.dispatcher();
        Callback::from(move |action: GalleryAction| dispatcher.dispatch(action))
    };

    let gallery = &model.gallery;
    let cards = gallery
        .inline_registry()
        .slots()
        .filter_map(|slot| {
            let frame = gallery.inline_frame(&slot.project)?;
            Some(html! {
                <InlineGallery
                    key={slot.project.to_string()}
                    slot={slot.clone()}
                    frame={frame}
                    on_action={on_action.clone()}
                />
            })
        })
        .collect::<Html>();

    html! {
        <>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <div class="page-shell">
                <main id="content">
                    <section aria-labelledby="projects-heading" class="section-block">
                        <h2 id="projects-heading">{"Projects"}</h2>
                        <div class="projects-grid">{cards}</div>
                    </section>
                </main>
            </div>
            <ImageModal frame={gallery.modal_frame()} on_action={on_action} />
        </>
    }
}

pub fn run() {
    let catalog = Catalog::bundled().expect("bundled gallery catalog is valid");

    yew::Renderer::<App>::with_root_and_props(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(MOUNT_POINT_ID))
            .expect("missing #app mount point"),
        AppProps { catalog },
    )
    .render();
}
