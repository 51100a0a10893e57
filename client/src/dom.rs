use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlInputElement};

use guessboard_shared::{HistoryTimeline, Rgba, ToolMode};

use crate::util::clock_label;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

/// Rebuilds the history panel, one box per timeline entry.
pub fn render_history(
    document: &Document,
    list: &Element,
    timeline: &HistoryTimeline,
) -> Result<(), JsValue> {
    list.set_inner_html("");
    for item in timeline.items() {
        let entry = document.create_element("div")?;
        entry.set_class_name(&format!("history-item-box {}", item.position.css_class()));
        entry.set_attribute("data-index", &item.index.to_string())?;
        entry.set_attribute(
            "title",
            &format!("{} ({})", item.label, clock_label(item.timestamp)),
        )?;
        let text = document.create_element("span")?;
        text.set_class_name("history-item-text");
        text.set_text_content(Some(&(item.index + 1).to_string()));
        entry.append_child(&text)?;
        list.append_child(&entry)?;
    }
    if let Some(current) = list.query_selector(".history-item-current")? {
        current.scroll_into_view_with_bool(false);
    }
    Ok(())
}

/// Timeline index of the clicked history box, if the click landed on one.
pub fn history_index_from_event(event: &Event) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let entry = target.closest(".history-item-box").ok()??;
    entry.get_attribute("data-index")?.parse().ok()
}

pub fn set_undo_redo_state(
    undo: &HtmlButtonElement,
    redo: &HtmlButtonElement,
    timeline: &HistoryTimeline,
) {
    undo.set_disabled(!timeline.can_undo());
    redo.set_disabled(!timeline.can_redo());
}

pub fn set_tool_buttons(eraser: &HtmlButtonElement, fill: &HtmlButtonElement, mode: ToolMode) {
    set_active(eraser, mode == ToolMode::Eraser);
    set_active(fill, mode == ToolMode::Fill);
}

fn set_active(button: &HtmlButtonElement, active: bool) {
    let classes = button.class_list();
    let _ = if active {
        classes.add_1("active")
    } else {
        classes.remove_1("active")
    };
    let _ = button.set_attribute("aria-pressed", if active { "true" } else { "false" });
}

/// Marks the swatch matching `color` as selected.
pub fn select_swatch(document: &Document, color: Rgba) -> Result<(), JsValue> {
    let swatches = document.query_selector_all(".color-swatch[data-color]")?;
    for index in 0..swatches.length() {
        let Some(swatch) = swatches
            .item(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let matches = swatch
            .get_attribute("data-color")
            .and_then(|value| Rgba::from_hex(&value).ok())
            == Some(color);
        let classes = swatch.class_list();
        let _ = if matches {
            classes.add_1("selected")
        } else {
            classes.remove_1("selected")
        };
    }
    Ok(())
}

pub fn set_color_input(input: &HtmlInputElement, color: Rgba) {
    input.set_value(&color.to_hex());
}

pub fn update_size_preview(input: &HtmlInputElement, dot: &HtmlElement, width: f32) {
    input.set_value(&format!("{width}"));
    let size = format!("{width}px");
    let style = dot.style();
    let _ = style.set_property("width", &size);
    let _ = style.set_property("height", &size);
}

pub fn set_status(status: Option<&Element>, state: &str, text: &str) {
    if let Some(status) = status {
        let _ = status.set_attribute("data-state", state);
        status.set_text_content(Some(text));
    }
}
