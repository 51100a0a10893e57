use js_sys::Function;
use web_sys::{Document, Element, HtmlButtonElement, Window};

use guessboard_shared::{HistoryTimeline, MutationSink, UploadDebounce};

use crate::dom::{render_history, set_undo_redo_state};
use crate::util::now_ms;

pub struct HistoryPanel {
    pub document: Document,
    pub list: Element,
    pub undo: HtmlButtonElement,
    pub redo: HtmlButtonElement,
}

/// Browser side of [`MutationSink`]: debounced upload timers and the history panel.
pub struct BrowserSink {
    window: Window,
    debounce: UploadDebounce,
    on_due: Option<Function>,
    panel: HistoryPanel,
}

impl BrowserSink {
    pub fn new(window: Window, quiet_ms: u64, panel: HistoryPanel) -> Self {
        Self {
            window,
            debounce: UploadDebounce::new(quiet_ms),
            on_due: None,
            panel,
        }
    }

    /// Callback armed after every notification; it is expected to call
    /// [`Self::take_due`].
    pub fn set_upload_callback(&mut self, callback: Function) {
        self.on_due = Some(callback);
    }

    pub fn take_due(&mut self) -> Option<String> {
        self.debounce.poll(now_ms())
    }
}

impl MutationSink for BrowserSink {
    fn notify_mutated(&mut self, action: &str) {
        self.debounce.trigger(action, now_ms());
        let Some(callback) = self.on_due.as_ref() else {
            log::debug!("upload for {action} queued before the uploader was attached");
            return;
        };
        let quiet_ms = i32::try_from(self.debounce.quiet_ms()).unwrap_or(i32::MAX);
        if let Err(error) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, quiet_ms)
        {
            log::error!("upload timer not armed: {error:?}");
        }
    }

    fn history_changed(&mut self, timeline: &HistoryTimeline) {
        if let Err(error) = render_history(&self.panel.document, &self.panel.list, timeline) {
            log::warn!("history panel not rendered: {error:?}");
        }
        set_undo_redo_state(&self.panel.undo, &self.panel.redo, timeline);
    }
}
