// Copyright 2026 the AR Cubes Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-level UI.
//!
//! [`DomShell`] owns the two pieces of UI the demo has: the body class used
//! as a state flag and the click handler on the "enter AR" element.

use alloc::boxed::Box;
use alloc::string::String;

use arcubes_core::error::{Step, XrError};
use arcubes_core::platform::{UiShell, UiState};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Event};

/// Default selector of the "enter AR" element.
pub const DEFAULT_ENTRY_SELECTOR: &str = "#enter-ar";

/// [`UiShell`] backed by the page's DOM.
pub struct DomShell {
    document: Document,
    entry_selector: String,
    on_enter: Option<Box<dyn FnMut()>>,
    /// Kept alive for as long as the shell.
    listener: Option<Closure<dyn FnMut(Event)>>,
}

impl core::fmt::Debug for DomShell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomShell")
            .field("entry_selector", &self.entry_selector)
            .field("entry_enabled", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl DomShell {
    /// Creates a shell. `on_enter` runs on every click of the element
    /// matching `entry_selector`, once [`enable_entry`](UiShell::enable_entry)
    /// was called.
    pub fn new(
        document: Document,
        entry_selector: impl Into<String>,
        on_enter: impl FnMut() + 'static,
    ) -> Self {
        Self {
            document,
            entry_selector: entry_selector.into(),
            on_enter: Some(Box::new(on_enter)),
            listener: None,
        }
    }
}

impl UiShell for DomShell {
    fn enable_entry(&mut self) -> Result<(), XrError> {
        if self.listener.is_some() {
            return Ok(());
        }
        let element = self
            .document
            .query_selector(&self.entry_selector)
            .map_err(|_| XrError::Exception(Step::EnableEntry))?
            .ok_or(XrError::Exception(Step::EnableEntry))?;
        let Some(mut on_enter) = self.on_enter.take() else {
            return Ok(());
        };

        let listener = Closure::wrap(Box::new(move |_event: Event| {
            on_enter();
        }) as Box<dyn FnMut(Event)>);
        element
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(|_| XrError::Exception(Step::EnableEntry))?;
        self.listener = Some(listener);
        Ok(())
    }

    fn set_state(&mut self, state: UiState) {
        if let Some(body) = self.document.body() {
            // DOMTokenList.add ignores classes already present.
            let _ = body.class_list().add_1(state.class_name());
        }
    }
}
