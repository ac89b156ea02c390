//! Overlay lifecycle and result resolution.
//!
//! An [`Overlay`] is a cheap, cloneable handle. Showing it attaches it to its
//! [`Document`]; waiting on it subscribes a single one-shot listener for the
//! next button activation. When the pressed button requires validation and the
//! inputs are invalid, the overlay re-subscribes and the original promise is
//! chained onto the new wait, so the caller still observes one result.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::overlay::button::{Button, ButtonLayout, ButtonRegistry, ValidationRule};
use crate::overlay::document::{Document, NodeId};
use crate::overlay::error::{OverlayError, Result};
use crate::overlay::form::Form;
use crate::overlay::input::{Input, InputCollector, InputKind, InputValue, ValidateValue, Value};
use crate::overlay::promise::{self, Deferred, ResultPromise};

const EVENT_CAPACITY: usize = 64;

/// What a resolved wait reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayResult {
    pub button: String,
    pub inputs: Vec<InputValue>,
}

impl OverlayResult {
    pub fn try_input(&self, name: &str) -> Option<&Value> {
        self.inputs
            .iter()
            .find(|input| input.name == name)
            .map(|input| &input.value)
    }

    /// Value of the named input.
    ///
    /// # Panics
    ///
    /// Panics when the overlay had no input with that name.
    pub fn input(&self, name: &str) -> &Value {
        self.try_input(name)
            .unwrap_or_else(|| panic!("overlay result has no input named `{name}`"))
    }
}

/// Notifications observable through [`Overlay::subscribe`].
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    ButtonActivated(OverlayResult),
    /// An input's value was committed.
    InputChanged(InputValue),
    /// An input's value changed while being edited.
    InputEdited(InputValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Idle,
    Attached,
    WaitingForButton,
    Resolved,
}

#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub auto_show: bool,
    pub validate: ValidationRule,
    pub auto_remove: bool,
}

impl WaitOptions {
    #[must_use]
    pub const fn auto_show(mut self, auto_show: bool) -> Self {
        self.auto_show = auto_show;
        self
    }

    #[must_use]
    pub fn validate(mut self, validate: impl Into<ValidationRule>) -> Self {
        self.validate = validate.into();
        self
    }

    #[must_use]
    pub const fn auto_remove(mut self, auto_remove: bool) -> Self {
        self.auto_remove = auto_remove;
        self
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            auto_show: true,
            validate: ValidationRule::Default,
            auto_remove: true,
        }
    }
}

enum Notification {
    Activated(OverlayResult),
    Removed,
    Superseded,
}

#[derive(Default)]
struct Fields {
    title: String,
    message: String,
    buttons: ButtonRegistry,
    form: Option<Arc<dyn InputCollector>>,
    loading: Option<bool>,
    transparent: bool,
    z_index: i32,
    listener: Option<oneshot::Sender<Notification>>,
    resolved: bool,
}

struct Inner {
    id: NodeId,
    document: Document,
    fields: Mutex<Fields>,
    events: broadcast::Sender<OverlayEvent>,
}

/// Handle to one modal overlay.
#[derive(Clone)]
pub struct Overlay {
    inner: Arc<Inner>,
}

impl Overlay {
    /// Build an overlay with inputs. Nothing is shown until [`Self::show`] or
    /// [`Self::wait`].
    pub async fn new(
        document: &Document,
        title: impl Into<String>,
        message: impl Into<String>,
        inputs: Vec<Input>,
        buttons: Vec<Button>,
    ) -> Result<Self> {
        let overlay = Self::create(document, title, message, buttons);
        overlay.set_inputs(inputs).await?;
        Ok(overlay)
    }

    /// Build an overlay without inputs.
    pub fn create(
        document: &Document,
        title: impl Into<String>,
        message: impl Into<String>,
        buttons: Vec<Button>,
    ) -> Self {
        let mut fields = Fields {
            title: title.into(),
            message: message.into(),
            ..Fields::default()
        };
        fields.buttons.set_buttons(buttons);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                id: NodeId::next(),
                document: document.clone(),
                fields: Mutex::new(fields),
                events,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Fields> {
        self.inner.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn form(&self) -> Option<Arc<dyn InputCollector>> {
        self.lock().form.clone()
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    // === Lifecycle ===

    /// Attach to the document. Does nothing when already attached.
    pub fn show(&self) {
        if self.is_attached() {
            return;
        }
        let z_index = self.lock().z_index;
        self.inner.document.attach(self.clone(), z_index);
        debug!(overlay = %self.id(), "Overlay shown");
    }

    /// Detach from the document. A pending wait fails with
    /// [`OverlayError::Removed`].
    pub fn remove(&self) {
        if self.inner.document.detach(self.id()).is_none() {
            return;
        }
        debug!(overlay = %self.id(), "Overlay removed");
        let listener = self.lock().listener.take();
        if let Some(listener) = listener {
            let _ = listener.send(Notification::Removed);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inner.document.contains(self.id())
    }

    /// Whether another overlay currently blocks this one.
    pub fn is_inert(&self) -> bool {
        self.inner.document.is_inert(self.id())
    }

    pub fn state(&self) -> OverlayState {
        let attached = self.is_attached();
        let fields = self.lock();
        if fields.listener.is_some() {
            OverlayState::WaitingForButton
        } else if fields.resolved {
            OverlayState::Resolved
        } else if attached {
            OverlayState::Attached
        } else {
            OverlayState::Idle
        }
    }

    /// Wait with default options: show, validate all but the first button,
    /// remove when resolved.
    pub fn wait(&self) -> ResultPromise<OverlayResult> {
        self.wait_with(WaitOptions::default())
    }

    /// Wait for the next button activation that passes validation.
    ///
    /// Must be called from within a tokio runtime. Calling it again before the
    /// previous wait resolved fails the previous one with
    /// [`OverlayError::Superseded`].
    pub fn wait_with(&self, options: WaitOptions) -> ResultPromise<OverlayResult> {
        if options.auto_show {
            self.show();
        }

        let (tx, mut rx) = oneshot::channel();
        let previous = {
            let mut fields = self.lock();
            fields.resolved = false;
            fields.listener.replace(tx)
        };
        if let Some(previous) = previous {
            warn!(overlay = %self.id(), "Overlay wait superseded");
            let _ = previous.send(Notification::Superseded);
        }

        let (mut deferred, promise) = promise::deferred();
        let overlay = self.clone();
        tokio::spawn(async move {
            let notification = tokio::select! {
                notification = &mut rx => Some(notification),
                () = deferred.abandoned() => None,
            };
            let Some(notification) = notification else {
                drop(rx);
                overlay.release_closed_listener();
                return;
            };
            match notification {
                Ok(Notification::Activated(result)) => {
                    overlay.settle(result, options, deferred).await;
                }
                Ok(Notification::Removed) => deferred.reject(OverlayError::Removed),
                Ok(Notification::Superseded) => deferred.reject(OverlayError::Superseded),
                Err(_) => deferred.reject(OverlayError::Abandoned),
            }
        });
        promise
    }

    async fn settle(
        &self,
        result: OverlayResult,
        options: WaitOptions,
        deferred: Deferred<OverlayResult>,
    ) {
        let requires_validation = self
            .lock()
            .buttons
            .requires_validation(&result.button, &options.validate);

        if requires_validation {
            let was_attached = self.is_attached();
            let valid = self.validate_inputs(true).await;
            // Removed while the collector was still validating.
            if was_attached && !self.is_attached() {
                deferred.reject(OverlayError::Removed);
                return;
            }
            if !valid {
                debug!(overlay = %self.id(), button = %result.button, "Validation failed, waiting again");
                let retry = self.wait_with(options);
                deferred.resolve_with(retry);
                return;
            }
        }

        if options.auto_remove {
            self.remove();
        }
        self.lock().resolved = true;
        info!(overlay = %self.id(), button = %result.button, "Overlay resolved");
        deferred.resolve(result);
    }

    /// Drop a listener whose waiting side went away.
    fn release_closed_listener(&self) {
        let mut fields = self.lock();
        if fields.listener.as_ref().is_some_and(oneshot::Sender::is_closed) {
            fields.listener = None;
            debug!(overlay = %self.id(), "Abandoned overlay wait released");
        }
    }

    /// Activate a button as if the user pressed it.
    ///
    /// Returns `false` without notifying anyone when the button is unknown or
    /// disabled, or when another overlay blocks this one.
    pub fn click(&self, value: &str) -> bool {
        if self.is_inert() {
            debug!(overlay = %self.id(), button = value, "Click on inert overlay ignored");
            return false;
        }
        let (listener, result) = {
            let mut fields = self.lock();
            match fields.buttons.get(value) {
                None => {
                    warn!(overlay = %self.id(), button = value, "Click on unknown button");
                    return false;
                }
                Some(button) if button.disabled => return false,
                Some(_) => {}
            }
            let inputs = fields
                .form
                .as_ref()
                .map(|form| form.values())
                .unwrap_or_default();
            let result = OverlayResult {
                button: value.to_string(),
                inputs,
            };
            (fields.listener.take(), result)
        };

        let _ = self
            .inner
            .events
            .send(OverlayEvent::ButtonActivated(result.clone()));
        if let Some(listener) = listener {
            let _ = listener.send(Notification::Activated(result));
        }
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.inner.events.subscribe()
    }

    // === Buttons ===

    pub fn buttons(&self) -> Vec<Button> {
        self.lock().buttons.buttons().to_vec()
    }

    /// Replace every button.
    ///
    /// # Panics
    ///
    /// Panics when two buttons share a value.
    pub fn set_buttons(&self, buttons: Vec<Button>) {
        self.lock().buttons.set_buttons(buttons);
    }

    pub fn set_buttons_enabled(&self, enabled: bool) {
        self.lock().buttons.set_enabled(enabled);
    }

    pub fn set_buttons_vertical(&self, vertical: bool) {
        self.lock().buttons.set_vertical(vertical);
    }

    pub fn button_layout(&self) -> ButtonLayout {
        self.lock().buttons.layout()
    }

    // === Inputs ===

    /// Replace the inputs. An empty list drops the collector entirely.
    pub async fn set_inputs(&self, inputs: Vec<Input>) -> Result<()> {
        if inputs.is_empty() {
            self.lock().form = None;
            return Ok(());
        }
        let form = self
            .lock()
            .form
            .get_or_insert_with(|| Arc::new(Form::new()) as Arc<dyn InputCollector>)
            .clone();
        form.set_inputs(inputs).await
    }

    pub async fn set_inputs_enabled(&self, enabled: bool) -> Result<()> {
        match self.form() {
            Some(form) => form.set_disabled(!enabled).await,
            None => Ok(()),
        }
    }

    /// Use a custom collector for this overlay's inputs.
    pub fn set_collector(&self, collector: Arc<dyn InputCollector>) {
        self.lock().form = Some(collector);
    }

    pub fn collector(&self) -> Option<Arc<dyn InputCollector>> {
        self.form()
    }

    pub fn inputs(&self) -> Vec<Input> {
        self.form().map(|form| form.inputs()).unwrap_or_default()
    }

    pub fn input_values(&self) -> Vec<InputValue> {
        self.form().map(|form| form.values()).unwrap_or_default()
    }

    pub fn input_errors(&self) -> Vec<(String, String)> {
        self.form().map(|form| form.errors()).unwrap_or_default()
    }

    /// Validate the inputs. Without inputs this is always valid.
    pub async fn validate_inputs(&self, report: bool) -> bool {
        match self.form() {
            Some(form) => form.validate(report).await,
            None => true,
        }
    }

    pub fn add_validation_type(&self, kind: InputKind, validate: ValidateValue) {
        if let Some(form) = self.form() {
            form.add_validation_type(kind, validate);
        }
    }

    /// Update an input while it is being edited.
    pub fn edit_input(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let form = self
            .form()
            .ok_or_else(|| OverlayError::UnknownInput(name.to_string()))?;
        form.set_value(name, value.into())?;
        self.emit_input(&*form, name, OverlayEvent::InputEdited)
    }

    /// Report the current value of an input as committed.
    pub fn commit_input(&self, name: &str) -> Result<()> {
        let form = self
            .form()
            .ok_or_else(|| OverlayError::UnknownInput(name.to_string()))?;
        self.emit_input(&*form, name, OverlayEvent::InputChanged)
    }

    fn emit_input(
        &self,
        form: &dyn InputCollector,
        name: &str,
        event: fn(InputValue) -> OverlayEvent,
    ) -> Result<()> {
        let value = form
            .values()
            .into_iter()
            .find(|value| value.name == name)
            .ok_or_else(|| OverlayError::UnknownInput(name.to_string()))?;
        let _ = self.inner.events.send(event(value));
        Ok(())
    }

    // === Presentation ===

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().title = title.into();
    }

    pub fn message(&self) -> String {
        self.lock().message.clone()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.lock().message = message.into();
    }

    /// Show or hide the loading spinner; `large` fills the container.
    pub fn show_loading(&self, loading: bool, large: bool) {
        self.lock().loading = loading.then_some(large);
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading.is_some()
    }

    pub fn is_loading_large(&self) -> bool {
        self.lock().loading.unwrap_or(false)
    }

    /// Drop the container background and border.
    pub fn set_transparent(&self, transparent: bool) {
        self.lock().transparent = transparent;
    }

    pub fn is_transparent(&self) -> bool {
        self.lock().transparent
    }

    pub fn z_index(&self) -> i32 {
        self.lock().z_index
    }

    pub fn set_z_index(&self, z_index: i32) {
        self.lock().z_index = z_index;
        self.inner.document.set_z_index(self.id(), z_index);
    }
}

impl PartialEq for Overlay {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Overlay {}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("id", &self.id())
            .field("title", &self.title())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::overlay::testing::eventually;

    fn cancel_ok() -> Vec<Button> {
        vec![Button::new("Cancel", "cancel"), Button::new("OK", "ok")]
    }

    async fn waiting(overlay: &Overlay) {
        eventually(|| overlay.state() == OverlayState::WaitingForButton).await;
    }

    #[tokio::test]
    async fn test_show_is_idempotent() {
        let document = Document::new();
        let overlay = Overlay::create(&document, "Title", "", cancel_ok());
        overlay.show();
        overlay.show();
        assert_eq!(document.len(), 1);
        assert_eq!(overlay.state(), OverlayState::Attached);
    }

    #[tokio::test]
    async fn test_wait_resolves_once_and_removes() {
        let document = Document::new();
        let overlay = Overlay::create(&document, "Title", "Message", cancel_ok());
        let promise = overlay.wait();
        waiting(&overlay).await;

        assert!(overlay.click("cancel"));
        let result = promise.await.unwrap();
        assert_eq!(result.button, "cancel");
        assert!(result.inputs.is_empty());
        assert!(!overlay.is_attached());
        assert_eq!(overlay.state(), OverlayState::Resolved);

        // Later clicks have no listener to reach.
        assert!(overlay.click("ok"));
        assert_eq!(overlay.state(), OverlayState::Resolved);
    }

    #[tokio::test]
    async fn test_cancel_skips_validation_ok_consults_it() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "",
            "",
            vec![Input::new("name").required()],
            cancel_ok(),
        )
        .await
        .unwrap();

        let promise = overlay.wait();
        waiting(&overlay).await;
        overlay.click("cancel");
        let result = promise.await.unwrap();
        assert_eq!(result.button, "cancel");
        // Cancel never reported errors, so validation did not run.
        assert!(overlay.input_errors().is_empty());

        let promise = overlay.wait();
        waiting(&overlay).await;
        overlay.click("ok");
        waiting(&overlay).await;
        assert_eq!(overlay.input_errors().len(), 1);
        overlay.remove();
        assert_eq!(promise.await, Err(OverlayError::Removed));
    }

    #[tokio::test]
    async fn test_validation_retry_resolves_with_valid_value() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "",
            "",
            vec![Input::new("name").required()],
            vec![Button::new("OK", "ok")],
        )
        .await
        .unwrap();

        let mut promise = overlay.wait();
        waiting(&overlay).await;
        assert!(overlay.click("ok"));
        waiting(&overlay).await;

        let pending = tokio::time::timeout(Duration::from_millis(20), &mut promise).await;
        assert!(pending.is_err(), "wait resolved despite invalid input");
        assert!(overlay.is_attached());

        overlay.edit_input("name", "Alice").unwrap();
        assert!(overlay.click("ok"));
        let result = promise.await.unwrap();
        assert_eq!(result.button, "ok");
        assert_eq!(result.input("name"), &Value::from("Alice"));
    }

    #[tokio::test]
    async fn test_explicit_validation_rules() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "",
            "",
            vec![Input::new("name").required()],
            cancel_ok(),
        )
        .await
        .unwrap();

        let promise = overlay.wait_with(WaitOptions::default().validate(false));
        waiting(&overlay).await;
        overlay.click("ok");
        assert_eq!(promise.await.unwrap().button, "ok");

        let promise = overlay.wait_with(WaitOptions::default().validate(ValidationRule::only(["cancel"])));
        waiting(&overlay).await;
        overlay.click("cancel");
        waiting(&overlay).await;
        overlay.click("ok");
        assert_eq!(promise.await.unwrap().button, "ok");
    }

    #[tokio::test]
    async fn test_no_auto_show_no_auto_remove() {
        let document = Document::new();
        let overlay = Overlay::create(&document, "", "", cancel_ok());

        let promise = overlay.wait_with(WaitOptions::default().auto_show(false).auto_remove(false));
        assert!(!overlay.is_attached());
        waiting(&overlay).await;
        overlay.click("ok");
        assert_eq!(promise.await.unwrap().button, "ok");

        overlay.show();
        let promise = overlay.wait_with(WaitOptions::default().auto_remove(false));
        waiting(&overlay).await;
        overlay.click("cancel");
        promise.await.unwrap();
        assert!(overlay.is_attached());
    }

    #[tokio::test]
    async fn test_second_wait_supersedes_first() {
        let document = Document::new();
        let overlay = Overlay::create(&document, "", "", cancel_ok());
        let first = overlay.wait();
        let second = overlay.wait();
        assert_eq!(first.await, Err(OverlayError::Superseded));

        waiting(&overlay).await;
        overlay.click("ok");
        assert_eq!(second.await.unwrap().button, "ok");
    }

    #[tokio::test]
    async fn test_dropped_promise_releases_listener() {
        let document = Document::new();
        let overlay = Overlay::create(&document, "", "", cancel_ok());
        drop(overlay.wait());
        eventually(|| overlay.state() == OverlayState::Attached).await;
    }

    #[tokio::test]
    async fn test_disabled_and_unknown_buttons_do_nothing() {
        let document = Document::new();
        let overlay = Overlay::create(
            &document,
            "",
            "",
            vec![Button::new("Cancel", "cancel"), Button::new("OK", "ok").disabled()],
        );
        let _promise = overlay.wait();
        waiting(&overlay).await;

        assert!(!overlay.click("ok"));
        assert!(!overlay.click("missing"));
        assert_eq!(overlay.state(), OverlayState::WaitingForButton);

        overlay.set_buttons_enabled(true);
        assert!(overlay.click("ok"));
    }

    #[tokio::test]
    async fn test_inert_overlay_ignores_clicks() {
        let document = Document::new();
        let below = Overlay::create(&document, "", "", cancel_ok());
        let above = Overlay::create(&document, "", "", cancel_ok());
        let promise = below.wait();
        above.show();
        waiting(&below).await;

        assert!(!below.click("ok"));
        above.remove();
        assert!(below.click("ok"));
        assert_eq!(promise.await.unwrap().button, "ok");
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "",
            "",
            vec![Input::new("name")],
            cancel_ok(),
        )
        .await
        .unwrap();
        let mut events = overlay.subscribe();

        overlay.edit_input("name", "Al").unwrap();
        overlay.commit_input("name").unwrap();
        overlay.show();
        overlay.click("ok");

        assert_eq!(
            events.recv().await.unwrap(),
            OverlayEvent::InputEdited(InputValue::new("name", "Al"))
        );
        assert_eq!(
            events.recv().await.unwrap(),
            OverlayEvent::InputChanged(InputValue::new("name", "Al"))
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            OverlayEvent::ButtonActivated(result) if result.button == "ok"
        ));
    }

    #[tokio::test]
    async fn test_clearing_inputs_drops_collector() {
        let document = Document::new();
        let overlay = Overlay::new(&document, "", "", vec![Input::new("a")], cancel_ok())
            .await
            .unwrap();
        assert!(overlay.collector().is_some());
        overlay.set_inputs(Vec::new()).await.unwrap();
        assert!(overlay.collector().is_none());
        assert!(overlay.validate_inputs(true).await);
        assert!(overlay.input_values().is_empty());
        assert_eq!(
            overlay.edit_input("a", "x"),
            Err(OverlayError::UnknownInput("a".to_string()))
        );
    }

    /// Collector whose validation takes a while and answers from a script.
    struct SlowCollector {
        delay: Duration,
        verdicts: Mutex<Vec<bool>>,
        value: Mutex<Value>,
    }

    impl SlowCollector {
        fn new(delay_ms: u64, verdicts: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                delay: Duration::from_millis(delay_ms),
                verdicts: Mutex::new(verdicts.iter().rev().copied().collect()),
                value: Mutex::new(Value::Null),
            })
        }
    }

    #[async_trait::async_trait]
    impl InputCollector for SlowCollector {
        fn values(&self) -> Vec<InputValue> {
            let value = self.value.lock().unwrap().clone();
            vec![InputValue::new("code", value)]
        }

        fn inputs(&self) -> Vec<Input> {
            vec![Input::new("code")]
        }

        async fn set_inputs(&self, _inputs: Vec<Input>) -> Result<()> {
            Err(OverlayError::Collector("inputs are fixed".to_string()))
        }

        async fn set_disabled(&self, _disabled: bool) -> Result<()> {
            Ok(())
        }

        fn set_value(&self, name: &str, value: Value) -> Result<()> {
            if name != "code" {
                return Err(OverlayError::UnknownInput(name.to_string()));
            }
            *self.value.lock().unwrap() = value;
            Ok(())
        }

        async fn validate(&self, _report: bool) -> bool {
            tokio::time::sleep(self.delay).await;
            self.verdicts.lock().unwrap().pop().unwrap_or(true)
        }
    }

    fn with_collector(document: &Document, collector: Arc<SlowCollector>) -> Overlay {
        let overlay = Overlay::create(document, "", "", cancel_ok());
        overlay.set_collector(collector);
        overlay
    }

    #[tokio::test]
    async fn test_async_validation_passes() {
        let document = Document::new();
        let overlay = with_collector(&document, SlowCollector::new(20, &[true]));
        overlay.edit_input("code", "1234").unwrap();

        let promise = overlay.wait();
        waiting(&overlay).await;
        assert!(overlay.click("ok"));
        let result = promise.await.unwrap();
        assert_eq!(result.button, "ok");
        assert_eq!(result.input("code"), &Value::from("1234"));
        assert!(!overlay.is_attached());
    }

    #[tokio::test]
    async fn test_async_validation_retries_until_valid() {
        let document = Document::new();
        let overlay = with_collector(&document, SlowCollector::new(20, &[false, true]));

        let mut promise = overlay.wait();
        waiting(&overlay).await;
        overlay.click("ok");
        // The rejected click re-arms the wait once validation finishes.
        waiting(&overlay).await;
        let pending = tokio::time::timeout(Duration::from_millis(10), &mut promise).await;
        assert!(pending.is_err(), "wait resolved despite failed validation");
        assert!(overlay.is_attached());

        overlay.click("ok");
        assert_eq!(promise.await.unwrap().button, "ok");
    }

    #[tokio::test]
    async fn test_removal_during_async_validation_fails_wait() {
        for verdict in [true, false] {
            let document = Document::new();
            let overlay = with_collector(&document, SlowCollector::new(50, &[verdict]));

            let promise = overlay.wait();
            waiting(&overlay).await;
            assert!(overlay.click("ok"));
            tokio::time::sleep(Duration::from_millis(10)).await;
            overlay.remove();

            assert_eq!(promise.await, Err(OverlayError::Removed), "verdict {verdict}");
            assert_eq!(overlay.state(), OverlayState::Idle);
        }
    }

    #[tokio::test]
    async fn test_collector_errors_are_forwarded() {
        let document = Document::new();
        let overlay = with_collector(&document, SlowCollector::new(0, &[]));
        assert_eq!(
            overlay.set_inputs(vec![Input::new("other")]).await,
            Err(OverlayError::Collector("inputs are fixed".to_string()))
        );
        assert_eq!(
            overlay.edit_input("other", "x"),
            Err(OverlayError::UnknownInput("other".to_string()))
        );
    }

    #[test]
    #[should_panic(expected = "no input named `missing`")]
    fn test_missing_result_input_panics() {
        let result = OverlayResult {
            button: "ok".to_string(),
            inputs: Vec::new(),
        };
        let _ = result.input("missing");
    }
}
