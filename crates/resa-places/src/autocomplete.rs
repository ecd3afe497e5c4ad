//! Address input with a debounced suggestion dropdown.
//!
//! Each mounted field runs as its own task and owns its state exclusively. The caller talks to
//! it through [`AddressAutocomplete`], which sends events in and observes state snapshots out.
//!
//! Lookups are tagged with the edit generation and value they were issued for. A completion
//! whose tag no longer matches the field is dropped, so a slow answer for an older value can
//! never overwrite the suggestions of a newer one.
use std::{future, sync::Arc, time::Duration};

use derive_builder::Builder;
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use serde::Serialize;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, warn};

use crate::{
    constants::{DEFAULT_DEBOUNCE, MIN_QUERY_CHARS},
    document::{Document, ElementId, PointerDown},
    error::SuggestError,
    GeocodingProvider, SuggestOptions, Suggestion,
};

#[derive(Builder, Clone, Debug)]
#[builder(setter(into))]
pub struct FieldProps {
    pub label: String,
    #[builder(default)]
    pub placeholder: String,
    /// Initial value of the field.
    #[builder(default)]
    pub value: String,
    #[builder(default = "DEFAULT_DEBOUNCE")]
    pub debounce: Duration,
    #[builder(default = "MIN_QUERY_CHARS")]
    pub min_query_chars: usize,
    #[builder(default)]
    pub options: SuggestOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AddressFieldState {
    pub value: String,
    pub suggestions: Vec<Suggestion>,
    pub is_open: bool,
    pub is_loading: bool,
}

/// What the dropdown currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Dropdown {
    Closed,
    /// Open while a lookup is in flight or when it found nothing.
    OpenEmpty,
    OpenWithResults,
}

impl AddressFieldState {
    pub fn dropdown(&self) -> Dropdown {
        match (self.is_open, self.suggestions.is_empty()) {
            (false, _) => Dropdown::Closed,
            (true, true) => Dropdown::OpenEmpty,
            (true, false) => Dropdown::OpenWithResults,
        }
    }

    /// Whether the clear control is shown.
    pub fn can_clear(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Everything a field reacts to, in the order it happened.
#[derive(Debug)]
pub(crate) enum FieldEvent {
    Input(String),
    Focus,
    Select(String),
    Pointer(PointerDown),
    Clear,
}

/// Handle to a mounted address field.
///
/// Dropping the handle unmounts the field; [`AddressAutocomplete::unmount`] additionally waits
/// for its task to finish.
pub struct AddressAutocomplete {
    label: String,
    placeholder: String,
    element: ElementId,
    events: mpsc::UnboundedSender<FieldEvent>,
    state: watch::Receiver<AddressFieldState>,
    task: JoinHandle<()>,
}

impl AddressAutocomplete {
    /// Mount a field on `document`. Must be called from within a tokio runtime.
    ///
    /// * `provider` - the geocoding capability, `None` if it is not loaded. Without one the
    ///   field never shows suggestions.
    pub fn mount<P>(props: FieldProps, provider: Option<Arc<P>>, document: &Document) -> Self
    where
        P: GeocodingProvider + 'static,
    {
        let element = document.allocate();
        let (events, events_rx) = mpsc::unbounded_channel();
        let initial = AddressFieldState {
            value: props.value.clone(),
            ..Default::default()
        };
        let (state_tx, state) = watch::channel(initial.clone());
        document.register(&events);

        let field = FieldTask {
            element,
            debounce: props.debounce,
            min_query_chars: props.min_query_chars,
            options: props.options,
            provider,
            state: initial,
            generation: 0,
            deadline: None,
        };
        let task = tokio::spawn(field.run(events_rx, state_tx));

        Self {
            label: props.label,
            placeholder: props.placeholder,
            element,
            events,
            state,
            task,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The element pointer presses must target to count as inside this field.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The user typed; `value` is the whole new content of the input.
    pub fn input(&self, value: impl Into<String>) {
        self.send(FieldEvent::Input(value.into()));
    }

    pub fn focus(&self) {
        self.send(FieldEvent::Focus);
    }

    /// Commit the suggestion with the given id. Unknown ids are ignored.
    pub fn select(&self, suggestion_id: impl Into<String>) {
        self.send(FieldEvent::Select(suggestion_id.into()));
    }

    /// Activate the clear control.
    pub fn clear(&self) {
        self.send(FieldEvent::Clear);
    }

    pub fn state(&self) -> AddressFieldState {
        self.state.borrow().clone()
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    /// Observe state changes, including every change of the committed value.
    pub fn subscribe(&self) -> watch::Receiver<AddressFieldState> {
        self.state.clone()
    }

    /// Unmount the field, releasing its timer and its pointer listener.
    pub async fn unmount(self) {
        let Self { events, task, .. } = self;
        drop(events);
        if let Err(e) = task.await {
            warn!("address field task failed: {e}");
        }
    }

    fn send(&self, event: FieldEvent) {
        if self.events.send(event).is_err() {
            debug!("event sent to an unmounted field");
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct QueryTag {
    generation: u64,
    value: String,
}

type Completion = (QueryTag, Result<Vec<Suggestion>, SuggestError>);

struct FieldTask<P> {
    element: ElementId,
    debounce: Duration,
    min_query_chars: usize,
    options: SuggestOptions,
    provider: Option<Arc<P>>,
    state: AddressFieldState,
    /// Bumped on every change of the value; lookups carry the generation they were issued in.
    generation: u64,
    deadline: Option<Instant>,
}

impl<P> FieldTask<P>
where
    P: GeocodingProvider + 'static,
{
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<FieldEvent>,
        state_tx: watch::Sender<AddressFieldState>,
    ) {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, Completion>> =
            FuturesUnordered::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => break,
                },
                () = sleep_until(self.deadline) => {
                    self.deadline = None;
                    if let Some(lookup) = self.on_debounce_elapsed() {
                        in_flight.push(lookup);
                    }
                },
                Some((tag, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.on_completion(tag, result);
                },
            }

            state_tx.send_if_modified(|published| {
                if *published == self.state {
                    return false;
                }
                published.clone_from(&self.state);
                true
            });
        }
        debug!("address field unmounted");
    }

    fn on_event(&mut self, event: FieldEvent) {
        match event {
            FieldEvent::Input(value) => self.on_input(value),
            FieldEvent::Focus => self.on_focus(),
            FieldEvent::Select(id) => self.on_select(&id),
            FieldEvent::Pointer(press) => self.on_pointer(press),
            FieldEvent::Clear => self.reset(String::new()),
        }
    }

    fn on_input(&mut self, value: String) {
        if value.is_empty() {
            self.reset(value);
            return;
        }
        self.state.value = value;
        self.edited();
        self.state.is_open = self.is_queryable();
        self.arm();
    }

    fn on_focus(&mut self) {
        if self.is_queryable() && !self.state.is_open {
            self.state.is_open = true;
            // the lookup for this very value is still running
            if !self.state.is_loading {
                self.arm();
            }
        }
    }

    fn on_select(&mut self, id: &str) {
        let Some(description) = self
            .state
            .suggestions
            .iter()
            .find(|suggestion| suggestion.id == id)
            .map(|suggestion| suggestion.description.clone())
        else {
            debug!("ignoring selection of unknown suggestion {id:?}");
            return;
        };
        self.reset(description);
    }

    fn on_pointer(&mut self, press: PointerDown) {
        if self.state.is_open && !press.is_inside(self.element) {
            self.state.is_open = false;
        }
    }

    /// Set the value, drop the suggestions and close the dropdown.
    fn reset(&mut self, value: String) {
        self.state.value = value;
        self.state.suggestions.clear();
        self.state.is_open = false;
        self.deadline = None;
        self.edited();
    }

    fn on_debounce_elapsed(&mut self) -> Option<BoxFuture<'static, Completion>> {
        if !self.is_queryable() {
            self.state.suggestions.clear();
            return None;
        }
        if !self.state.is_open {
            return None;
        }
        let Some(provider) = self.provider.clone() else {
            debug!("geocoding provider not loaded, leaving {:?} as free text", self.state.value);
            self.state.suggestions.clear();
            return None;
        };

        let tag = QueryTag {
            generation: self.generation,
            value: self.state.value.clone(),
        };
        let options = self.options.clone();
        self.state.is_loading = true;
        Some(
            async move {
                let result = provider.suggest(&tag.value, &options).await;
                (tag, result)
            }
            .boxed(),
        )
    }

    fn on_completion(&mut self, tag: QueryTag, result: Result<Vec<Suggestion>, SuggestError>) {
        if !self.is_current(&tag) {
            debug!("discarding stale suggestions for {:?}", tag.value);
            return;
        }
        self.state.is_loading = false;
        self.state.suggestions = match result {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("no suggestions for {:?}: {e}", tag.value);
                Vec::new()
            }
        };
    }

    fn edited(&mut self) {
        self.generation += 1;
        self.state.is_loading = false;
    }

    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn is_queryable(&self) -> bool {
        self.state.value.chars().count() > self.min_query_chars
    }

    fn is_current(&self, tag: &QueryTag) -> bool {
        tag.generation == self.generation && tag.value == self.state.value
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted provider: answers every query with suggestions derived from it, after a delay
    /// that can be set per query.
    #[derive(Default)]
    struct StubProvider {
        calls: Mutex<Vec<String>>,
        delays: Mutex<Vec<(String, Duration)>>,
        failing: bool,
    }

    impl StubProvider {
        fn failing() -> Self {
            Self {
                failing: true,
                ..Default::default()
            }
        }

        fn delay(&self, query: &str, delay: Duration) {
            self.delays
                .lock()
                .unwrap()
                .push((query.to_string(), delay));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn suggestions_for(query: &str) -> Vec<Suggestion> {
        vec![
            Suggestion {
                id: format!("{query}-1"),
                primary_text: query.to_string(),
                secondary_text: "France".to_string(),
                description: format!("{query}, France"),
            },
            Suggestion {
                id: format!("{query}-2"),
                primary_text: format!("Rue de {query}"),
                secondary_text: "Paris, France".to_string(),
                description: format!("Rue de {query}, Paris, France"),
            },
        ]
    }

    impl GeocodingProvider for StubProvider {
        async fn suggest(
            &self,
            query: &str,
            _options: &SuggestOptions,
        ) -> Result<Vec<Suggestion>, SuggestError> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = self
                .delays
                .lock()
                .unwrap()
                .iter()
                .find(|(q, _)| q == query)
                .map(|(_, d)| *d)
                .unwrap_or(Duration::from_millis(10));
            time::sleep(delay).await;
            if self.failing {
                return Err(SuggestError::Status {
                    status: "OVER_QUERY_LIMIT".to_string(),
                    message: None,
                });
            }
            Ok(suggestions_for(query))
        }
    }

    fn props() -> FieldProps {
        FieldPropsBuilder::default()
            .label("Départ")
            .placeholder("Adresse de départ (France)...")
            .build()
            .unwrap()
    }

    fn mount(provider: &Arc<StubProvider>, document: &Document) -> AddressAutocomplete {
        AddressAutocomplete::mount(props(), Some(provider.clone()), document)
    }

    /// Let the field task drain its queue without moving past any pending deadline.
    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    async fn past_debounce() {
        time::sleep(Duration::from_millis(450)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn short_values_never_query() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);

        // Act
        for value in ["P", "Pa"] {
            field.input(value);
            past_debounce().await;
        }
        field.focus();
        past_debounce().await;

        // Assert
        assert!(provider.calls().is_empty());
        let state = field.state();
        assert_eq!(state.value, "Pa");
        assert_eq!(state.dropdown(), Dropdown::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_issues_one_query_for_final_value() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);

        // Act
        for value in ["Par", "Pari", "Paris", "Paris 1", "Paris 12"] {
            field.input(value);
            time::sleep(Duration::from_millis(100)).await;
        }
        past_debounce().await;

        // Assert
        assert_eq!(provider.calls(), vec!["Paris 12"]);
        let state = field.state();
        assert_eq!(state.suggestions, suggestions_for("Paris 12"));
        assert_eq!(state.dropdown(), Dropdown::OpenWithResults);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_while_lookup_in_flight() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        provider.delay("Nice", Duration::from_millis(500));
        let document = Document::new();
        let field = mount(&provider, &document);

        // Act
        field.input("Nice");
        past_debounce().await;

        // Assert
        let state = field.state();
        assert!(state.is_loading);
        assert_eq!(state.dropdown(), Dropdown::OpenEmpty);

        time::sleep(Duration::from_millis(500)).await;
        let state = field.state();
        assert!(!state.is_loading);
        assert_eq!(state.dropdown(), Dropdown::OpenWithResults);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_is_discarded() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        provider.delay("Pari", Duration::from_millis(1000));
        provider.delay("Paris", Duration::from_millis(10));
        let document = Document::new();
        let field = mount(&provider, &document);

        // Act
        field.input("Pari");
        past_debounce().await;
        field.input("Paris");
        past_debounce().await;
        let fresh = field.state();
        // the slow lookup for "Pari" completes now
        time::sleep(Duration::from_millis(1000)).await;

        // Assert
        assert_eq!(provider.calls(), vec!["Pari", "Paris"]);
        assert_eq!(fresh.suggestions, suggestions_for("Paris"));
        assert_eq!(field.state().suggestions, suggestions_for("Paris"));
        assert!(!field.state().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_after_returning_to_same_value_is_discarded() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        provider.delay("Lyon", Duration::from_millis(420));
        let document = Document::new();
        let field = mount(&provider, &document);

        // Act
        field.input("Lyon");
        past_debounce().await;
        field.input("Lyo");
        settle().await;
        field.input("Lyon");
        settle().await;
        // first lookup lands inside the debounce window of the retyped value
        time::sleep(Duration::from_millis(380)).await;

        // Assert
        let state = field.state();
        assert!(state.suggestions.is_empty());
        assert!(state.is_open);
        assert!(!state.is_loading);
        assert_eq!(provider.calls(), vec!["Lyon"]);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_commits_description_and_closes() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        let mut updates = field.subscribe();
        field.input("Gare");
        past_debounce().await;
        let chosen = field.state().suggestions[1].clone();

        // Act
        field.select(chosen.id.clone());
        settle().await;
        past_debounce().await;

        // Assert
        let state = field.state();
        assert_eq!(state.value, chosen.description);
        assert!(state.suggestions.is_empty());
        assert_eq!(state.dropdown(), Dropdown::Closed);
        assert_eq!(provider.calls(), vec!["Gare"]);
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().value, chosen.description);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_selection_is_ignored() {
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        field.input("Gare");
        past_debounce().await;
        let before = field.state();

        field.select("nope");
        settle().await;

        assert_eq!(field.state(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_resets_and_closes() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        field.input("Toulouse");
        past_debounce().await;
        assert!(field.state().can_clear());

        // Act
        field.clear();
        settle().await;

        // Assert
        let state = field.state();
        assert_eq!(state, AddressFieldState::default());
        assert!(!state.can_clear());
        assert_eq!(state.dropdown(), Dropdown::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn press_inside_keeps_dropdown_open() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        field.input("Toulouse");
        past_debounce().await;

        // Act
        document.pointer_down(PointerDown::on(field.element()));
        settle().await;

        // Assert
        assert_eq!(field.state().dropdown(), Dropdown::OpenWithResults);
    }

    #[tokio::test(start_paused = true)]
    async fn erasing_the_value_closes() {
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        field.input("Toulouse");
        past_debounce().await;

        field.input("");
        settle().await;

        let state = field.state();
        assert_eq!(state.dropdown(), Dropdown::Closed);
        assert!(state.suggestions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn outside_press_closes_and_focus_reopens() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        field.input("Marseille");
        past_debounce().await;

        // Act
        document.pointer_down(PointerDown::elsewhere());
        settle().await;

        // Assert
        assert_eq!(field.state().dropdown(), Dropdown::Closed);
        assert_eq!(field.state().value, "Marseille");

        field.focus();
        settle().await;
        assert_eq!(field.state().dropdown(), Dropdown::OpenWithResults);
        past_debounce().await;
        assert_eq!(provider.calls(), vec!["Marseille", "Marseille"]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_field_does_not_query() {
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);

        field.input("Bordeaux");
        settle().await;
        document.pointer_down(PointerDown::elsewhere());
        past_debounce().await;

        assert!(provider.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn outside_press_right_after_typing_wins() {
        for _ in 0..100 {
            // Arrange
            let provider = Arc::new(StubProvider::default());
            let document = Document::new();
            let field = mount(&provider, &document);

            // Act
            field.input("Marseille");
            document.pointer_down(PointerDown::elsewhere());
            past_debounce().await;

            // Assert
            let state = field.state();
            assert_eq!(state.value, "Marseille");
            assert_eq!(state.dropdown(), Dropdown::Closed);
            assert!(provider.calls().is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn clear_right_after_typing_stays_cleared() {
        for _ in 0..100 {
            let provider = Arc::new(StubProvider::default());
            let document = Document::new();
            let field = mount(&provider, &document);

            field.input("Nantes");
            document.pointer_down(PointerDown::on(field.element()));
            field.clear();
            past_debounce().await;

            assert_eq!(field.state(), AddressFieldState::default());
            assert!(provider.calls().is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refocus_during_lookup_reuses_it() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        provider.delay("Lyon", Duration::from_millis(300));
        let document = Document::new();
        let field = mount(&provider, &document);
        field.input("Lyon");
        past_debounce().await;
        assert!(field.state().is_loading);

        // Act
        document.pointer_down(PointerDown::elsewhere());
        field.focus();
        settle().await;
        let reopened = field.state();
        time::sleep(Duration::from_millis(800)).await;

        // Assert
        assert_eq!(reopened.dropdown(), Dropdown::OpenEmpty);
        assert!(reopened.is_loading);
        let state = field.state();
        assert_eq!(state.dropdown(), Dropdown::OpenWithResults);
        assert!(!state.is_loading);
        assert_eq!(provider.calls(), vec!["Lyon"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_provider_degrades_to_free_text() {
        // Arrange
        let provider = Arc::new(StubProvider::failing());
        let document = Document::new();
        let field = mount(&provider, &document);

        // Act
        field.input("Lille");
        past_debounce().await;

        // Assert
        let state = field.state();
        assert_eq!(state.value, "Lille");
        assert!(state.suggestions.is_empty());
        assert!(!state.is_loading);
        assert_eq!(provider.calls(), vec!["Lille"]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_provider_degrades_to_free_text() {
        let document = Document::new();
        let field = AddressAutocomplete::mount(props(), None::<Arc<StubProvider>>, &document);

        field.input("Strasbourg");
        past_debounce().await;

        let state = field.state();
        assert_eq!(state.value, "Strasbourg");
        assert!(state.suggestions.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn fields_are_independent() {
        // Arrange
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let origin = mount(&provider, &document);
        let destination = mount(&provider, &document);

        // Act
        origin.input("Orly");
        destination.input("Roissy");
        past_debounce().await;
        document.pointer_down(PointerDown::on(destination.element()));
        settle().await;

        // Assert
        assert_eq!(origin.state().dropdown(), Dropdown::Closed);
        assert_eq!(destination.state().suggestions, suggestions_for("Roissy"));
        assert_eq!(destination.state().dropdown(), Dropdown::OpenWithResults);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_releases_listener() {
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let field = mount(&provider, &document);
        assert_eq!(document.listener_count(), 1);

        field.unmount().await;

        assert_eq!(document.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn initial_value_is_kept_without_query() {
        let provider = Arc::new(StubProvider::default());
        let document = Document::new();
        let props = FieldPropsBuilder::default()
            .label("Arrivée")
            .value("Aéroport de Nice")
            .build()
            .unwrap();
        let field = AddressAutocomplete::mount(props, Some(provider.clone()), &document);

        past_debounce().await;

        assert_eq!(field.value(), "Aéroport de Nice");
        assert_eq!(field.label(), "Arrivée");
        assert!(provider.calls().is_empty());
    }
}
