//! View Module contract.
//!
//! Каждый маршрут строит ровно один модуль и вызывает `init()`. Модуль
//! сам владеет своими сигналами; обработчики окна (стрелки, beforeunload)
//! вешаются в `events()` один раз за жизнь модуля.

use crate::layout::global_context::change_title;
use leptos::prelude::AnyView;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guards `events()` so that it runs at most once.
#[derive(Debug, Clone, Default)]
pub struct ModuleLifecycle {
    bound: Arc<AtomicBool>,
}

impl ModuleLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `bind` on the first call only. Returns whether it ran.
    pub fn bind_once(&self, bind: impl FnOnce()) -> bool {
        if self.bound.swap(true, Ordering::SeqCst) {
            return false;
        }
        bind();
        true
    }

    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }
}

pub trait ViewModule {
    /// Document title without the ` - Iris` suffix
    fn title(&self) -> String;

    fn lifecycle(&self) -> &ModuleLifecycle;

    /// Window-level listeners
    fn events(&self) {}

    /// Starts fetching whatever the module shows
    fn load(&self);

    fn view(&self) -> AnyView;

    fn init(&self) {
        change_title(&self.title());
        self.lifecycle().bind_once(|| self.events());
        self.load();
    }
}

/// Second path segment of a detail route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    New,
    Id(String),
}

impl EntityRef {
    pub fn parse(segment: &str) -> Self {
        if segment == "new" {
            EntityRef::New
        } else {
            EntityRef::Id(segment.to_string())
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            EntityRef::New => None,
            EntityRef::Id(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailMode<M> {
    Viewing,
    Editing { draft: M },
}

/// View/edit state of a detail page.
///
/// `saved` - последний полученный с сервера ответ (уже смапленный в модель),
/// `draft` живёт только в режиме редактирования.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<M> {
    saved: Option<M>,
    mode: DetailMode<M>,
}

impl<M: Clone> DetailState<M> {
    /// New entity: nothing fetched, straight into editing
    pub fn blank(model: M) -> Self {
        Self {
            saved: None,
            mode: DetailMode::Editing { draft: model },
        }
    }

    pub fn loaded(model: M) -> Self {
        Self {
            saved: Some(model),
            mode: DetailMode::Viewing,
        }
    }

    pub fn mode(&self) -> &DetailMode<M> {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, DetailMode::Editing { .. })
    }

    pub fn saved(&self) -> Option<&M> {
        self.saved.as_ref()
    }

    pub fn draft(&self) -> Option<&M> {
        match &self.mode {
            DetailMode::Editing { draft } => Some(draft),
            DetailMode::Viewing => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut M> {
        match &mut self.mode {
            DetailMode::Editing { draft } => Some(draft),
            DetailMode::Viewing => None,
        }
    }

    /// What the page shows right now
    pub fn current(&self) -> Option<&M> {
        self.draft().or(self.saved.as_ref())
    }

    /// Viewing → Editing with a copy of the saved model
    pub fn edit(&mut self) {
        if let (DetailMode::Viewing, Some(saved)) = (&self.mode, &self.saved) {
            self.mode = DetailMode::Editing {
                draft: saved.clone(),
            };
        }
    }

    /// Drops the draft. A blank entity has nothing to go back to.
    pub fn discard(&mut self) -> bool {
        if self.saved.is_none() {
            return false;
        }
        self.mode = DetailMode::Viewing;
        true
    }

    pub fn save_succeeded(&mut self, model: M) {
        self.saved = Some(model);
        self.mode = DetailMode::Viewing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::prelude::IntoAny;
    use std::cell::Cell;

    struct CountingModule {
        lifecycle: ModuleLifecycle,
        bound: Cell<u32>,
        loads: Cell<u32>,
    }

    impl ViewModule for CountingModule {
        fn title(&self) -> String {
            "Plans".into()
        }

        fn lifecycle(&self) -> &ModuleLifecycle {
            &self.lifecycle
        }

        fn events(&self) {
            self.bound.set(self.bound.get() + 1);
        }

        fn load(&self) {
            self.loads.set(self.loads.get() + 1);
        }

        fn view(&self) -> AnyView {
            ().into_any()
        }
    }

    #[test]
    fn test_init_twice_binds_once() {
        let module = CountingModule {
            lifecycle: ModuleLifecycle::new(),
            bound: Cell::new(0),
            loads: Cell::new(0),
        };
        module.init();
        module.init();
        assert_eq!(module.bound.get(), 1);
        assert_eq!(module.loads.get(), 2);
        assert!(module.lifecycle().is_bound());
    }

    #[test]
    fn test_entity_ref() {
        assert_eq!(EntityRef::parse("new"), EntityRef::New);
        assert_eq!(EntityRef::parse("42"), EntityRef::Id("42".into()));
        assert_eq!(EntityRef::parse("42").id(), Some("42"));
        assert_eq!(EntityRef::New.id(), None);
    }

    #[test]
    fn test_blank_starts_editing() {
        let state = DetailState::blank("draft".to_string());
        assert!(state.is_editing());
        assert_eq!(state.saved(), None);
        assert_eq!(state.current().map(String::as_str), Some("draft"));
    }

    #[test]
    fn test_edit_then_discard_restores_saved() {
        let mut state = DetailState::loaded("v1".to_string());
        assert!(!state.is_editing());
        state.edit();
        if let Some(d) = state.draft_mut() {
            d.push_str("-changed");
        }
        assert_eq!(state.current().map(String::as_str), Some("v1-changed"));
        assert!(state.discard());
        assert_eq!(state.mode(), &DetailMode::Viewing);
        assert_eq!(state.current().map(String::as_str), Some("v1"));
    }

    #[test]
    fn test_discard_blank_stays_editing() {
        let mut state = DetailState::blank(1);
        assert!(!state.discard());
        assert!(state.is_editing());
    }

    #[test]
    fn test_save_returns_to_viewing() {
        let mut state = DetailState::loaded(1);
        state.edit();
        state.save_succeeded(2);
        assert!(!state.is_editing());
        assert_eq!(state.saved(), Some(&2));
    }
}
