use crate::shared::ids::ActorId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
}

impl PageAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Last => "last",
        }
    }

    pub fn target(self, current: usize, total_pages: usize) -> usize {
        match self {
            Self::First => 0,
            Self::Previous => current.saturating_sub(1),
            Self::Next => current.saturating_add(1),
            Self::Last => total_pages.saturating_sub(1),
        }
    }
}

/// Number of pages needed for `count` items; an empty list still has one page.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages.saturating_sub(1))
}

/// Current page per actor for one list menu.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pages: HashMap<ActorId, usize>,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, actor: &ActorId) -> usize {
        self.pages.get(actor).copied().unwrap_or(0)
    }

    /// Stores `page` clamped into range and returns the applied value.
    pub fn set(&mut self, actor: &ActorId, page: usize, total_pages: usize) -> usize {
        let applied = clamp_page(page, total_pages);
        self.pages.insert(actor.clone(), applied);
        applied
    }

    /// Re-clamps the stored page, e.g. after the record count shrank.
    pub fn reconcile(&mut self, actor: &ActorId, total_pages: usize) -> usize {
        let current = self.current(actor);
        self.set(actor, current, total_pages)
    }

    pub fn forget(&mut self, actor: &ActorId) {
        self.pages.remove(actor);
    }
}
