//! Page lifecycle events that must flush the save
//!
//! Mobile browsers may freeze or kill a backgrounded tab without running any
//! more script, so the last reliable moment to write is when the page is
//! hidden. Listeners translate DOM events into [`LifecycleEvent`] values and
//! hand them to the store.

/// Document visibility as reported by `document.visibilityState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Host events relevant to persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// `pagehide` (navigation away, bfcache, tab close on iOS)
    PageHide,
    /// `visibilitychange` with the new visibility
    VisibilityChange(Visibility),
    /// `beforeunload`
    BeforeUnload,
}

impl LifecycleEvent {
    /// DOM event name this value is produced from
    pub fn dom_name(&self) -> &'static str {
        match self {
            LifecycleEvent::PageHide => "pagehide",
            LifecycleEvent::VisibilityChange(_) => "visibilitychange",
            LifecycleEvent::BeforeUnload => "beforeunload",
        }
    }

    /// Whether the store should write immediately
    pub fn flushes(&self) -> bool {
        match self {
            LifecycleEvent::PageHide | LifecycleEvent::BeforeUnload => true,
            LifecycleEvent::VisibilityChange(v) => *v == Visibility::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_events_flush() {
        assert!(LifecycleEvent::PageHide.flushes());
        assert!(LifecycleEvent::BeforeUnload.flushes());
        assert!(LifecycleEvent::VisibilityChange(Visibility::Hidden).flushes());
    }

    #[test]
    fn test_becoming_visible_does_not_flush() {
        assert!(!LifecycleEvent::VisibilityChange(Visibility::Visible).flushes());
    }

    #[test]
    fn test_dom_names() {
        assert_eq!(LifecycleEvent::PageHide.dom_name(), "pagehide");
        assert_eq!(
            LifecycleEvent::VisibilityChange(Visibility::Visible).dom_name(),
            "visibilitychange"
        );
        assert_eq!(LifecycleEvent::BeforeUnload.dom_name(), "beforeunload");
    }
}
