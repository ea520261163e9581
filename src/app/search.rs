//! Keystroke debounce for live search. Pure and clock-injected: the
//! loop feeds it input edges and polls it on ticks.

use std::time::{Duration, Instant};

pub const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Default)]
pub struct SearchDebounce {
    pending: Option<(String, Instant)>,
}

impl SearchDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on every keystroke. Schedules a query for 300ms after the
    /// last edit; an empty (trimmed) field cancels any pending query.
    pub fn on_input(&mut self, keyword: &str, now: Instant) {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            self.pending = None;
        } else {
            self.pending = Some((trimmed.to_string(), now + DEBOUNCE));
        }
    }

    /// Enter bypasses the timer: cancels the pending query and fires
    /// now. Returns the keyword to search, if any.
    pub fn on_enter(&mut self, keyword: &str) -> Option<String> {
        self.pending = None;
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn on_clear(&mut self) {
        self.pending = None;
    }

    /// Called on ticks. Yields the keyword once its deadline passes.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(keyword, _)| keyword)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_keystrokes_fires_once_with_final_keyword() {
        let mut debounce = SearchDebounce::new();
        let start = Instant::now();

        debounce.on_input("r", start);
        debounce.on_input("ru", start + Duration::from_millis(100));
        debounce.on_input("rus", start + Duration::from_millis(200));
        debounce.on_input("rust", start + Duration::from_millis(250));

        // 300ms has passed since the first keystroke but not the last.
        assert_eq!(debounce.poll(start + Duration::from_millis(400)), None);

        let fired = debounce.poll(start + Duration::from_millis(550));
        assert_eq!(fired.as_deref(), Some("rust"));

        // One call per burst: nothing left after firing.
        assert_eq!(debounce.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn enter_bypasses_timer_and_cancels_pending() {
        let mut debounce = SearchDebounce::new();
        let start = Instant::now();

        debounce.on_input("ru", start);
        assert_eq!(debounce.on_enter("rust").as_deref(), Some("rust"));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(start + DEBOUNCE), None);
    }

    #[test]
    fn clearing_the_field_cancels_pending() {
        let mut debounce = SearchDebounce::new();
        let start = Instant::now();

        debounce.on_input("rust", start);
        debounce.on_input("", start + Duration::from_millis(100));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn whitespace_only_keyword_never_fires() {
        let mut debounce = SearchDebounce::new();
        let start = Instant::now();

        debounce.on_input("   ", start);
        assert!(!debounce.is_pending());
        assert_eq!(debounce.on_enter("  "), None);
    }

    #[test]
    fn keyword_is_trimmed_before_firing() {
        let mut debounce = SearchDebounce::new();
        let start = Instant::now();

        debounce.on_input("  rust  ", start);
        let fired = debounce.poll(start + DEBOUNCE);
        assert_eq!(fired.as_deref(), Some("rust"));
    }
}
