use hl_core::{Article, ArticleId};
use hl_storage::FeedView;
use std::collections::HashSet;

/// The article list together with the displayed window and the pinned set.
///
/// `displayed` always starts with the pinned ids in pin order, most recent
/// first, so it doubles as the render order. `cursor` counts how many
/// entries of `all` the reveal ticks have consumed and never depends on the
/// order of `displayed`.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    all: Vec<Article>,
    displayed: Vec<ArticleId>,
    pinned: Vec<ArticleId>,
    cursor: usize,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with `articles` and show the first `window` of them.
    pub fn seed(&mut self, articles: Vec<Article>, window: usize) {
        let mut seen = HashSet::new();
        self.all = articles
            .into_iter()
            .filter(|article| seen.insert(article.id.clone()))
            .collect();
        self.displayed = self.all.iter().take(window).map(|a| a.id.clone()).collect();
        self.pinned.clear();
        self.cursor = self.displayed.len();
    }

    /// Seed from `articles`, then apply a persisted view if it still matches
    /// them. Returns whether the view was applied.
    pub fn restore(&mut self, articles: Vec<Article>, view: &FeedView, window: usize) -> bool {
        self.seed(articles, window);

        let known: HashSet<&ArticleId> = self.all.iter().map(|a| &a.id).collect();
        let displayed: HashSet<&ArticleId> = view.displayed.iter().collect();
        let valid = view.cursor <= self.all.len()
            && displayed.len() == view.displayed.len()
            && view.displayed.iter().all(|id| known.contains(id))
            && view.pinned.iter().all(|id| displayed.contains(id))
            && view.pinned.iter().collect::<HashSet<_>>().len() == view.pinned.len();
        if !valid {
            return false;
        }

        let mut ordered = view.pinned.clone();
        ordered.extend(view.displayed.iter().filter(|id| !view.pinned.contains(id)).cloned());
        self.displayed = ordered;
        self.pinned = view.pinned.clone();
        self.cursor = view.cursor;
        true
    }

    /// Move up to `batch` unrevealed articles into view, right after the
    /// pinned ones. Returns how many became visible.
    pub fn reveal_more(&mut self, batch: usize) -> usize {
        let end = (self.cursor + batch).min(self.all.len());
        if self.cursor >= end {
            return 0;
        }

        // Pinning can surface an article before its turn
        let fresh: Vec<ArticleId> = self.all[self.cursor..end]
            .iter()
            .map(|a| a.id.clone())
            .filter(|id| !self.displayed.contains(id))
            .collect();
        self.cursor = end;

        let count = fresh.len();
        let rest = self.displayed.split_off(self.pinned.len());
        self.displayed.extend(fresh);
        self.displayed.extend(rest);
        count
    }

    /// Pin an article. Returns false if it was already pinned or is unknown.
    pub fn pin(&mut self, id: &ArticleId) -> bool {
        if self.pinned.contains(id) || !self.contains(id) {
            return false;
        }
        self.displayed.retain(|d| d != id);
        self.displayed.insert(0, id.clone());
        self.pinned.insert(0, id.clone());
        true
    }

    /// Remove an article from every view. Returns false if it was unknown.
    pub fn delete(&mut self, id: &ArticleId) -> bool {
        let Some(position) = self.all.iter().position(|a| &a.id == id) else {
            return false;
        };
        if position < self.cursor {
            self.cursor -= 1;
        }
        self.all.remove(position);
        self.displayed.retain(|d| d != id);
        self.pinned.retain(|p| p != id);
        true
    }

    pub fn contains(&self, id: &ArticleId) -> bool {
        self.all.iter().any(|a| &a.id == id)
    }

    pub fn article(&self, id: &ArticleId) -> Option<&Article> {
        self.all.iter().find(|a| &a.id == id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Article> {
        let title = title.trim();
        self.all
            .iter()
            .find(|a| a.display_title() == title)
            .or_else(|| {
                self.all
                    .iter()
                    .find(|a| a.display_title().eq_ignore_ascii_case(title))
            })
    }

    pub fn all(&self) -> &[Article] {
        &self.all
    }

    pub fn displayed(&self) -> Vec<&Article> {
        self.resolve(&self.displayed)
    }

    pub fn pinned(&self) -> Vec<&Article> {
        self.resolve(&self.pinned)
    }

    pub fn is_pinned(&self, id: &ArticleId) -> bool {
        self.pinned.contains(id)
    }

    /// Pinned articles first, then the rest of the displayed window.
    pub fn rendered(&self) -> Vec<&Article> {
        let rest = self.displayed.iter().filter(|id| !self.pinned.contains(id));
        self.pinned
            .iter()
            .chain(rest)
            .filter_map(|id| self.article(id))
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn unrevealed(&self) -> usize {
        self.all.len().saturating_sub(self.cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            displayed: self.displayed.clone(),
            pinned: self.pinned.clone(),
            cursor: self.cursor,
        }
    }

    fn resolve(&self, ids: &[ArticleId]) -> Vec<&Article> {
        ids.iter().filter_map(|id| self.article(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| {
                Article::new(
                    Some(format!("Story {}", i)),
                    Some("Wire".to_string()),
                    format!("2024-10-13T10:{:02}:00Z", i % 60),
                )
            })
            .collect()
    }

    fn titles(list: &[&Article]) -> Vec<String> {
        list.iter().map(|a| a.display_title().to_string()).collect()
    }

    fn assert_consistent(state: &FeedState) {
        let displayed: HashSet<_> = state.displayed.iter().collect();
        assert_eq!(displayed.len(), state.displayed.len(), "duplicate in displayed");
        for id in &state.pinned {
            assert!(displayed.contains(id), "pinned article missing from displayed");
        }
        assert_eq!(&state.displayed[..state.pinned.len()], &state.pinned[..]);
        for id in &state.displayed {
            assert!(state.contains(id));
        }
        assert!(state.cursor <= state.all.len());
    }

    #[test]
    fn test_seed_shows_first_window() {
        let mut state = FeedState::new();
        state.seed(articles(12), 10);

        assert_eq!(state.all().len(), 12);
        assert_eq!(state.displayed().len(), 10);
        assert_eq!(titles(&state.displayed())[0], "Story 0");
        assert!(state.pinned().is_empty());
        assert_eq!(state.cursor(), 10);
        assert_eq!(state.unrevealed(), 2);
    }

    #[test]
    fn test_seed_drops_duplicate_ids() {
        let mut list = articles(3);
        list.push(list[1].clone());
        let mut state = FeedState::new();
        state.seed(list, 10);
        assert_eq!(state.all().len(), 3);
        assert_consistent(&state);
    }

    #[test]
    fn test_reveal_prepends_next_batch() {
        let mut state = FeedState::new();
        state.seed(articles(20), 10);

        assert_eq!(state.reveal_more(5), 5);
        let shown = titles(&state.displayed());
        assert_eq!(shown.len(), 15);
        assert_eq!(&shown[..5], &["Story 10", "Story 11", "Story 12", "Story 13", "Story 14"]);
        assert_eq!(shown[5], "Story 0");
        assert_eq!(shown[14], "Story 9");

        assert_eq!(state.reveal_more(5), 5);
        assert_eq!(state.reveal_more(5), 0);
        assert_eq!(state.displayed().len(), 20);
        assert_consistent(&state);
    }

    #[test]
    fn test_reveal_keeps_pins_in_front() {
        let all = articles(20);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);
        state.pin(&all[7].id);

        state.reveal_more(5);
        let shown = titles(&state.rendered());
        assert_eq!(shown[0], "Story 7");
        assert_eq!(shown[1], "Story 10");
        assert_eq!(shown.len(), 15);
        assert_consistent(&state);
    }

    #[test]
    fn test_reveal_cursor_ignores_pin_reordering() {
        let all = articles(20);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);
        state.pin(&all[3].id);
        state.pin(&all[8].id);

        state.reveal_more(5);
        state.reveal_more(5);
        let shown = titles(&state.rendered());
        let unique: HashSet<_> = shown.iter().collect();
        assert_eq!(shown.len(), 20);
        assert_eq!(unique.len(), 20);
        assert_consistent(&state);
    }

    #[test]
    fn test_reveal_skips_already_pinned_unrevealed() {
        let all = articles(15);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);
        state.pin(&all[12].id);

        assert_eq!(state.reveal_more(5), 4);
        assert_eq!(state.rendered().len(), 15);
        assert_consistent(&state);
    }

    #[test]
    fn test_pin_is_idempotent() {
        let all = articles(10);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);

        assert!(state.pin(&all[3].id));
        let once = (state.view(), titles(&state.rendered()));
        assert!(!state.pin(&all[3].id));
        assert_eq!((state.view(), titles(&state.rendered())), once);

        let rendered = titles(&state.rendered());
        assert_eq!(rendered[0], "Story 3");
        assert_eq!(rendered.len(), 10);
        assert_consistent(&state);
    }

    #[test]
    fn test_most_recent_pin_first() {
        let all = articles(10);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);
        state.pin(&all[2].id);
        state.pin(&all[5].id);

        assert_eq!(titles(&state.pinned()), vec!["Story 5", "Story 2"]);
        assert_eq!(&titles(&state.rendered())[..3], &["Story 5", "Story 2", "Story 0"]);
    }

    #[test]
    fn test_pin_unknown_article() {
        let mut state = FeedState::new();
        state.seed(articles(3), 10);
        let stranger = Article::new(Some("Elsewhere".into()), None, "");
        assert!(!state.pin(&stranger.id));
        assert!(state.pinned().is_empty());
    }

    #[test]
    fn test_pin_then_delete() {
        let all = articles(10);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);
        let before = titles(&state.rendered());

        state.pin(&all[3].id);
        assert_eq!(titles(&state.rendered())[0], "Story 3");

        assert!(state.delete(&all[3].id));
        assert!(state.pinned().is_empty());
        let expected: Vec<_> = before.into_iter().filter(|t| t != "Story 3").collect();
        assert_eq!(titles(&state.rendered()), expected);
        assert!(!state.contains(&all[3].id));
        assert_consistent(&state);
    }

    #[test]
    fn test_delete_adjusts_cursor() {
        let all = articles(20);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);

        state.delete(&all[2].id);
        assert_eq!(state.cursor(), 9);
        state.reveal_more(5);
        let shown = titles(&state.rendered());
        assert_eq!(&shown[..5], &["Story 10", "Story 11", "Story 12", "Story 13", "Story 14"]);

        // Deleting an unrevealed article leaves the cursor alone
        state.delete(&all[18].id);
        assert_eq!(state.cursor(), 14);
        assert!(!state.delete(&all[18].id));
        assert_consistent(&state);
    }

    #[test]
    fn test_invariants_over_mixed_operations() {
        let all = articles(40);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);

        for step in 0..40 {
            let target = &all[(step * 7) % all.len()].id;
            match step % 4 {
                0 => {
                    state.pin(target);
                }
                1 => {
                    state.reveal_more(5);
                }
                2 => {
                    state.delete(target);
                    assert!(!state.contains(target));
                    assert!(!state.is_pinned(target));
                }
                _ => {
                    state.pin(target);
                    state.pin(target);
                }
            }
            assert_consistent(&state);
        }
    }

    #[test]
    fn test_restore_applies_matching_view() {
        let all = articles(20);
        let mut state = FeedState::new();
        state.seed(all.clone(), 10);
        state.pin(&all[4].id);
        state.reveal_more(5);
        let view = state.view();

        let mut restored = FeedState::new();
        assert!(restored.restore(all.clone(), &view, 10));
        assert_eq!(restored.view(), view);
        assert_eq!(titles(&restored.rendered()), titles(&state.rendered()));
    }

    #[test]
    fn test_restore_rejects_stale_view() {
        let all = articles(20);
        let stale = FeedView {
            displayed: vec![Article::new(Some("gone".into()), None, "").id],
            pinned: vec![],
            cursor: 1,
        };
        let mut state = FeedState::new();
        assert!(!state.restore(all.clone(), &stale, 10));
        assert_eq!(state.displayed().len(), 10);
        assert_eq!(state.cursor(), 10);

        let pinned_not_displayed = FeedView {
            displayed: vec![all[0].id.clone()],
            pinned: vec![all[1].id.clone()],
            cursor: 1,
        };
        assert!(!state.restore(all, &pinned_not_displayed, 10));
        assert_consistent(&state);
    }

    #[test]
    fn test_find_by_title() {
        let mut state = FeedState::new();
        state.seed(articles(5), 10);
        assert_eq!(state.find_by_title("Story 2").unwrap().display_title(), "Story 2");
        assert_eq!(state.find_by_title(" story 4 ").unwrap().display_title(), "Story 4");
        assert!(state.find_by_title("Story 9").is_none());
    }
}
