use serde::{Deserialize, Serialize};

use crate::core::config::ExplorerConfig;
use crate::models::FileNode;
use crate::services::paths::{find_node_with, resolve_path, PathNormalizer};

use super::auto_select::auto_select_target;

/// Upper bound on consecutive auto-select redirects in one settle.
pub const MAX_SETTLE_STEPS: usize = 32;

/// Something that moves the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "lowercase")]
pub enum NavEvent {
    /// A click on a node in the tree, the folder grid or a link.
    Navigate(String),
    /// A click on a breadcrumb.
    Breadcrumb(String),
    /// The location changed underneath the explorer: page load, deep link,
    /// hand-edited URL.
    External(String),
    Back,
    Forward,
}

/// What the address bar should do once an event has settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "lowercase")]
pub enum Transition {
    /// New history entry.
    Push(String),
    /// Overwrite the current entry. Used for corrections the user did not ask
    /// for: closest-ancestor fallback and auto-select.
    Replace(String),
    /// Address bar already shows the right location.
    None,
}

impl Transition {
    pub fn path(&self) -> Option<&str> {
        match self {
            Transition::Push(p) | Transition::Replace(p) => Some(p),
            Transition::None => None,
        }
    }

    /// Folds a settle redirect into the transition that triggered it. The
    /// redirect overwrote the entry the event produced, so a push stays a push.
    fn redirected_to(self, path: String) -> Transition {
        match self {
            Transition::Push(_) => Transition::Push(path),
            Transition::Replace(_) | Transition::None => Transition::Replace(path),
        }
    }
}

/// Current location plus back/forward history, all as normalized paths.
///
/// `history[history_index] == current_path` holds after every `apply`, and
/// deserialization rejects states that break it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawNavigationState")]
pub struct NavigationState {
    current_path: String,
    history: Vec<String>,
    history_index: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNavigationState {
    current_path: String,
    history: Vec<String>,
    history_index: usize,
}

impl TryFrom<RawNavigationState> for NavigationState {
    type Error = String;

    fn try_from(raw: RawNavigationState) -> std::result::Result<Self, Self::Error> {
        match raw.history.get(raw.history_index) {
            Some(entry) if *entry == raw.current_path => Ok(Self {
                current_path: raw.current_path,
                history: raw.history,
                history_index: raw.history_index,
            }),
            Some(entry) => Err(format!(
                "history entry '{}' does not match current path '{}'",
                entry, raw.current_path
            )),
            None => Err(format!(
                "history index {} out of bounds for {} entries",
                raw.history_index,
                raw.history.len()
            )),
        }
    }
}

impl NavigationState {
    pub fn new(initial_path: &str, normalizer: &PathNormalizer) -> Self {
        let current_path = normalizer.normalize(initial_path);
        Self {
            history: vec![current_path.clone()],
            current_path,
            history_index: 0,
        }
    }

    /// State for a freshly mounted explorer: the initial route is resolved
    /// like any external location.
    pub fn mount(tree: &FileNode, config: &ExplorerConfig) -> (Self, Transition) {
        let initial = config.initial_path().to_string();
        let mut state = Self::new(&initial, &config.normalizer());
        let transition = state.apply(tree, config, NavEvent::External(initial));
        (state, transition)
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn can_go_back(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    /// The node at the current path. Looked up on demand, never stored.
    pub fn current_node<'a>(
        &self,
        tree: &'a FileNode,
        normalizer: &PathNormalizer,
    ) -> Option<&'a FileNode> {
        find_node_with(tree, &self.current_path, normalizer)
    }

    /// Applies `event`, then lets auto-select settle the result.
    pub fn apply(&mut self, tree: &FileNode, config: &ExplorerConfig, event: NavEvent) -> Transition {
        let normalizer = config.normalizer();
        let transition = match event {
            NavEvent::Navigate(path) => {
                let resolution = resolve_path(tree, &path, &normalizer);
                if resolution.redirected {
                    tracing::debug!("Navigate to missing {}, using {}", path, resolution.target);
                }
                self.navigate(resolution.target)
            }
            NavEvent::Breadcrumb(path) => match find_node_with(tree, &path, &normalizer) {
                Some(node) => self.breadcrumb(normalizer.normalize(&node.path)),
                None => {
                    tracing::debug!("Ignoring breadcrumb to missing path {}", path);
                    return Transition::None;
                }
            },
            NavEvent::External(raw) => {
                let resolution = resolve_path(tree, &raw, &normalizer);
                self.replace(resolution.target.clone());
                if resolution.redirected {
                    Transition::Replace(resolution.target)
                } else {
                    Transition::None
                }
            }
            NavEvent::Back => {
                if !self.can_go_back() {
                    return Transition::None;
                }
                self.move_to(self.history_index - 1)
            }
            NavEvent::Forward => {
                if !self.can_go_forward() {
                    return Transition::None;
                }
                self.move_to(self.history_index + 1)
            }
        };

        let transition = match self.settle(tree, config, &normalizer) {
            Some(path) => transition.redirected_to(path),
            None => transition,
        };
        debug_assert_eq!(self.history[self.history_index], self.current_path);
        transition
    }

    fn navigate(&mut self, path: String) -> Transition {
        if path == self.current_path {
            return Transition::None;
        }
        if self.history_index + 1 < self.history.len() {
            self.history.truncate(self.history_index + 1);
        }
        self.history.push(path.clone());
        self.history_index = self.history.len() - 1;
        self.current_path = path.clone();
        Transition::Push(path)
    }

    /// A breadcrumb back to a location already in the back history rewinds to
    /// its latest occurrence, so the next navigate discards what came after.
    fn breadcrumb(&mut self, path: String) -> Transition {
        let earlier = self.history[..self.history_index]
            .iter()
            .rposition(|p| *p == path);
        match earlier {
            Some(index) => {
                self.history_index = index;
                self.current_path = path.clone();
                Transition::Push(path)
            }
            None => self.navigate(path),
        }
    }

    fn move_to(&mut self, index: usize) -> Transition {
        self.history_index = index;
        self.current_path = self.history[index].clone();
        Transition::Replace(self.current_path.clone())
    }

    fn replace(&mut self, path: String) {
        self.history[self.history_index] = path.clone();
        self.current_path = path;
    }

    /// Runs auto-select until it stops moving. Each redirect replaces the
    /// current entry. Returns the final path when anything moved.
    fn settle(
        &mut self,
        tree: &FileNode,
        config: &ExplorerConfig,
        normalizer: &PathNormalizer,
    ) -> Option<String> {
        let start = self.current_path.clone();
        let mut moved = None;
        for _ in 0..MAX_SETTLE_STEPS {
            match auto_select_target(tree, &self.current_path, config, normalizer) {
                Some(next) if next != self.current_path => {
                    self.replace(next.clone());
                    moved = Some(next);
                }
                _ => return moved.filter(|path| *path != start),
            }
        }
        tracing::warn!(
            "Auto-select did not settle after {} steps, stopping at {}",
            MAX_SETTLE_STEPS,
            self.current_path
        );
        // A cycle can end where it began; that is not a redirect.
        moved.filter(|path| *path != start)
    }
}
