//! Application state shared by commands, evaluators and views.
//!
//! [`AppContext`] is the contract commands are written against;
//! [`Session`] is the in-memory implementation that lives for the whole
//! process. The state is owned by the dispatch loop and passed down by
//! reference, never through a global.

use serde_json::Value;
use termdash_eval::DataMap;
pub use termdash_types::config::ARGS_KEY;
use termdash_types::config::{ApplicationConfig, PageConfig, ViewConfig};

/// Read/write access to the session state.
pub trait AppContext {
    /// Store `value` under `key`, replacing any previous value.
    fn register_data(&mut self, key: &str, value: Value);

    fn data(&self, key: &str) -> Option<&Value>;

    fn data_map(&self) -> &DataMap;

    fn page_by_id(&self, id: &str) -> Option<&PageConfig>;

    fn page_by_shortcut(&self, shortcut: &str) -> Option<&PageConfig>;

    /// The view with `id` and the page that holds it.
    fn view(&self, id: &str) -> Option<(&ViewConfig, &PageConfig)>;

    /// The page currently shown.
    fn current_page(&self) -> Option<&PageConfig>;

    /// The view currently focused, if any.
    fn focused_view(&self) -> Option<&ViewConfig>;

    /// Show the page whose shortcut (or, failing that, id) is `key`.
    /// Returns `false` and leaves the state unchanged when there is none.
    fn switch_page(&mut self, key: &str) -> bool;

    /// Focus the view with `shortcut` on the current page.
    fn focus_on_view_shortcut(&mut self, shortcut: &str) -> bool;

    /// Focus the view with `id`, switching to its page first.
    fn focus_on_view_id(&mut self, id: &str) -> bool;

    /// Replace the current command arguments.
    fn register_args(&mut self, args: Vec<String>);

    fn arguments(&self) -> &[String];

    /// Ask the main loop to stop.
    fn quit(&mut self);

    fn is_running(&self) -> bool;
}

/// In-memory session state.
#[derive(Debug, Clone)]
pub struct Session {
    data: DataMap,
    pages: Vec<PageConfig>,
    current_page: Option<String>,
    focused_view: Option<String>,
    args: Vec<String>,
    running: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Vec::new(), DataMap::new())
    }
}

impl Session {
    /// Create a session showing the first page, with nothing focused.
    pub fn new(pages: Vec<PageConfig>, data: DataMap) -> Self {
        let current_page = pages.first().map(|p| p.id.clone());
        Self {
            data,
            pages,
            current_page,
            focused_view: None,
            args: Vec::new(),
            running: true,
        }
    }

    /// Create a session from loaded configuration: its pages and its static
    /// datasets.
    pub fn from_config(config: &ApplicationConfig) -> Self {
        Self::new(config.pages.clone(), config.data.clone())
    }

    pub fn pages(&self) -> &[PageConfig] {
        &self.pages
    }
}

impl AppContext for Session {
    fn register_data(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    fn data_map(&self) -> &DataMap {
        &self.data
    }

    fn page_by_id(&self, id: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.id == id)
    }

    fn page_by_shortcut(&self, shortcut: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.shortcut == shortcut)
    }

    fn view(&self, id: &str) -> Option<(&ViewConfig, &PageConfig)> {
        self.pages
            .iter()
            .find_map(|p| p.views.iter().find(|v| v.id == id).map(|v| (v, p)))
    }

    fn current_page(&self) -> Option<&PageConfig> {
        self.current_page.as_deref().and_then(|id| self.page_by_id(id))
    }

    fn focused_view(&self) -> Option<&ViewConfig> {
        self.focused_view
            .as_deref()
            .and_then(|id| self.view(id))
            .map(|(v, _)| v)
    }

    fn switch_page(&mut self, key: &str) -> bool {
        let Some(id) = self
            .page_by_shortcut(key)
            .or_else(|| self.page_by_id(key))
            .map(|p| p.id.clone())
        else {
            return false;
        };
        if self.current_page.as_deref() != Some(id.as_str()) {
            log::debug!("Switching to page [{id}]");
            self.focused_view = None;
            self.current_page = Some(id);
        }
        true
    }

    fn focus_on_view_shortcut(&mut self, shortcut: &str) -> bool {
        let Some(id) = self
            .current_page()
            .and_then(|p| p.views.iter().find(|v| v.shortcut == shortcut))
            .map(|v| v.id.clone())
        else {
            return false;
        };
        log::debug!("Focusing view [{id}]");
        self.focused_view = Some(id);
        true
    }

    fn focus_on_view_id(&mut self, id: &str) -> bool {
        let Some(page_id) = self.view(id).map(|(_, p)| p.id.clone()) else {
            return false;
        };
        self.switch_page(&page_id);
        self.focused_view = Some(id.to_string());
        true
    }

    fn register_args(&mut self, args: Vec<String>) {
        self.data.insert(
            ARGS_KEY.to_string(),
            Value::Array(args.iter().cloned().map(Value::String).collect()),
        );
        self.args = args;
    }

    fn arguments(&self) -> &[String] {
        &self.args
    }

    fn quit(&mut self) {
        log::info!("Quitting");
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
