//! User configuration: page metrics, snap tunables, keybindings, and
//! persistence.
//!
//! Settings are stored as TOML at `$XDG_CONFIG_HOME/snapfolio/config.toml`
//! (default `~/.config/snapfolio/config.toml`).  Missing keys fall back to
//! defaults; an unreadable file falls back to the defaults entirely.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::core::snap::SnapConfig;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    NextTab,
    BoardUp,
    BoardDown,
    Download,
    Reload,
    PreviewArtwork,
    PreviewDocument,
    PrevPage,
    NextPage,
    ClosePreview,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the config file).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::NextTab,
        Action::BoardUp,
        Action::BoardDown,
        Action::Download,
        Action::Reload,
        Action::PreviewArtwork,
        Action::PreviewDocument,
        Action::PrevPage,
        Action::NextPage,
        Action::ClosePreview,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Top => "top",
            Action::NextTab => "next_tab",
            Action::BoardUp => "board_up",
            Action::BoardDown => "board_down",
            Action::Download => "download",
            Action::Reload => "reload",
            Action::PreviewArtwork => "preview_artwork",
            Action::PreviewDocument => "preview_document",
            Action::PrevPage => "prev_page",
            Action::NextPage => "next_page",
            Action::ClosePreview => "close_preview",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    fn modifier_prefix(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s
    }

    /// User-friendly display string (e.g. `"↓"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let key = match self.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            _ => self.code_name(),
        };
        format!("{}{key}", self.modifier_prefix())
    }

    /// Serialise to config-file format (e.g. `"Alt+Up"`, `"q"`).
    fn to_config_string(&self) -> String {
        format!("{}{}", self.modifier_prefix(), self.code_name())
    }

    fn code_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        }
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => {
                let n: u8 = k[1..].parse().ok()?;
                KeyCode::F(n)
            }
            // Keep the original case for single characters.
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration, deserialisable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logical pixels per terminal column.
    pub cell_width_px: f64,
    /// Logical pixels per terminal row.
    pub cell_height_px: f64,
    /// Distance of one mouse-wheel notch.
    pub wheel_step_px: f64,
    /// Distance of one arrow-key press.
    pub key_step_px: f64,
    /// Animation frames per second.
    pub frame_rate: u32,
    /// Base URL of the file catalog service.
    pub catalog_url: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub snap: SnapConfig,
    /// Raw binding overrides: action name → key strings.
    pub keys: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    pub bindings: HashMap<Action, Vec<KeyBind>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cell_width_px: 8.0,
            cell_height_px: 16.0,
            wheel_step_px: 64.0,
            key_step_px: 48.0,
            frame_rate: 60,
            catalog_url: None,
            download_dir: None,
            snap: SnapConfig::default(),
            keys: BTreeMap::new(),
            bindings: Self::default_bindings(),
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(Action::ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(Action::ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(PageUp, n)]);
        m.insert(
            Action::PageDown,
            vec![KeyBind::new(PageDown, n), KeyBind::new(Char(' '), n)],
        );
        m.insert(Action::Top, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(Action::NextTab, vec![KeyBind::new(Tab, n)]);
        m.insert(Action::BoardUp, vec![KeyBind::new(Char('['), n)]);
        m.insert(Action::BoardDown, vec![KeyBind::new(Char(']'), n)]);
        m.insert(Action::Download, vec![KeyBind::new(Char('d'), n)]);
        m.insert(Action::Reload, vec![KeyBind::new(Char('r'), n)]);
        m.insert(Action::PreviewArtwork, vec![KeyBind::new(Char('p'), n)]);
        m.insert(Action::PreviewDocument, vec![KeyBind::new(Char('i'), n)]);
        m.insert(Action::PrevPage, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(Action::NextPage, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(Action::ClosePreview, vec![KeyBind::new(Esc, n)]);
        m.insert(Action::Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: tab | {}/{}: preview | {}: download | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::NextTab),
            self.short_binding(Action::PreviewArtwork),
            self.short_binding(Action::PreviewDocument),
            self.short_binding(Action::Download),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match Self::parse(&contents) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "invalid config, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn parse(s: &str) -> Result<Self, toml::de::Error> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.cell_width_px = config.cell_width_px.clamp(1.0, 64.0);
        config.cell_height_px = config.cell_height_px.clamp(1.0, 128.0);
        config.frame_rate = config.frame_rate.clamp(10, 240);
        config.snap.sanitise();
        config.bindings = Self::default_bindings();
        for (key, values) in &config.keys {
            let Some(action) = Action::from_config_key(key) else {
                continue;
            };
            let parsed: Vec<KeyBind> = values.iter().filter_map(|v| KeyBind::parse(v)).collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }
        Ok(config)
    }

    /// Persist current config (with every binding spelled out) to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise()?)?;
        Ok(())
    }

    fn serialise(&self) -> anyhow::Result<String> {
        let mut out = self.clone();
        out.keys = Action::ALL
            .iter()
            .filter_map(|&action| {
                let binds = self.bindings.get(&action)?;
                let keys = binds.iter().map(|b| b.to_config_string()).collect();
                Some((action.config_key().to_string(), keys))
            })
            .collect();
        Ok(format!("# snapfolio configuration\n\n{}", toml::to_string_pretty(&out)?))
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/snapfolio/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("snapfolio").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn defaults_match_keys() {
        let config = AppConfig::default();
        assert_eq!(config.match_key(key(KeyCode::Char('j'))), Some(Action::ScrollDown));
        assert_eq!(config.match_key(key(KeyCode::Esc)), Some(Action::ClosePreview));
        assert_eq!(config.match_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::parse(
            r#"
            cell_width_px = 10.0
            catalog_url = "http://localhost:8000"

            [snap]
            desktop_duration_ms = 1500

            [keys]
            quit = ["Ctrl+x", "Q"]
            "#,
        )
        .unwrap();
        assert_eq!(config.cell_width_px, 10.0);
        assert_eq!(config.cell_height_px, 16.0);
        assert_eq!(config.catalog_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.snap.desktop_duration_ms, 1500);
        assert_eq!(config.snap.mobile_breakpoint, 768.0);

        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(config.match_key(ctrl_x), Some(Action::Quit));
        assert_eq!(config.match_key(key(KeyCode::Char('Q'))), Some(Action::Quit));
        assert_eq!(config.match_key(key(KeyCode::Char('q'))), None);
    }

    #[test]
    fn unusable_snap_values_fall_back_to_defaults() {
        let config = AppConfig::parse(
            r#"
            [snap]
            throttle_ms = 0
            mobile_breakpoint = nan
            buffer = -5.0
            section_margin = inf
            manifesto_stops = [0.1, 2.0]
            desktop_duration_ms = 1500
            "#,
        )
        .unwrap();
        let defaults = crate::core::snap::SnapConfig::default();
        assert_eq!(config.snap.throttle_ms, defaults.throttle_ms);
        assert_eq!(config.snap.mobile_breakpoint, defaults.mobile_breakpoint);
        assert_eq!(config.snap.buffer, defaults.buffer);
        assert_eq!(config.snap.section_margin, defaults.section_margin);
        assert_eq!(config.snap.manifesto_stops, defaults.manifesto_stops);
        assert_eq!(config.snap.desktop_duration_ms, 1500);
    }

    #[test]
    fn invalid_file_is_an_error() {
        assert!(AppConfig::parse("cell_width_px = \"wide\"").is_err());
    }

    #[test]
    fn serialised_config_round_trips_bindings() {
        let config = AppConfig::default();
        let text = config.serialise().unwrap();
        let back = AppConfig::parse(&text).unwrap();
        for action in Action::ALL {
            assert_eq!(back.bindings.get(action), config.bindings.get(action), "{action:?}");
        }
    }

    #[test]
    fn key_strings_parse() {
        assert_eq!(
            KeyBind::parse("Alt+Up"),
            Some(KeyBind::new(KeyCode::Up, KeyModifiers::ALT))
        );
        assert_eq!(KeyBind::parse("F5"), Some(KeyBind::new(KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Hyper+a"), None);
        assert_eq!(KeyBind::parse("banana"), None);
    }
}
