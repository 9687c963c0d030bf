//! Key mapping and action dispatch system for tau
//!
//! Defines key to an action, parsing from the config, and enum variants
//! for all navigation, selection and table actions used by tau.

use crate::core::ColumnKind;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Represents any action in the app: navigation, selection, table, or system.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    Nav(NavAction),
    Select(SelectAction),
    Table(TableAction),
    System(SystemAction),
}

/// Cursor movement and directory changes
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NavAction {
    GoUp,
    GoDown,
    GoParent,
    GoToTop,
    GoToBottom,
    PageUp,
    PageDown,
}

/// Selection changes that leave the cursor mostly alone
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SelectAction {
    ExtendUp,
    ExtendDown,
    Toggle,
    SelectAll,
    Clear,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TableAction {
    Open,
    SortBy(ColumnKind),
    Reload,
}

/// System actions (quit)
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SystemAction {
    Quit,
}

/// Key + modifiers as used in keybind/keymap
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Stores the mapping from Key to action, which is built in the config
pub struct Keymap {
    map: HashMap<Key, Action>,
}

impl Keymap {
    /// Builds the keymap from the config
    #[rustfmt::skip]
    pub fn from_config(config: &crate::config::Config) -> Self {
        let mut map = HashMap::new();
        let keys = config.keys();

        macro_rules! bind {
            ($keys:expr, $action:expr) => {
                bind($keys, $action, &mut map);
            };
        }

        use NavAction as N;
        use SelectAction as S;
        use TableAction as T;

        // NavActions
        bind!(keys.go_up(),             Action::Nav(N::GoUp));
        bind!(keys.go_down(),           Action::Nav(N::GoDown));
        bind!(keys.go_parent(),         Action::Nav(N::GoParent));
        bind!(keys.go_to_top(),         Action::Nav(N::GoToTop));
        bind!(keys.go_to_bottom(),      Action::Nav(N::GoToBottom));
        bind!(keys.page_up(),           Action::Nav(N::PageUp));
        bind!(keys.page_down(),         Action::Nav(N::PageDown));

        // SelectActions
        bind!(keys.extend_up(),         Action::Select(S::ExtendUp));
        bind!(keys.extend_down(),       Action::Select(S::ExtendDown));
        bind!(keys.toggle_select(),     Action::Select(S::Toggle));
        bind!(keys.select_all(),        Action::Select(S::SelectAll));
        bind!(keys.clear_selection(),   Action::Select(S::Clear));

        // TableActions
        bind!(keys.open(),              Action::Table(T::Open));
        bind!(keys.sort_name(),         Action::Table(T::SortBy(ColumnKind::Name)));
        bind!(keys.sort_type(),         Action::Table(T::SortBy(ColumnKind::Type)));
        bind!(keys.sort_size(),         Action::Table(T::SortBy(ColumnKind::Size)));
        bind!(keys.reload(),            Action::Table(T::Reload));

        // SystemActions
        bind!(keys.quit(),              Action::System(SystemAction::Quit));

        Keymap { map }
    }

    /// Looks up the action for a given key event
    pub fn lookup(&self, key: KeyEvent) -> Option<Action> {
        let k = Key {
            code: key.code,
            modifiers: key.modifiers,
        };

        if let Some(action) = self.map.get(&k).copied() {
            return Some(action);
        }

        if matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(KeyModifiers::SHIFT) {
            let k2 = Key {
                code: key.code,
                modifiers: key.modifiers - KeyModifiers::SHIFT,
            };
            return self.map.get(&k2).copied();
        }
        None
    }
}

/// Parses a key string from the config.
///
/// Accepts `Ctrl+x` style, `<c-x>` style and plain key names (`space`, `enter`, `f5`, ...).
pub fn parse_key(s: &str) -> Option<Key> {
    if let Some(inner) = s.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        let (prefix, name) = match inner.rsplit_once('-') {
            Some((prefix, name)) if !name.is_empty() => (prefix, name),
            _ => ("", inner),
        };
        let modifiers = fold_modifiers(prefix.split('-'), true)?;
        return key_named(name, modifiers);
    }

    if let Some(code) = single_char(s) {
        return Some(Key {
            code: KeyCode::Char(code),
            modifiers: KeyModifiers::NONE,
        });
    }

    let mut parts: Vec<&str> = s.split(['+', '-']).collect();
    let name = parts.pop()?;
    let modifiers = fold_modifiers(parts.into_iter(), false)?;
    key_named(name, modifiers)
}

/// Combines modifier names. `short` also allows the `c`, `a`/`m` and `s` shorthands of the
/// bracketed form.
fn fold_modifiers<'s>(names: impl Iterator<Item = &'s str>, short: bool) -> Option<KeyModifiers> {
    names
        .filter(|name| !name.is_empty())
        .try_fold(KeyModifiers::NONE, |acc, name| {
            let modifier = match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                "c" if short => KeyModifiers::CONTROL,
                "a" | "m" if short => KeyModifiers::ALT,
                "s" if short => KeyModifiers::SHIFT,
                _ => return None,
            };
            Some(acc | modifier)
        })
}

fn key_named(name: &str, modifiers: KeyModifiers) -> Option<Key> {
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" | "back" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "space" | "spc" => KeyCode::Char(' '),
        _ => match (single_char(name), lower.strip_prefix('f')) {
            (Some(c), _) if modifiers.contains(KeyModifiers::SHIFT) => {
                KeyCode::Char(c.to_ascii_uppercase())
            }
            (Some(c), _) => KeyCode::Char(c),
            (None, Some(n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                KeyCode::F(n.parse().ok()?)
            }
            _ => return None,
        },
    };
    Some(Key { code, modifiers })
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn bind(key_list: &[String], action: Action, map: &mut HashMap<Key, Action>) {
    for k in key_list {
        match parse_key(k) {
            Some(key) => {
                map.insert(key, action);
            }
            None => log::warn!("ignoring unparsable key binding {k:?} for {action:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Key {
        Key { code, modifiers }
    }

    #[test]
    fn parse_key_syntaxes() {
        assert_eq!(
            parse_key("Ctrl+a"),
            Some(key(KeyCode::Char('a'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_key("<c-d>"),
            Some(key(KeyCode::Char('d'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_key("Shift+j"),
            Some(key(KeyCode::Char('J'), KeyModifiers::SHIFT))
        );
        assert_eq!(
            parse_key("space"),
            Some(key(KeyCode::Char(' '), KeyModifiers::NONE))
        );
        assert_eq!(
            parse_key(" "),
            Some(key(KeyCode::Char(' '), KeyModifiers::NONE))
        );
        assert_eq!(parse_key("F5"), Some(key(KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(
            parse_key("PageDown"),
            Some(key(KeyCode::PageDown, KeyModifiers::NONE))
        );
        assert_eq!(parse_key("<x-a>"), None);
        assert_eq!(parse_key("nonsense"), None);
    }

    #[test]
    fn default_keymap_lookups() {
        let config = Config::default();
        let keymap = Keymap::from_config(&config);

        let press = |code, modifiers| keymap.lookup(KeyEvent::new(code, modifiers));

        assert_eq!(
            press(KeyCode::Char('j'), KeyModifiers::NONE),
            Some(Action::Nav(NavAction::GoDown))
        );
        assert_eq!(
            press(KeyCode::Char('J'), KeyModifiers::SHIFT),
            Some(Action::Select(SelectAction::ExtendDown))
        );
        assert_eq!(
            press(KeyCode::Char('G'), KeyModifiers::SHIFT),
            Some(Action::Nav(NavAction::GoToBottom))
        );
        assert_eq!(
            press(KeyCode::Char('3'), KeyModifiers::NONE),
            Some(Action::Table(TableAction::SortBy(ColumnKind::Size)))
        );
        assert_eq!(
            press(KeyCode::Char(' '), KeyModifiers::NONE),
            Some(Action::Select(SelectAction::Toggle))
        );
        assert_eq!(
            press(KeyCode::Enter, KeyModifiers::NONE),
            Some(Action::Table(TableAction::Open))
        );
        assert_eq!(press(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }
}
