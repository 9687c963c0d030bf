//! Input configuration options for tau
//!
//! This module defines the key bindings and the editor command which are read from the tau.toml
//! configuration file.

use serde::Deserialize;

/// Input configuration options of all actions
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Keys {
    go_up: Vec<String>,
    go_down: Vec<String>,
    extend_up: Vec<String>,
    extend_down: Vec<String>,
    toggle_select: Vec<String>,
    select_all: Vec<String>,
    clear_selection: Vec<String>,
    open: Vec<String>,
    go_parent: Vec<String>,
    go_to_top: Vec<String>,
    go_to_bottom: Vec<String>,
    page_up: Vec<String>,
    page_down: Vec<String>,
    sort_name: Vec<String>,
    sort_type: Vec<String>,
    sort_size: Vec<String>,
    reload: Vec<String>,
    quit: Vec<String>,
}

/// Editor configuration options
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Editor {
    cmd: String,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    go_up,
    go_down,
    extend_up,
    extend_down,
    toggle_select,
    select_all,
    clear_selection,
    open,
    go_parent,
    go_to_top,
    go_to_bottom,
    page_up,
    page_down,
    sort_name,
    sort_type,
    sort_size,
    reload,
    quit,
);

/// Default input configuration options
impl Default for Keys {
    fn default() -> Self {
        Keys {
            go_up: vec!["k".into(), "Up".into()],
            go_down: vec!["j".into(), "Down".into()],
            extend_up: vec!["Shift+k".into(), "Shift+Up".into()],
            extend_down: vec!["Shift+j".into(), "Shift+Down".into()],

            toggle_select: vec!["space".into()],
            select_all: vec!["Ctrl+a".into()],
            clear_selection: vec!["Ctrl+c".into()],

            open: vec!["Enter".into(), "l".into(), "Right".into()],
            go_parent: vec!["h".into(), "Left".into(), "Backspace".into()],

            go_to_top: vec!["g".into(), "Home".into()],
            go_to_bottom: vec!["Shift+g".into(), "End".into()],
            page_up: vec!["PageUp".into(), "Ctrl+u".into()],
            page_down: vec!["PageDown".into(), "Ctrl+d".into()],

            sort_name: vec!["1".into()],
            sort_type: vec!["2".into()],
            sort_size: vec!["3".into()],

            reload: vec!["r".into(), "F5".into()],
            quit: vec!["q".into(), "Esc".into()],
        }
    }
}

/// Public methods for accessing editor configuration options
impl Editor {
    #[inline]
    pub fn cmd(&self) -> &str {
        let trimmed = self.cmd.trim();
        if trimmed.is_empty() { "vim" } else { trimmed }
    }
}

/// Default editor configuration options
impl Default for Editor {
    fn default() -> Self {
        Editor { cmd: "nvim".into() }
    }
}
