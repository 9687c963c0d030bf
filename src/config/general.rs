//! The general configuration settings for tau.
//!
//! This module defines the [General] struct for deserializing the `[general]` section of the
//! tau.toml configuration file: how listings are filtered and ordered.

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct General {
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
}

impl Default for General {
    fn default() -> Self {
        General {
            dirs_first: true,
            show_hidden: true,
            case_insensitive: true,
        }
    }
}

impl General {
    #[inline]
    pub fn dirs_first(&self) -> bool {
        self.dirs_first
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[inline]
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}
