//! Command-line argument parsing and help for tau.
//!
//! This module handles all CLI flag parsing used for config initialization and help.
//!
//! When invoked with no args/flags (tau), tau simply launches the TUI in the current directory.

use crate::config::Config;

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    RunApp,
    RunAppAtPath(String),
    Exit,
}

pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().collect();
    parse_args(&args)
}

/// Interprets `args` (including the program name) and runs the flags that exit immediately.
pub fn parse_args(args: &[String]) -> CliAction {
    if args.len() < 2 {
        return CliAction::RunApp;
    }

    if args.len() > 2 {
        eprintln!("Error: tau accepts only one argument at a time.");
        eprintln!("Usage: tau [PATH] or tau [OPTION]");
        return CliAction::Exit;
    }

    match args[1].as_str() {
        "--version" | "-v" => {
            print_version();
            CliAction::Exit
        }
        "-h" | "--help" => {
            print_help();
            CliAction::Exit
        }
        "--config-help" => {
            print_config_help();
            CliAction::Exit
        }
        "--keybinds" | "--keybind" | "--key" => {
            print_keybinds();
            CliAction::Exit
        }
        "--init" => {
            if let Err(e) = Config::generate_default(&Config::default_path(), true) {
                eprintln!("Error: {}", e);
            }
            CliAction::Exit
        }
        "--init-full" => {
            if let Err(e) = Config::generate_default(&Config::default_path(), false) {
                eprintln!("Error: {}", e);
            }
            CliAction::Exit
        }
        arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
            CliAction::RunAppAtPath(arg.to_string())
        }
        arg => {
            eprintln!("Unknown argument: {}", arg);
            eprintln!("Try --help for available options");
            CliAction::Exit
        }
    }
}

fn print_version() {
    println!("tau {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"tau - A detail-view directory browser for the terminal

USAGE:
  tau [PATH]

PATH:
  Directory to open (defaults to current directory)

OPTIONS:
      --init              Generate a minimal default configuration
      --init-full         Generate the full configuration with all options
      --config-help       Display all the configuration options
      --keybinds          Display all the default keybinds
  -h, --help              Print help information
  -v, --version           Display the current installed version of tau

ENVIRONMENT:
  TAU_CONFIG              Override the default config path
  RUST_LOG                Enable logging to the tau.log file in the cache directory
"#
    );
}

const KEYBINDS_TEXT: &str = r##"
=========================
 Key Bindings
=========================
[keys]
  go_up                     ["k", "Up"]
  go_down                   ["j", "Down"]
  extend_up                 ["Shift+k", "Shift+Up"]
  extend_down               ["Shift+j", "Shift+Down"]
  toggle_select             ["space"]
  select_all                ["Ctrl+a"]
  clear_selection           ["Ctrl+c"]
  open                      ["Enter", "l", "Right"]
  go_parent                 ["h", "Left", "Backspace"]
  go_to_top                 ["g", "Home"]
  go_to_bottom              ["Shift+g", "End"]
  page_up                   ["PageUp", "Ctrl+u"]
  page_down                 ["PageDown", "Ctrl+d"]
  sort_name                 ["1"]
  sort_type                 ["2"]
  sort_size                 ["3"]
  reload                    ["r", "F5"]
  quit                      ["q", "Esc"]

  Mouse:
    Click a header           Sort by that column (again to reverse)
    Click a row              Select it (Ctrl toggles, Shift extends)
    Double click a row       Open it
    Wheel                    Scroll

  Syntax Reference:
    Modifiers: <c-x> (Ctrl), <m-x>/<a-x> (Alt/Meta), <s-x> (Shift)
    Standard:  ctrl+x, alt+x, shift+x, meta+x
    Special:   "space", "back", "enter", "esc", "tab", "home", "end", "pageup", "pagedown", "f1".."f12"

  Note:
    - Shorthand (c-, m-, s-) only works inside brackets <>.
"##;

fn print_keybinds() {
    println!("{}", KEYBINDS_TEXT);
}

fn print_config_help() {
    let help_text = r##"
tau - Full Configuration Guide (tau.toml)

=========================
 General Settings
=========================
[general]
  dirs_first                 Sort directories before files [default: true]
  show_hidden                Show hidden files (dotfiles) [default: true]
  case_insensitive           Ignore case when sorting by name [default: true]

=========================
 Table Settings
=========================
[table]
  columns                    Columns to show, any of "name", "type", "size" [default: all three]
  overscan_rows              Extra rows rendered above and below the viewport [default: 1]
  cell_padding               Columns of padding added to every cell [default: 2]
  size_units                 "decimal" (kB) or "binary" (KiB) [default: "decimal"]
  recursive_counts           Count every item below a directory, not just its children
  metadata_threads           Threads resolving item counts and types (1-16) [default: 2]
  auto_refresh_secs          Reload the listing every n seconds, 0 disables [default: 2]
  double_click_ms            Max delay between the clicks of a double click [default: 400]
  mouse                      Enable mouse support [default: true]
  scroll_padding             Rows kept visible around the cursor [default: 2]

=========================
 Editor
=========================
[editor]
  cmd                        Command used to open files [default: "nvim"]

=========================
 Key Bindings
=========================
[keys]
  See tau --keybinds for every action and its defaults.
  Each action takes a list of keys, e.g. go_down = ["j", "Down"]
"##;
    println!("{}", help_text);
}
