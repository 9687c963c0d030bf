//! main.rs
//! Entry point for tau

use tau_table::app::AppState;
use tau_table::config::Config;
use tau_table::core::terminal;
use tau_table::utils::cli::{CliAction, handle_args};
use tau_table::utils::{init_logging, resolve_initial_dir};

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::event::DisableMouseCapture,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        eprintln!("\n[tau] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let initial_path = match handle_args() {
        CliAction::Exit => return Ok(()),
        CliAction::RunApp => None,
        CliAction::RunAppAtPath(path_arg) => match resolve_initial_dir(&path_arg) {
            Ok(target) => Some(target),
            Err(e) => {
                eprintln!("\n[tau] Error: Path '{}' cannot be opened: {}", path_arg, e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = init_logging() {
        eprintln!("[tau] Logging disabled: {}", e);
    }

    let config = Config::load();

    let mut app = match initial_path {
        Some(path) => AppState::from_dir(&config, &path)?,
        None => AppState::new(&config)?,
    };
    terminal::run_terminal(&mut app, config.table().mouse())
}
