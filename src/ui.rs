// UI layer: the terminal the workflows talk to. `Console` is the real
// terminal (crossterm for screen control, dialoguer for prompts); tests use
// a scripted implementation of the same trait.

use crate::api::Credentials;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

/// Everything an interactive workflow needs from the operator's terminal.
pub trait Terminal {
    /// Sink for tables and notices.
    fn out(&mut self) -> &mut dyn Write;

    /// Wipe the screen before redrawing.
    fn clear(&mut self) -> io::Result<()>;

    /// Ask for a 1-based row number. `None` means the operator gave up.
    fn pick_row(&mut self) -> io::Result<Option<usize>>;

    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;

    fn supports_color(&self) -> bool {
        false
    }
}

pub struct Console {
    stdout: io::Stdout,
    color: bool,
}

impl Console {
    pub fn new() -> Self {
        let stdout = io::stdout();
        let color = stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Console { stdout, color }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for Console {
    fn out(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    fn clear(&mut self) -> io::Result<()> {
        if !self.stdout.is_terminal() {
            return Ok(());
        }
        execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn pick_row(&mut self) -> io::Result<Option<usize>> {
        self.stdout.flush()?;
        let answer = Input::<String>::new()
            .with_prompt("Select quota (Ctrl-C to exit)")
            .allow_empty(true)
            .validate_with(|s: &String| -> Result<(), &'static str> {
                if s.trim().chars().all(|c| c.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err("enter a row number")
                }
            })
            .interact_text();
        match answer {
            Ok(s) if s.trim().is_empty() => Ok(None),
            Ok(s) => Ok(s.trim().parse().ok()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.stdout.flush()?;
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(yes) => Ok(yes),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn supports_color(&self) -> bool {
        self.color
    }
}

/// Ask for username and password. Returns `None` when either is left empty.
pub fn prompt_credentials(default_username: Option<&str>) -> io::Result<Option<Credentials>> {
    let mut input = Input::<String>::new();
    input.with_prompt("Username").allow_empty(true);
    if let Some(name) = default_username {
        input.default(name.to_string());
    }
    let username = input.interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?;

    if username.trim().is_empty() || password.is_empty() {
        return Ok(None);
    }
    Ok(Some(Credentials { username: username.trim().to_string(), password }))
}

/// Spinner shown while a slow remote call is in flight.
pub fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
