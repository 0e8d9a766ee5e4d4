//! Terminal stand-ins for the browser: navigation is logged, toasts and
//! views are printed.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use tastyshare_core::view::Node;
use tastyshare_core::{App, FieldError, Navigator, Redirect, ToastKind};

/// Records where the client asked to go instead of going there.
#[derive(Default)]
pub struct ShellNavigator {
    last: Mutex<Option<Redirect>>,
}

impl ShellNavigator {
    pub fn last(&self) -> Option<Redirect> {
        self.last.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Navigator for ShellNavigator {
    fn navigate(&self, redirect: Redirect) {
        tracing::info!(
            path = %redirect.path,
            delay_ms = redirect.delay.as_millis() as u64,
            "navigate"
        );
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(redirect);
    }
}

/// Print and clear the pending toast, if any.
pub fn flush_toast(app: &App) {
    if let Some(toast) = app.notifier().take() {
        let line = format!("[{}] {}", toast.kind.as_str(), toast.message);
        match toast.kind {
            ToastKind::Error | ToastKind::Warning => eprintln!("{}", line),
            ToastKind::Success | ToastKind::Info => println!("{}", line),
        }
    }
}

pub fn print_view(node: &Node) {
    let text = node.to_plain_text();
    let text = text.trim_end();
    if !text.is_empty() {
        println!("{}", text);
    }
}

pub fn print_field_errors(errors: &[FieldError]) {
    for error in errors {
        eprintln!("  {}: {}", error.field, error.message);
    }
}

/// Ask a yes/no question on the terminal. Anything but "y"/"yes" is no.
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
