//! Command-line front end

mod args;
pub mod render;

pub use args::{Args, Cmd, ConfigCmd, KeysCmd};

use std::io::{self, BufRead, Read, Write};
use std::path::Path;

/// Ask a yes/no question on the terminal; anything but `y`/`yes` is no
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

pub fn prompt(label: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", label)?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Import text from a file, or stdin when no path is given
pub fn read_import_text(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
