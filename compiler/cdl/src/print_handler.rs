//! Destination of the predefined `Print` function.
//!
//! Hosts pick where printed text goes: the process's stdout, an in-memory
//! buffer they can read back, or nowhere. Dispatch is a plain `match` on the
//! enum; `Print` runs inside instruction execution and should not pay for a
//! vtable call.

use std::sync::Arc;

use parking_lot::Mutex;

pub enum PrintHandler {
    /// Writes to stdout (default).
    Stdout,
    /// Appends to a buffer readable with [`PrintHandler::output`].
    Buffer(Mutex<String>),
    /// Discards everything.
    Silent,
}

pub type SharedPrintHandler = Arc<PrintHandler>;

impl PrintHandler {
    pub fn stdout() -> SharedPrintHandler {
        Arc::new(PrintHandler::Stdout)
    }

    pub fn buffer() -> SharedPrintHandler {
        Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
    }

    pub fn silent() -> SharedPrintHandler {
        Arc::new(PrintHandler::Silent)
    }

    pub fn println(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => println!("{msg}"),
            PrintHandler::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    pub fn print(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => print!("{msg}"),
            PrintHandler::Buffer(buf) => buf.lock().push_str(msg),
            PrintHandler::Silent => {}
        }
    }

    /// Captured text so far. Empty for handlers that do not capture.
    pub fn output(&self) -> String {
        match self {
            PrintHandler::Buffer(buf) => buf.lock().clone(),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }

    /// Returns the captured text and empties the buffer.
    pub fn take_output(&self) -> String {
        match self {
            PrintHandler::Buffer(buf) => std::mem::take(&mut *buf.lock()),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let PrintHandler::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

impl std::fmt::Debug for PrintHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PrintHandler::Stdout => "PrintHandler::Stdout",
            PrintHandler::Buffer(_) => "PrintHandler::Buffer",
            PrintHandler::Silent => "PrintHandler::Silent",
        })
    }
}

#[cfg(test)]
mod tests;
