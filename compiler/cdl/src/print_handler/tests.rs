#![allow(clippy::unwrap_used, reason = "tests can panic")]

use super::*;

#[test]
fn buffer_captures_lines() {
    let handler = PrintHandler::buffer();
    handler.print("a");
    handler.print("b");
    handler.println("c");
    handler.println("d");
    assert_eq!(handler.output(), "abc\nd\n");
}

#[test]
fn take_output_drains_the_buffer() {
    let handler = PrintHandler::buffer();
    handler.println("once");
    assert_eq!(handler.take_output(), "once\n");
    assert_eq!(handler.output(), "");
}

#[test]
fn clear_empties_the_buffer() {
    let handler = PrintHandler::buffer();
    handler.println("x");
    handler.clear();
    assert!(handler.output().is_empty());
}

#[test]
fn silent_and_stdout_capture_nothing() {
    for handler in [PrintHandler::silent(), PrintHandler::stdout()] {
        handler.print("");
        handler.clear();
        assert_eq!(handler.output(), "");
        assert_eq!(handler.take_output(), "");
    }
}

#[test]
fn buffer_is_shared_across_threads() {
    let handler = PrintHandler::buffer();
    let other = Arc::clone(&handler);

    let worker = std::thread::spawn(move || {
        for _ in 0..50 {
            other.println("w");
        }
    });
    for _ in 0..50 {
        handler.println("m");
    }
    worker.join().unwrap();

    assert_eq!(handler.output().lines().count(), 100);
}
