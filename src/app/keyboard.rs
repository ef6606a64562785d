//! Line-based keyboard source for terminal play
//!
//! Each stdin line is replayed as keystrokes. `/start` asks the authority
//! to start the game and `<` stands in for Backspace.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::game::{InputEvent, KeyInput};

/// Command line that requests the game start
pub const START_COMMAND: &str = "/start";

/// Stand-in for Backspace on a line terminal
pub const BACKSPACE_CHAR: char = '<';

/// Translate one input line into session input events
pub fn parse_line(line: &str) -> Vec<InputEvent> {
    let line = line.trim();
    if line == START_COMMAND {
        return vec![InputEvent::StartRequested];
    }
    line.chars()
        .map(|c| match c {
            BACKSPACE_CHAR => InputEvent::Key(KeyInput::Backspace),
            c => InputEvent::Key(KeyInput::Char(c)),
        })
        .collect()
}

/// Forward lines from `reader` until it ends or the session goes away
pub async fn pump_lines<R>(reader: R, input_tx: mpsc::Sender<InputEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Keyboard input ended");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Keyboard read failed");
                return;
            }
        };
        for event in parse_line(&line) {
            if input_tx.send(event).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(" /start \n"), vec![InputEvent::StartRequested]);
        assert_eq!(
            parse_line("ab<"),
            vec![
                InputEvent::Key(KeyInput::Char('a')),
                InputEvent::Key(KeyInput::Char('b')),
                InputEvent::Key(KeyInput::Backspace),
            ]
        );
        assert!(parse_line("").is_empty());
    }

    #[tokio::test]
    async fn test_pump_lines_forwards_until_eof() {
        let (tx, mut rx) = mpsc::channel(16);
        pump_lines(&b"go\n/start\n"[..], tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                InputEvent::Key(KeyInput::Char('g')),
                InputEvent::Key(KeyInput::Char('o')),
                InputEvent::StartRequested,
            ]
        );
    }
}
