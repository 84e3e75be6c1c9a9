//! Interactive input lines.
//!
//! Plain text is a text edit. Lines starting with `:` are commands.

use voxbridge_core::types::{EmergencyType, PhraseId};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the composed text and re-predict.
    Text(String),
    /// Choose the candidate at a 1-based position.
    Pick(usize),
    Speak,
    /// Dictate the next plain line through speech recognition.
    Listen,
    Add(String),
    Remove(PhraseId),
    Phrases,
    Recent,
    Sos(EmergencyType),
    Now,
    Cancel,
    Off,
    Share,
    Notify,
    Message(String),
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse a single line. Errors carry a message for the user.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Text(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "pick" | "p" => {
                let n: usize = arg
                    .parse()
                    .map_err(|_| format!("Usage: :pick N (got '{}')", arg))?;
                if n == 0 {
                    return Err("Candidates are numbered from 1".to_string());
                }
                Ok(Command::Pick(n))
            }
            "speak" | "say" => Ok(Command::Speak),
            "listen" | "dictate" => Ok(Command::Listen),
            "add" => {
                if arg.is_empty() {
                    return Err("Usage: :add <text>".to_string());
                }
                Ok(Command::Add(arg.to_string()))
            }
            "remove" | "rm" => arg
                .parse::<PhraseId>()
                .map(Command::Remove)
                .map_err(|e| format!("Invalid phrase id '{}': {}", arg, e)),
            "phrases" => Ok(Command::Phrases),
            "recent" => Ok(Command::Recent),
            "sos" => {
                if arg.is_empty() {
                    return Ok(Command::Sos(EmergencyType::default()));
                }
                arg.parse::<EmergencyType>().map(Command::Sos)
            }
            "now" => Ok(Command::Now),
            "cancel" => Ok(Command::Cancel),
            "off" => Ok(Command::Off),
            "share" => Ok(Command::Share),
            "notify" => Ok(Command::Notify),
            "message" | "msg" => {
                if arg.is_empty() {
                    return Err("Usage: :message <text>".to_string());
                }
                Ok(Command::Message(arg.to_string()))
            }
            "status" => Ok(Command::Status),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command ':{}' (try :help)", other)),
        }
    }
}

pub const HELP: &str = "\
Type text to see predictions. Commands:
  :pick N          choose candidate N
  :speak           speak the composed text
  :listen          dictate the next line as speech
  :add <text>      save a custom phrase
  :remove <id>     delete a custom phrase
  :phrases         list custom phrases
  :recent          list recently composed phrases
  :sos [type]      start an emergency (medical, police, fire, personal)
  :now             activate immediately
  :cancel          cancel the countdown
  :off             end an active emergency
  :share           share location now
  :notify          notify contacts now
  :message <text>  set the alert message
  :status          show the emergency session
  :quit            exit";
