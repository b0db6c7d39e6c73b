//! Device-profile command sets and the locate-device grammar

use std::collections::BTreeMap;

use crate::{Error, Result};

/// Fixed leading token of the locate-device command family
pub const LOCATE_PREFIX: &str = "find_my_instrument_";

/// LED color of a locate-device command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateColor {
    Red,
    Green,
}

impl LocateColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocateColor::Red => "red",
            LocateColor::Green => "green",
        }
    }
}

impl std::fmt::Display for LocateColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed locate-device command.
///
/// Wire shape: `find_my_instrument_{color}_{duration}_{count}` with
/// color in `{red, green}`, duration an unsigned integer or decimal
/// (seconds per blink), count an unsigned integer. The whole string
/// must match; trailing text is rejected.
///
/// This command family makes a device blink its status LED to
/// physically identify itself, and is accepted by the hub regardless
/// of the device profile's declared command set.
#[derive(Debug, Clone, PartialEq)]
pub struct LocateCommand {
    pub color: LocateColor,
    pub duration_secs: f64,
    pub count: u32,
}

impl LocateCommand {
    pub fn new(color: LocateColor, duration_secs: f64, count: u32) -> Self {
        Self {
            color,
            duration_secs,
            count,
        }
    }

    /// Parse a command string against the locate grammar.
    ///
    /// Returns `None` for anything that is not a complete, well-formed
    /// locate command; such input falls through to profile validation.
    pub fn parse(command: &str) -> Option<Self> {
        let rest = command.strip_prefix(LOCATE_PREFIX)?;

        let mut tokens = rest.split('_');
        let color = match tokens.next()? {
            "red" => LocateColor::Red,
            "green" => LocateColor::Green,
            _ => return None,
        };
        let duration = tokens.next()?;
        let count = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }

        if !is_decimal_token(duration) {
            return None;
        }
        let duration_secs = duration.parse().ok()?;

        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let count = count.parse().ok()?;

        Some(Self {
            color,
            duration_secs,
            count,
        })
    }
}

impl std::fmt::Display for LocateCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}_{}_{}",
            LOCATE_PREFIX, self.color, self.duration_secs, self.count
        )
    }
}

/// Integer or decimal: digits, optionally one dot with digits on both sides.
fn is_decimal_token(s: &str) -> bool {
    match s.split_once('.') {
        None => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        Some((whole, frac)) => {
            !whole.is_empty()
                && !frac.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// The command set declared by a device profile.
///
/// Profiles store commands as a single delimited string of
/// `command:description` pairs separated by `;`. An entry without the
/// `:` separator fails the whole parse; a corrupt profile must never
/// validate commands it cannot describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    entries: BTreeMap<String, String>,
}

impl CommandSet {
    /// Parse the delimited profile encoding.
    pub fn parse(encoded: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for pair in encoded.split(';') {
            let (command, description) = pair
                .split_once(':')
                .ok_or_else(|| Error::MalformedCommandSet(pair.to_string()))?;
            entries.insert(command.to_string(), description.to_string());
        }
        Ok(Self { entries })
    }

    /// Re-encode into the delimited profile format.
    pub fn to_delimited(&self) -> String {
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(command, description)| format!("{}:{}", command, description))
            .collect();
        pairs.join(";")
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(command)
    }

    /// Human-readable description for a command, if declared.
    pub fn description(&self, command: &str) -> Option<&str> {
        self.entries.get(command).map(|s| s.as_str())
    }

    pub fn insert(&mut self, command: impl Into<String>, description: impl Into<String>) {
        self.entries.insert(command.into(), description.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for CommandSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_decimal_duration() {
        let cmd = LocateCommand::parse("find_my_instrument_red_2.5_3").unwrap();
        assert_eq!(cmd.color, LocateColor::Red);
        assert_eq!(cmd.duration_secs, 2.5);
        assert_eq!(cmd.count, 3);
    }

    #[test]
    fn locate_integer_duration() {
        let cmd = LocateCommand::parse("find_my_instrument_green_1_10").unwrap();
        assert_eq!(cmd.color, LocateColor::Green);
        assert_eq!(cmd.duration_secs, 1.0);
        assert_eq!(cmd.count, 10);
    }

    #[test]
    fn locate_rejects_bad_tokens() {
        assert!(LocateCommand::parse("find_my_instrument_blue_1_1").is_none());
        assert!(LocateCommand::parse("find_my_instrument_red_1.5").is_none());
        assert!(LocateCommand::parse("find_my_instrument_red_1._1").is_none());
        assert!(LocateCommand::parse("find_my_instrument_red_.5_1").is_none());
        assert!(LocateCommand::parse("find_my_instrument_red_1_2.5").is_none());
        assert!(LocateCommand::parse("find_my_instrument_red_1_2_3").is_none());
        assert!(LocateCommand::parse("tare").is_none());
    }

    #[test]
    fn locate_rejects_trailing_garbage() {
        // the reference regex was unanchored; the grammar is strict
        assert!(LocateCommand::parse("find_my_instrument_red_1_2x").is_none());
        assert!(LocateCommand::parse("find_my_instrument_red_1_2 ").is_none());
    }

    #[test]
    fn locate_round_trip() {
        let cmd = LocateCommand::new(LocateColor::Green, 0.5, 4);
        assert_eq!(
            LocateCommand::parse(&cmd.to_string()).unwrap(),
            cmd
        );
    }

    #[test]
    fn command_set_parse() {
        let set = CommandSet::parse("tare:Zero the scale;print:Print ticket").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("tare"));
        assert_eq!(set.description("print"), Some("Print ticket"));
        assert!(!set.contains("TARE"));
        assert!(!set.contains("tar"));
    }

    #[test]
    fn command_set_malformed_entry_is_hard_error() {
        assert!(CommandSet::parse("tare:Zero;badentry").is_err());
        assert!(CommandSet::parse("").is_err());
    }

    #[test]
    fn command_set_round_trip() {
        let set = CommandSet::parse("a:1;b:2;c:3").unwrap();
        assert_eq!(CommandSet::parse(&set.to_delimited()).unwrap(), set);
    }
}
