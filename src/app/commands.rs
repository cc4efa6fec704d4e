//! Command surface — the binding layer scripts and operators talk to.
//!
//! One text line is one command.  The vocabulary is the one existing
//! scripts already use:
//!
//! | Line                     | Command                             |
//! |--------------------------|-------------------------------------|
//! | `set_freq 1000`          | [`PwmCommand::SetFrequency`]        |
//! | `get_freq`               | [`PwmCommand::GetFrequency`]        |
//! | `sleep 1` / `is_sleep`   | [`PwmCommand::Sleep`] / query       |
//! | `invert 0` / `is_invert` | [`PwmCommand::Invert`] / query      |
//! | `open_drn 1` / `is_open_drn` | [`PwmCommand::OpenDrain`] / query |
//! | `restart`                | [`PwmCommand::Restart`]             |
//! | `ch_val 5 30` / `ch_val 5` | set / get by channel number       |
//! | `SGN1 = 30` / `SGN1`     | set / get by channel name           |
//!
//! Parsing never touches the bus.  Unknown channel names are *not* parse
//! errors: they resolve to a no-op write or a `nil` read, the same as an
//! out-of-range channel number.

use core::fmt;

use heapless::String;

use crate::channels::ChannelRef;
use crate::error::Result;

use super::controller::PwmController;
use super::ports::BusTransport;

/// Longest channel name kept by the parser.
pub const MAX_NAME_LEN: usize = 16;

/// Channel selector as written on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(i32),
    Name(String<MAX_NAME_LEN>),
}

impl Target {
    fn channel_ref(&self) -> ChannelRef<'_> {
        match self {
            Self::Index(ch) => ChannelRef::Index(*ch),
            Self::Name(name) => ChannelRef::Name(name.as_str()),
        }
    }
}

/// Commands accepted by [`PwmController::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum PwmCommand {
    SetFrequency(u32),
    GetFrequency,
    Sleep(bool),
    IsSleeping,
    Invert(bool),
    IsInverted,
    OpenDrain(bool),
    IsOpenDrain,
    Restart,
    /// Write a percentage to a channel.
    Set { target: Target, percent: f32 },
    /// Read a channel's percentage.
    Get(Target),
}

/// Outcome of a successfully executed command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    Done,
    Frequency(u32),
    Flag(bool),
    /// `None` when the channel does not exist.
    Percent(Option<f32>),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "ok"),
            Self::Frequency(hz) => write!(f, "{hz}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Percent(Some(pct)) => write!(f, "{pct:.2}"),
            Self::Percent(None) => write!(f, "nil"),
        }
    }
}

/// Why a line could not be turned into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand,
    MissingArgument,
    BadNumber,
    BadFlag,
    TrailingInput,
    NameTooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingArgument => write!(f, "missing argument"),
            Self::BadNumber => write!(f, "expected a number"),
            Self::BadFlag => write!(f, "expected a boolean"),
            Self::TrailingInput => write!(f, "unexpected trailing input"),
            Self::NameTooLong => write!(f, "channel name too long"),
        }
    }
}

impl core::error::Error for ParseError {}

impl PwmCommand {
    /// Parse one command line.  Surrounding whitespace is ignored.
    pub fn parse(line: &str) -> core::result::Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        // `NAME = value` assignment form.
        if let Some((lhs, rhs)) = line.split_once('=') {
            let target = parse_target(lhs.trim())?;
            let percent = parse_percent(single(rhs)?)?;
            return Ok(Self::Set { target, percent });
        }

        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseError::Empty)?;
        let arg = words.next();
        let extra = words.next();

        let cmd = match head {
            "set_freq" => Self::SetFrequency(parse_frequency(arg)?),
            "get_freq" => no_arg(arg, Self::GetFrequency)?,
            "sleep" => Self::Sleep(parse_flag(arg)?),
            "is_sleep" => no_arg(arg, Self::IsSleeping)?,
            "invert" => Self::Invert(parse_flag(arg)?),
            "is_invert" => no_arg(arg, Self::IsInverted)?,
            "open_drn" => Self::OpenDrain(parse_flag(arg)?),
            "is_open_drn" => no_arg(arg, Self::IsOpenDrain)?,
            "restart" => no_arg(arg, Self::Restart)?,
            "ch_val" => {
                let ch = arg.ok_or(ParseError::MissingArgument)?;
                let target = Target::Index(ch.parse().map_err(|_| ParseError::BadNumber)?);
                return match (extra, words.next()) {
                    (None, _) => Ok(Self::Get(target)),
                    (Some(v), None) => Ok(Self::Set {
                        target,
                        percent: parse_percent(v)?,
                    }),
                    (Some(_), Some(_)) => Err(ParseError::TrailingInput),
                };
            }
            name if arg.is_none() && is_identifier(name) => Self::Get(parse_target(name)?),
            _ => return Err(ParseError::UnknownCommand),
        };

        if extra.is_some() {
            return Err(ParseError::TrailingInput);
        }
        Ok(cmd)
    }
}

fn single(text: &str) -> core::result::Result<&str, ParseError> {
    let mut words = text.split_whitespace();
    let word = words.next().ok_or(ParseError::MissingArgument)?;
    if words.next().is_some() {
        return Err(ParseError::TrailingInput);
    }
    Ok(word)
}

fn no_arg(arg: Option<&str>, cmd: PwmCommand) -> core::result::Result<PwmCommand, ParseError> {
    match arg {
        None => Ok(cmd),
        Some(_) => Err(ParseError::TrailingInput),
    }
}

fn is_identifier(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_target(text: &str) -> core::result::Result<Target, ParseError> {
    if let Ok(ch) = text.parse::<i32>() {
        return Ok(Target::Index(ch));
    }
    if !is_identifier(text) {
        return Err(ParseError::UnknownCommand);
    }
    let name = String::try_from(text).map_err(|_| ParseError::NameTooLong)?;
    Ok(Target::Name(name))
}

fn parse_percent(text: &str) -> core::result::Result<f32, ParseError> {
    let pct: f32 = text.parse().map_err(|_| ParseError::BadNumber)?;
    if pct.is_nan() {
        return Err(ParseError::BadNumber);
    }
    Ok(pct)
}

fn parse_frequency(arg: Option<&str>) -> core::result::Result<u32, ParseError> {
    arg.ok_or(ParseError::MissingArgument)?
        .parse()
        .map_err(|_| ParseError::BadNumber)
}

fn parse_flag(arg: Option<&str>) -> core::result::Result<bool, ParseError> {
    match arg.ok_or(ParseError::MissingArgument)? {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(ParseError::BadFlag),
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatch
// ───────────────────────────────────────────────────────────────

impl<T: BusTransport> PwmController<T> {
    /// Run one command against the device.
    pub fn execute(&mut self, cmd: &PwmCommand) -> Result<Reply> {
        Ok(match cmd {
            PwmCommand::SetFrequency(hz) => {
                self.set_frequency(*hz)?;
                Reply::Done
            }
            PwmCommand::GetFrequency => Reply::Frequency(self.frequency()?),
            PwmCommand::Sleep(on) => {
                self.set_sleep(*on)?;
                Reply::Done
            }
            PwmCommand::IsSleeping => Reply::Flag(self.is_sleeping()?),
            PwmCommand::Invert(on) => {
                self.set_output_inverted(*on)?;
                Reply::Done
            }
            PwmCommand::IsInverted => Reply::Flag(self.is_output_inverted()?),
            PwmCommand::OpenDrain(on) => {
                self.set_open_drain(*on)?;
                Reply::Done
            }
            PwmCommand::IsOpenDrain => Reply::Flag(self.is_open_drain()?),
            PwmCommand::Restart => {
                self.restart()?;
                Reply::Done
            }
            PwmCommand::Set { target, percent } => {
                self.set_channel_percent(target.channel_ref(), *percent)?;
                Reply::Done
            }
            PwmCommand::Get(target) => Reply::Percent(self.channel_percent(target.channel_ref())?),
        })
    }
}
