//! Line-oriented command interpreter driving an [`MTree`] of integers.
//!
//! The input is a whitespace separated token stream: the number of initial
//! keys, the keys themselves (ascending), the fan-out, the number of commands
//! and then one command per opcode character:
//!
//! ```text
//! I <value>   insert
//! R <value>   remove
//! F <value>   look up
//! B           rebuild
//! ```
//!
//! Any other opcode prints `Invalid command!` and consumes nothing but its own
//! character. After the last command the tree contents are printed.

use crate::mtree::{MTree, MTreeError};
use log::{debug, info, trace};
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

pub type Key = i64;

pub const DEFAULT_WRAP: usize = 20;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("expected {expected}, found {token:?}")]
    InvalidInteger {
        expected: &'static str,
        token: String,
    },

    #[error(transparent)]
    Tree(#[from] MTreeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which traversal answers `F` commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Lookup {
    /// Visit every leaf.
    #[default]
    Exhaustive,
    /// Descend along separators.
    Pruned,
}

#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub lookup: Lookup,
    /// Values printed per line of the final list.
    pub wrap: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            lookup: Lookup::default(),
            wrap: DEFAULT_WRAP,
        }
    }
}

/// Reads tokens the way formatted stream extraction does: single characters
/// and integers, each after skipping leading whitespace.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    pub fn next_char(&mut self, expected: &'static str) -> Result<char, ConsoleError> {
        self.skip_whitespace();
        let c = self
            .rest()
            .chars()
            .next()
            .ok_or(ConsoleError::UnexpectedEof { expected })?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    /// An optional sign followed by decimal digits. Stops at the first byte
    /// that cannot continue the number, which stays in the stream.
    pub fn next_integer<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ConsoleError> {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.is_empty() {
            return Err(ConsoleError::UnexpectedEof { expected });
        }

        let bytes = rest.as_bytes();
        let sign = usize::from(matches!(bytes[0], b'+' | b'-'));
        let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
        let number = &rest[..sign + digits];

        match number.parse::<T>() {
            Ok(value) if digits > 0 => {
                self.pos += number.len();
                Ok(value)
            }
            _ => {
                let token = rest.split_whitespace().next().unwrap_or(rest);
                Err(ConsoleError::InvalidInteger {
                    expected,
                    token: token.to_string(),
                })
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Insert(Key),
    Remove(Key),
    Find(Key),
    Rebuild,
    Invalid(char),
}

impl Command {
    pub fn parse(scanner: &mut Scanner<'_>) -> Result<Self, ConsoleError> {
        let command = match scanner.next_char("a command")? {
            'I' => Command::Insert(scanner.next_integer("a value to insert")?),
            'R' => Command::Remove(scanner.next_integer("a value to remove")?),
            'F' => Command::Find(scanner.next_integer("a value to find")?),
            'B' => Command::Rebuild,
            other => Command::Invalid(other),
        };
        Ok(command)
    }
}

/// A tree plus the sink its command replies are written to.
pub struct Session<W: Write> {
    tree: MTree<Key>,
    config: ConsoleConfig,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(tree: MTree<Key>, config: ConsoleConfig, out: W) -> Self {
        Session { tree, config, out }
    }

    pub fn tree(&self) -> &MTree<Key> {
        &self.tree
    }

    pub fn into_tree(self) -> MTree<Key> {
        self.tree
    }

    pub fn execute(&mut self, command: Command) -> Result<(), ConsoleError> {
        debug!("executing {:?}", command);

        match command {
            Command::Insert(value) => {
                if self.tree.insert(value) {
                    writeln!(self.out, "The value = {} has been inserted.", value)?;
                } else {
                    writeln!(self.out, "The value = {} already in the tree.", value)?;
                }
            }
            Command::Remove(value) => match self.tree.remove(&value) {
                Ok(()) => writeln!(self.out, "The value = {} has been removed.", value)?,
                Err(MTreeError::KeyNotFound) => writeln!(self.out, "The value = {} not found.", value)?,
                Err(e) => return Err(e.into()),
            },
            Command::Find(value) => {
                let found = match self.config.lookup {
                    Lookup::Exhaustive => self.tree.find(&value),
                    Lookup::Pruned => self.tree.search(&value),
                };
                if found {
                    writeln!(self.out, "The element with value = {} was found.", value)?;
                } else {
                    writeln!(self.out, "The element with value = {} not found.", value)?;
                }
            }
            Command::Rebuild => {
                self.tree.rebuild();
                writeln!(self.out, "The tree has been rebuilt.")?;
            }
            Command::Invalid(opcode) => {
                trace!("unknown opcode {:?}", opcode);
                writeln!(self.out, "Invalid command!")?;
            }
        }

        Ok(())
    }

    pub fn write_final_list(&mut self) -> Result<(), ConsoleError> {
        write!(self.out, "Final list: ")?;

        let wrap = self.config.wrap.max(1);
        let len = self.tree.len();
        for (i, value) in self.tree.iter().enumerate() {
            write!(self.out, "{}", value)?;
            if i + 1 == len {
                break;
            }
            if (i + 1) % wrap == 0 {
                writeln!(self.out)?;
            } else {
                write!(self.out, " ")?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()?;

        Ok(())
    }
}

/// Runs a whole script: builds the initial tree, executes every command and
/// prints the final list. Returns the tree as it stands at the end.
pub fn run<W: Write>(input: &str, config: ConsoleConfig, out: W) -> Result<MTree<Key>, ConsoleError> {
    let mut scanner = Scanner::new(input);

    let count: usize = scanner.next_integer("the number of initial values")?;
    // the count is untrusted, let the key list grow as keys arrive
    let mut keys = Vec::new();
    for _ in 0..count {
        keys.push(scanner.next_integer("an initial value")?);
    }

    let fan_out: usize = scanner.next_integer("the fan-out M")?;
    let tree = MTree::from_sorted(fan_out, keys)?;
    info!("built tree of {} keys with fan-out {}", tree.len(), fan_out);

    let mut session = Session::new(tree, config, out);

    let commands: usize = scanner.next_integer("the number of commands")?;
    for _ in 0..commands {
        let command = Command::parse(&mut scanner)?;
        session.execute(command)?;
    }

    session.write_final_list()?;
    Ok(session.into_tree())
}
