//! Abstract syntax tree for the shell command language.
//!
//! The node kinds defined here mirror the POSIX shell grammar productions
//! named in spec §4.2. Nodes own their child lists and their redirection
//! buffers (including here-document bodies); they borrow nothing from the
//! lexer's token stream except the [`Location`]s that tag where they came
//! from.
//!
//! Two companion modules provide the rest of the public surface:
//! [`display`] implements [`std::fmt::Display`] for every node, and [`pretty`]
//! implements the indented multi-line tree dump that spec §9 asks for in
//! place of the original implementation's several ad hoc debug dumpers.

mod display;
pub mod pretty;

use crate::source::Location;
use std::cell::RefCell;
use std::rc::Rc;

/// One of the special, non-identifier parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpecialParam {
    /// `@`
    At,
    /// `*`
    Asterisk,
    /// `#`
    Number,
    /// `?`
    Question,
    /// `-`
    Hyphen,
    /// `$`
    Dollar,
    /// `!`
    Exclamation,
    /// `0`
    Zero,
}

impl SpecialParam {
    pub fn char(self) -> char {
        match self {
            SpecialParam::At => '@',
            SpecialParam::Asterisk => '*',
            SpecialParam::Number => '#',
            SpecialParam::Question => '?',
            SpecialParam::Hyphen => '-',
            SpecialParam::Dollar => '$',
            SpecialParam::Exclamation => '!',
            SpecialParam::Zero => '0',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
                '@' => SpecialParam::At,
                '*' => SpecialParam::Asterisk,
                '#' => SpecialParam::Number,
                '?' => SpecialParam::Question,
                '-' => SpecialParam::Hyphen,
                '$' => SpecialParam::Dollar,
                '!' => SpecialParam::Exclamation,
                '0' => SpecialParam::Zero,
                _ => return None,
            })
    }
}

/// What kind of parameter a [`Param`] refers to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ParamName {
    /// An ordinary variable name.
    Variable(String),
    /// A special parameter such as `@` or `#`.
    Special(SpecialParam),
    /// A positional parameter, `$1`, `$2`, etc. Index `0` never occurs here
    /// (it parses as [`SpecialParam::Zero`] instead).
    Positional(usize),
}

/// A parameter reference, with its literal spelling preserved for
/// re-serialization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    /// Literal spelling as it appeared in the source, e.g. `"foo"`, `"@"`,
    /// `"12"`.
    pub id: String,
    pub name: ParamName,
}

impl Param {
    pub fn parse(id: &str) -> Self {
        let name = if let Ok(n) = id.parse::<usize>() {
            if n == 0 {
                ParamName::Special(SpecialParam::Zero)
            } else {
                ParamName::Positional(n)
            }
        } else if id.chars().count() == 1 {
            let c = id.chars().next().unwrap();
            match SpecialParam::from_char(c) {
                Some(sp) => ParamName::Special(sp),
                None => ParamName::Variable(id.to_string()),
            }
        } else {
            ParamName::Variable(id.to_string())
        };
        Param {
            id: id.to_string(),
            name,
        }
    }
}

/// Which side of `:-`-style switches the parser saw.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchKind {
    /// `-` use default if unset
    UseDefault,
    /// `=` assign default if unset
    AssignDefault,
    /// `?` error if unset
    IndicateError,
    /// `+` use alternate if set
    UseAlternate,
}

/// A `${name[:]-word}`-style modifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Switch {
    pub kind: SwitchKind,
    /// Whether a `:` preceded the switch character, making it also trigger
    /// on an empty (not just unset) value.
    pub colon: bool,
    pub word: Word,
}

/// Which end of the value a [`Trim`] removes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimSide {
    Prefix,
    Suffix,
}

/// How greedily a [`Trim`]'s pattern matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimGreed {
    Shortest,
    Longest,
}

/// A `${name#pattern}`-style modifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trim {
    pub side: TrimSide,
    pub greed: TrimGreed,
    pub pattern: Word,
}

/// The modifier attached to a parameter expansion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    None,
    /// `${#name}`
    Length,
    Switch(Switch),
    Trim(Trim),
}

/// Shared, lazily filled content of a here-document.
///
/// The redirection node that owns a `<<`/`<<-` operator and the pending
/// heredoc descriptor the lexer tracks while scanning both point at the same
/// cell; the lexer fills it in once it reads the body at the next newline.
#[derive(Debug, Default)]
pub struct HereDocCell(pub RefCell<Option<Word>>);

impl PartialEq for HereDocCell {
    fn eq(&self, other: &Self) -> bool {
        *self.0.borrow() == *other.0.borrow()
    }
}
impl Eq for HereDocCell {}

/// The content kind a [`Redirection`] produces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirTarget {
    /// A path operand, for `<`, `>`, `>>`, `<>`, `>|`.
    File(Word),
    /// A numeric fd operand, for `<&N` / `>&N`.
    Fd(i32),
    /// The operand was `-`: close the file descriptor.
    Close,
    /// `<<` / `<<-` here-document body.
    HereDoc {
        delimiter: String,
        /// Whether the delimiter was quoted in the source, which suppresses
        /// expansion of the body.
        quoted: bool,
        strip_tabs: bool,
        cell: Rc<HereDocCell>,
    },
}

/// Redirection operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    In,
    Out,
    Append,
    InOut,
    Clobber,
    DupIn,
    DupOut,
    HereDoc,
    HereDocStrip,
}

impl RedirOp {
    /// The default fd an operator targets when no explicit `io_number`
    /// precedes it.
    pub fn default_fd(self) -> i32 {
        use RedirOp::*;
        match self {
            In | InOut | DupIn | HereDoc | HereDocStrip => 0,
            Out | Append | Clobber | DupOut => 1,
        }
    }
}

/// A single redirection. Exactly one `target` kind is populated
/// per redirection, enforced by `target`'s type rather than by invariant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redirection {
    /// Explicit left-hand fd, if a preceding io_number was attached.
    pub io_number: Option<i32>,
    pub op: RedirOp,
    pub target: RedirTarget,
    pub location: Location,
}

impl Redirection {
    pub fn fd(&self) -> i32 {
        self.io_number.unwrap_or_else(|| self.op.default_fd())
    }
}

/// Element of a [`Word`]: a fragment that records whether its
/// surrounding context was quoted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordPart {
    pub kind: WordPartKind,
    /// True if this part appeared inside single or double quotes (or is
        /// itself a quote construct); drives field-splitting and pathname
    /// expansion suppression in the expander.
    pub quoted: bool,
    pub location: Location,
}

/// The kind of a [`WordPart`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordPartKind {
    /// Plain text, taken verbatim.
    Literal(String),
    /// `'...'`: copied literally, no escapes recognized.
    SingleQuoted(String),
    /// `"..."`: a nested sequence of word parts, only `$`, `` ` `` and
    /// backslash-escapes of `$ \` \" \\` newline are special inside.
    DoubleQuoted(Vec<WordPart>),
    /// A parameter reference, braced or bare.
    Parameter { param: Param, modifier: Modifier },
    /// `$(...)` or `` `...` ``.
    CommandSubst {
        /// Raw, unparsed command text.
        content: Rc<str>,
        backquoted: bool,
    },
    /// `$((...))`.
    Arithmetic { content: Rc<str> },
    /// An unquoted leading `~` or `~name` tilde prefix. The string does not
    /// include the tilde itself.
    Tilde(String),
}

/// A word: the unit of syntax that can carry quotes, tildes and expansions
///.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    pub parts: Vec<WordPart>,
    pub location: Location,
}

impl Word {
    /// Creates a word consisting of a single unquoted literal part. Useful
    /// in tests and for synthesizing words the parser did not directly read
    /// from source (e.g. a default `IFS` value).
    pub fn from_literal(text: impl Into<String>, location: Location) -> Self {
        let text = text.into();
        Word {
            parts: vec![WordPart {
                    kind: WordPartKind::Literal(text),
                    quoted: false,
                    location: location.clone(),
                }],
            location,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the word as a literal string if every part is literal (not
        /// quoted, not an expansion); used to recognize reserved words and
    /// assignment candidates.
    pub fn as_raw_literal(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match &part.kind {
                WordPartKind::Literal(s) if !part.quoted => out.push_str(s),
                _ => return None,
            }
        }
        Some(out)
    }
}

/// The value assigned by an [`Assign`] (spec: non-goals exclude arrays, so
    /// only a scalar word is supported).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: Word,
    pub location: Location,
}

/// `SimpleCommand(words, assignments, redirections)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleCommand {
    pub assigns: Vec<Assign>,
    pub words: Vec<Word>,
    pub redirs: Vec<Redirection>,
    pub location: Location,
}

impl SimpleCommand {
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }
}

/// `elif-then` clause of an `If` compound command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Elif {
    pub condition: CommandList,
    pub body: CommandList,
}

/// What to do after executing a `case` item's body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseAction {
    /// `;;`: stop after this item.
    Break,
    /// `;&`: fall through unconditionally into the next item's body.
    FallThrough,
}

/// One branch of a `Case` compound command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    pub patterns: Vec<Word>,
    pub body: CommandList,
    pub action: CaseAction,
}

/// The compound command kinds named in spec §3.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundKind {
    Subshell(CommandList),
    BraceGroup(CommandList),
    If {
        condition: CommandList,
        body: CommandList,
        elifs: Vec<Elif>,
        r#else: Option<CommandList>,
    },
    While {
        condition: CommandList,
        body: CommandList,
    },
    Until {
        condition: CommandList,
        body: CommandList,
    },
    For {
        var: String,
        /// `None` means "iterate over the positional parameters".
        words: Option<Vec<Word>>,
        body: CommandList,
    },
    Case {
        word: Word,
        items: Vec<CaseItem>,
    },
}

/// A compound command together with any redirections attached to it (spec
    /// §3's `RedirectedCommand` wrapper, folded in here since every compound
    /// command may carry redirections that apply to the whole construct).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompoundCommand {
    pub kind: CompoundKind,
    pub redirs: Vec<Redirection>,
    pub location: Location,
}

/// `NAME () compound_command [redirect_list]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub body: Rc<CompoundCommand>,
    pub location: Location,
}

/// Element of a pipe sequence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound(CompoundCommand),
    Function(FunctionDef),
}

impl Command {
    pub fn location(&self) -> &Location {
        match self {
            Command::Simple(c) => &c.location,
            Command::Compound(c) => &c.location,
            Command::Function(f) => &f.location,
        }
    }
}

/// `Pipeline(commands, negated)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// At least one command; reference counted so pipeline stages can be
    /// forked without cloning the AST.
    pub commands: Vec<Rc<Command>>,
    pub negated: bool,
}

/// `&&` / `||`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOrOp {
    And,
    Or,
}

/// `AndOrList(left, right, op)` generalized to a chain, as the grammar
/// actually produces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOrOp, Pipeline)>,
}

/// How an [`Item`] is separated from the next one in a [`CommandList`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Separator {
    /// `;`
    Sequential,
    /// `&`
    Background,
    /// No separator token followed (end of input or start of a nested list).
    End,
}

/// One element of a [`CommandList`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    pub and_or: Rc<AndOrList>,
    pub sep: Separator,
}

/// `CommandList(items, separators)`.
///
/// Invariant: `items.len() == separators.len()` is implicit here
/// since each [`Item`] carries its own separator; the last item's separator
/// is `Separator::End` unless the source text ended with `&`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandList(pub Vec<Item>);

impl CommandList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks the invariant spec §8 requires of a complete command list:
    /// the last separator is `End` unless the source ended with `&`.
    pub fn check_invariant(&self) -> bool {
        match self.0.last() {
            None => true,
            Some(item) => !matches!(item.sep, Separator::Sequential),
        }
    }
}
