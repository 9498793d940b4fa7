// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Classification of source lines into VM commands.

use crate::core::error::{Diagnostic, Severity, TranslateError, TranslateErrorKind};

/// Largest value an address instruction can load; bounds every index operand.
pub const MAX_CONSTANT: u16 = 32767;

/// Arithmetic and logic commands of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    And,
    Eq,
    Gt,
    Lt,
    Neg,
    Not,
    Or,
    Sub,
}

impl ArithOp {
    pub fn from_mnemonic(mnemonic: &str) -> Option<ArithOp> {
        match mnemonic {
            "add" => Some(ArithOp::Add),
            "and" => Some(ArithOp::And),
            "eq" => Some(ArithOp::Eq),
            "gt" => Some(ArithOp::Gt),
            "lt" => Some(ArithOp::Lt),
            "neg" => Some(ArithOp::Neg),
            "not" => Some(ArithOp::Not),
            "or" => Some(ArithOp::Or),
            "sub" => Some(ArithOp::Sub),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::And => "and",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::Neg => "neg",
            ArithOp::Not => "not",
            ArithOp::Or => "or",
            ArithOp::Sub => "sub",
        }
    }
}

/// Virtual memory segments addressable by push and pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Argument,
    Constant,
    Local,
    Pointer,
    Static,
    Temp,
    That,
    This,
}

impl Segment {
    /// All segments in listing order.
    pub const ALL: [Segment; 8] = [
        Segment::Argument,
        Segment::Constant,
        Segment::Local,
        Segment::Pointer,
        Segment::Static,
        Segment::Temp,
        Segment::That,
        Segment::This,
    ];

    pub fn from_name(name: &str) -> Option<Segment> {
        match name {
            "argument" => Some(Segment::Argument),
            "constant" => Some(Segment::Constant),
            "local" => Some(Segment::Local),
            "pointer" => Some(Segment::Pointer),
            "static" => Some(Segment::Static),
            "temp" => Some(Segment::Temp),
            "that" => Some(Segment::That),
            "this" => Some(Segment::This),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Segment::Argument => "argument",
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Pointer => "pointer",
            Segment::Static => "static",
            Segment::Temp => "temp",
            Segment::That => "that",
            Segment::This => "this",
        }
    }
}

/// One classified VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

/// Classification failure with the offending token position.
#[derive(Debug, Clone)]
pub struct CommandError {
    error: TranslateError,
    column: usize,
    help: Option<String>,
}

impl CommandError {
    fn new(kind: TranslateErrorKind, msg: &str, param: Option<&str>, column: usize) -> Self {
        Self {
            error: TranslateError::new(kind, msg, param),
            column,
            help: None,
        }
    }

    fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn error(&self) -> &TranslateError {
        &self.error
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub(crate) fn into_diagnostic(self, line: u32) -> Diagnostic {
        let mut diag = Diagnostic::new(line, Severity::Error, self.error)
            .with_column(Some(self.column));
        if let Some(help) = self.help {
            diag = diag.with_help(help);
        }
        diag
    }
}

/// Classify one source line. Blank lines and comment-only lines yield `None`.
pub fn classify(line: &str) -> Result<Option<VmCommand>, CommandError> {
    let code = strip_comment(line);
    let tokens = tokenize(code);
    let Some(command) = tokens.first() else {
        return Ok(None);
    };

    if let Some(op) = ArithOp::from_mnemonic(command.text) {
        expect_end(&tokens, 1)?;
        return Ok(Some(VmCommand::Arithmetic(op)));
    }

    match command.text {
        "push" => classify_push(&tokens),
        "pop" => classify_pop(&tokens),
        "label" => classify_branch(&tokens, "label", VmCommand::Label),
        "goto" => classify_branch(&tokens, "goto", VmCommand::Goto),
        "if-goto" => classify_branch(&tokens, "if-goto", VmCommand::IfGoto),
        "function" => classify_function(&tokens),
        "call" => classify_call(&tokens),
        "return" => {
            expect_end(&tokens, 1)?;
            Ok(Some(VmCommand::Return))
        }
        _ => Err(CommandError::new(
            TranslateErrorKind::Command,
            "Unknown command",
            Some(command.text),
            command.column,
        )),
    }
}

struct Token<'a> {
    text: &'a str,
    column: usize,
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn tokenize(code: &str) -> Vec<Token<'_>> {
    let bytes = code.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        tokens.push(Token {
            text: &code[start..pos],
            column: start + 1,
        });
    }
    tokens
}

fn classify_push(tokens: &[Token<'_>]) -> Result<Option<VmCommand>, CommandError> {
    let (segment, index) = segment_operands(tokens, "push")?;
    Ok(Some(VmCommand::Push { segment, index }))
}

fn classify_pop(tokens: &[Token<'_>]) -> Result<Option<VmCommand>, CommandError> {
    let (segment, index) = segment_operands(tokens, "pop")?;
    if segment == Segment::Constant {
        return Err(CommandError::new(
            TranslateErrorKind::Segment,
            "Cannot pop to the constant segment",
            None,
            tokens[1].column,
        )
        .with_help("constant is a virtual segment; its values are immediates"));
    }
    Ok(Some(VmCommand::Pop { segment, index }))
}

fn segment_operands(tokens: &[Token<'_>], mnemonic: &str) -> Result<(Segment, u16), CommandError> {
    let (Some(seg_token), Some(index_token)) = (tokens.get(1), tokens.get(2)) else {
        return Err(CommandError::new(
            TranslateErrorKind::Command,
            &format!("{mnemonic} expects a segment and an index"),
            None,
            tokens[0].column,
        ));
    };
    expect_end(tokens, 3)?;

    let Some(segment) = Segment::from_name(seg_token.text) else {
        return Err(CommandError::new(
            TranslateErrorKind::Segment,
            "Unknown segment",
            Some(seg_token.text),
            seg_token.column,
        )
        .with_help(format!("valid segments are {}", segment_names())));
    };
    let index = parse_count(index_token, "index")?;

    match segment {
        Segment::Temp if index > 7 => Err(CommandError::new(
            TranslateErrorKind::Operand,
            "Temp index out of range",
            Some(index_token.text),
            index_token.column,
        )
        .with_help("temp has eight cells, indices 0 through 7")),
        Segment::Pointer if index > 1 => Err(CommandError::new(
            TranslateErrorKind::Operand,
            "Pointer index out of range",
            Some(index_token.text),
            index_token.column,
        )
        .with_help("pointer 0 is THIS and pointer 1 is THAT")),
        _ => Ok((segment, index)),
    }
}

fn classify_branch(
    tokens: &[Token<'_>],
    mnemonic: &str,
    build: fn(String) -> VmCommand,
) -> Result<Option<VmCommand>, CommandError> {
    let Some(target) = tokens.get(1) else {
        return Err(CommandError::new(
            TranslateErrorKind::Command,
            &format!("{mnemonic} expects a target symbol"),
            None,
            tokens[0].column,
        ));
    };
    expect_end(tokens, 2)?;
    check_symbol(target)?;
    Ok(Some(build(target.text.to_string())))
}

fn classify_function(tokens: &[Token<'_>]) -> Result<Option<VmCommand>, CommandError> {
    let (Some(name), Some(count)) = (tokens.get(1), tokens.get(2)) else {
        return Err(CommandError::new(
            TranslateErrorKind::Command,
            "function expects a name and a local count",
            None,
            tokens[0].column,
        ));
    };
    expect_end(tokens, 3)?;
    check_symbol(name)?;
    let locals = parse_count(count, "local count")?;
    Ok(Some(VmCommand::Function {
        name: name.text.to_string(),
        locals,
    }))
}

fn classify_call(tokens: &[Token<'_>]) -> Result<Option<VmCommand>, CommandError> {
    let (Some(name), Some(count)) = (tokens.get(1), tokens.get(2)) else {
        return Err(CommandError::new(
            TranslateErrorKind::Command,
            "call expects a name and an argument count",
            None,
            tokens[0].column,
        ));
    };
    expect_end(tokens, 3)?;
    check_symbol(name)?;
    let args = parse_count(count, "argument count")?;
    Ok(Some(VmCommand::Call {
        name: name.text.to_string(),
        args,
    }))
}

fn expect_end(tokens: &[Token<'_>], arity: usize) -> Result<(), CommandError> {
    match tokens.get(arity) {
        Some(extra) => Err(CommandError::new(
            TranslateErrorKind::Command,
            "Unexpected token after command",
            Some(extra.text),
            extra.column,
        )),
        None => Ok(()),
    }
}

fn parse_count(token: &Token<'_>, what: &str) -> Result<u16, CommandError> {
    let parsed = token
        .text
        .parse::<u16>()
        .ok()
        .filter(|value| *value <= MAX_CONSTANT);
    match parsed {
        Some(value) => Ok(value),
        None => Err(CommandError::new(
            TranslateErrorKind::Operand,
            &format!("Invalid {what}"),
            Some(token.text),
            token.column,
        )
        .with_help(format!(
            "{what} must be a decimal constant between 0 and {MAX_CONSTANT}"
        ))),
    }
}

fn check_symbol(token: &Token<'_>) -> Result<(), CommandError> {
    if is_valid_symbol(token.text) {
        return Ok(());
    }
    Err(CommandError::new(
        TranslateErrorKind::Operand,
        "Invalid symbol",
        Some(token.text),
        token.column,
    )
    .with_help("symbols start with a letter, '_', '.', ':', or '$' and continue with letters, digits, or those marks"))
}

fn is_valid_symbol(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && !matches!(first, '_' | '.' | ':' | '$') {
        return false;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ':' | '$'))
}

fn segment_names() -> String {
    let names: Vec<&str> = Segment::ALL.iter().map(|segment| segment.name()).collect();
    names.join(", ")
}
