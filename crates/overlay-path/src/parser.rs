//! Recursive-descent parser shared by both selector dialects.
//!
//! Positions in errors are byte offsets into the expression.

use overlay_tree::Scalar;
use regex::RegexBuilder;

use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::ParseError;

/// Largest integer an index or slice bound may hold in RFC 9535 (2^53 - 1).
const MAX_EXACT_INT: i64 = 9_007_199_254_740_991;

type ParseResult<T> = Result<T, ParseError>;

/// An operand before it is known whether it is compared or tested.
enum Operand {
    Literal(Scalar),
    Query(Query),
    Function(FunctionCall),
}

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
    dialect: Dialect,
}

impl<'a> Parser<'a> {
    /// Parse a complete selector expression starting with `$`.
    pub fn parse(input: &'a str, dialect: Dialect) -> ParseResult<Query> {
        let mut parser = Self {
            input,
            pos: 0,
            dialect,
        };
        parser.parse_query()
    }

    fn rfc(&self) -> bool {
        self.dialect.is_rfc9535()
    }

    fn parse_query(&mut self) -> ParseResult<Query> {
        if self.peek() != Some('$') {
            return Err(ParseError::ExpectedRoot(self.pos));
        }
        self.advance();
        let segments = self.parse_segments()?;
        if !self.rfc() {
            self.skip_whitespace();
        }
        if !self.is_at_end() {
            return Err(self.unexpected());
        }
        Ok(Query {
            root: QueryRoot::Root,
            segments,
        })
    }

    /// Segments up to the first character that cannot start one. Blank space
    /// between segments is consumed only when another segment follows.
    fn parse_segments(&mut self) -> ParseResult<Vec<Segment>> {
        let mut segments = Vec::new();
        loop {
            let mark = self.pos;
            self.skip_whitespace();
            match self.peek() {
                Some('.') => {
                    self.advance();
                    if self.peek() == Some('.') {
                        self.advance();
                        segments.push(self.parse_descendant_segment()?);
                    } else if self.peek() == Some('*') {
                        self.advance();
                        segments.push(Segment::new(vec![Selector::Wildcard], false));
                    } else {
                        let name = self.parse_member_name()?;
                        segments.push(Segment::new(vec![Selector::Name(name)], false));
                    }
                }
                Some('[') => {
                    let selectors = self.parse_bracket_selectors()?;
                    segments.push(Segment::new(selectors, false));
                }
                _ => {
                    self.pos = mark;
                    return Ok(segments);
                }
            }
        }
    }

    fn parse_descendant_segment(&mut self) -> ParseResult<Segment> {
        match self.peek() {
            Some('*') => {
                self.advance();
                Ok(Segment::new(vec![Selector::Wildcard], true))
            }
            Some('[') => Ok(Segment::new(self.parse_bracket_selectors()?, true)),
            _ => Ok(Segment::new(vec![Selector::Name(self.parse_member_name()?)], true)),
        }
    }

    /// The name after `.` or `..`.
    fn parse_member_name(&mut self) -> ParseResult<String> {
        let start = self.pos;
        if self.rfc() {
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => self.advance(),
                _ => return Err(self.unexpected()),
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii() {
                    self.advance();
                } else {
                    break;
                }
            }
        } else {
            while let Some(c) = self.peek() {
                if is_legacy_name_terminator(c) {
                    break;
                }
                self.advance();
            }
            if self.pos == start {
                return Err(self.unexpected());
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_bracket_selectors(&mut self) -> ParseResult<Vec<Selector>> {
        self.expect('[')?;
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_bracket_selector()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    return Ok(selectors);
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_bracket_selector(&mut self) -> ParseResult<Selector> {
        match self.peek() {
            Some('\'') | Some('"') => Ok(Selector::Name(self.parse_string()?)),
            Some('*') => {
                self.advance();
                Ok(Selector::Wildcard)
            }
            Some('?') => {
                self.advance();
                self.skip_whitespace();
                let filter = if self.rfc() {
                    self.parse_or()?
                } else {
                    self.expect('(')?;
                    let filter = self.parse_or()?;
                    self.skip_whitespace();
                    self.expect(')')?;
                    filter
                };
                Ok(Selector::Filter(Box::new(filter)))
            }
            Some(':') | Some('-') | Some('0'..='9') => self.parse_index_or_slice(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_index_or_slice(&mut self) -> ParseResult<Selector> {
        let start = self.parse_optional_int()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            return match start {
                Some(index) => Ok(Selector::Index(index)),
                None => Err(self.unexpected()),
            };
        }
        self.advance();
        self.skip_whitespace();
        let end = self.parse_optional_int()?;
        self.skip_whitespace();
        let step = if self.peek() == Some(':') {
            self.advance();
            self.skip_whitespace();
            self.parse_optional_int()?
        } else {
            None
        };
        Ok(Selector::Slice { start, end, step })
    }

    fn parse_optional_int(&mut self) -> ParseResult<Option<i64>> {
        if matches!(self.peek(), Some('-') | Some('0'..='9')) {
            Ok(Some(self.parse_int()?))
        } else {
            Ok(None)
        }
    }

    fn parse_int(&mut self) -> ParseResult<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        let digits = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        let text = &self.input[start..self.pos];
        let digit_text = &self.input[digits..self.pos];
        if digit_text.is_empty() {
            return Err(ParseError::InvalidNumber(start));
        }
        if self.rfc() && digit_text.starts_with('0') && (digit_text.len() > 1 || text.starts_with('-')) {
            return Err(ParseError::InvalidNumber(start));
        }
        // Only overflow can fail here; legacy saturates it before clamping.
        let value: i64 = match text.parse() {
            Ok(value) => value,
            Err(_) if !self.rfc() && text.starts_with('-') => i64::MIN,
            Err(_) if !self.rfc() => i64::MAX,
            Err(_) => return Err(ParseError::InvalidNumber(start)),
        };
        if (-MAX_EXACT_INT..=MAX_EXACT_INT).contains(&value) {
            Ok(value)
        } else if self.rfc() {
            Err(ParseError::InvalidNumber(start))
        } else {
            Ok(value.clamp(-MAX_EXACT_INT, MAX_EXACT_INT))
        }
    }

    fn parse_string(&mut self) -> ParseResult<String> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Err(ParseError::UnexpectedEnd);
        };
        self.advance();

        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    let escape = self.pos;
                    self.advance();
                    let Some(c) = self.peek() else {
                        return Err(ParseError::UnclosedString(start));
                    };
                    self.advance();
                    match c {
                        'b' => result.push('\u{8}'),
                        'f' => result.push('\u{c}'),
                        'n' => result.push('\n'),
                        'r' => result.push('\r'),
                        't' => result.push('\t'),
                        '/' | '\\' => result.push(c),
                        'u' => result.push(self.parse_unicode_escape(escape)?),
                        c if c == quote => result.push(c),
                        c if !self.rfc() => result.push(c),
                        _ => return Err(ParseError::InvalidEscape(escape)),
                    }
                }
                Some(c) if self.rfc() && (c as u32) < 0x20 => return Err(self.unexpected()),
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    /// The code point of a `\uXXXX` escape whose `\u` is already consumed,
    /// combining a surrogate pair into one character.
    fn parse_unicode_escape(&mut self, escape: usize) -> ParseResult<char> {
        let high = self.parse_hex4(escape)?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.peek_str("\\u") {
                    return Err(ParseError::InvalidEscape(escape));
                }
                self.advance_by(2);
                let low = self.parse_hex4(escape)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(ParseError::InvalidEscape(escape));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(ParseError::InvalidEscape(escape)),
            _ => high,
        };
        char::from_u32(code).ok_or(ParseError::InvalidEscape(escape))
    }

    fn parse_hex4(&mut self, escape: usize) -> ParseResult<u32> {
        let mut value = 0;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or(ParseError::InvalidEscape(escape))?;
            value = value * 16 + digit;
            self.advance();
        }
        Ok(value)
    }

    fn parse_or(&mut self) -> ParseResult<Filter> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.peek_str("||") {
                return Ok(left);
            }
            self.advance_by(2);
            let right = self.parse_and()?;
            left = Filter::Or(Box::new(left), Box::new(right));
        }
    }

    fn parse_and(&mut self) -> ParseResult<Filter> {
        let mut left = self.parse_basic()?;
        loop {
            self.skip_whitespace();
            if !self.peek_str("&&") {
                return Ok(left);
            }
            self.advance_by(2);
            let right = self.parse_basic()?;
            left = Filter::And(Box::new(left), Box::new(right));
        }
    }

    fn parse_basic(&mut self) -> ParseResult<Filter> {
        self.skip_whitespace();
        if self.peek() == Some('!') && !self.peek_str("!=") {
            self.advance();
            self.skip_whitespace();
            let inner = if self.peek() == Some('(') {
                self.parse_paren()?
            } else {
                // RFC 9535 only negates tests and parenthesized expressions.
                self.parse_primary(!self.rfc())?
            };
            return Ok(Filter::Not(Box::new(inner)));
        }
        if self.peek() == Some('(') {
            return self.parse_paren();
        }
        self.parse_primary(true)
    }

    fn parse_paren(&mut self) -> ParseResult<Filter> {
        self.expect('(')?;
        let inner = self.parse_or()?;
        self.skip_whitespace();
        self.expect(')')?;
        Ok(inner)
    }

    /// A comparison, a legacy regex match, or a test.
    fn parse_primary(&mut self, allow_comparison: bool) -> ParseResult<Filter> {
        let left_pos = self.pos;
        let left = self.parse_operand()?;
        self.skip_whitespace();

        if let Some((op, len)) = self.peek_compare_op() {
            if !allow_comparison {
                return Err(self.unexpected());
            }
            self.advance_by(len);
            self.skip_whitespace();
            let right_pos = self.pos;
            let right = self.parse_operand()?;
            return Ok(Filter::Compare {
                op,
                left: self.comparable(left, left_pos)?,
                right: self.comparable(right, right_pos)?,
            });
        }

        if !self.rfc() && self.peek_str("=~") {
            self.advance_by(2);
            self.skip_whitespace();
            let regex = self.parse_regex_literal()?;
            return Ok(Filter::RegexMatch {
                subject: self.comparable(left, left_pos)?,
                regex,
            });
        }

        match left {
            Operand::Query(query) => Ok(Filter::Exists(query)),
            Operand::Function(call) if call.function.result() == ArgType::Logical => {
                Ok(Filter::Function(call))
            }
            Operand::Function(call) => Err(ParseError::Type(format!(
                "result of {}() at position {left_pos} must be compared",
                call.function.name()
            ))),
            Operand::Literal(_) => Err(ParseError::Type(format!(
                "literal at position {left_pos} cannot be used as a test"
            ))),
        }
    }

    fn comparable(&self, operand: Operand, position: usize) -> ParseResult<Comparable> {
        match operand {
            Operand::Literal(scalar) => Ok(Comparable::Literal(scalar)),
            Operand::Query(query) => {
                if self.rfc() && !query.is_singular() {
                    return Err(ParseError::Type(format!(
                        "non-singular query at position {position} is not comparable"
                    )));
                }
                Ok(Comparable::Query(query))
            }
            Operand::Function(call) => {
                if call.function.result() != ArgType::Value {
                    return Err(ParseError::Type(format!(
                        "result of {}() at position {position} is not comparable",
                        call.function.name()
                    )));
                }
                Ok(Comparable::Function(call))
            }
        }
    }

    fn parse_operand(&mut self) -> ParseResult<Operand> {
        match self.peek() {
            Some(c @ ('@' | '$')) => {
                self.advance();
                let root = if c == '@' {
                    QueryRoot::Current
                } else {
                    QueryRoot::Root
                };
                let segments = self.parse_segments()?;
                Ok(Operand::Query(Query { root, segments }))
            }
            Some('\'') | Some('"') => Ok(Operand::Literal(Scalar::String(self.parse_string()?))),
            Some('-') | Some('0'..='9') => Ok(Operand::Literal(self.parse_number()?)),
            Some(c) if c.is_ascii_lowercase() => self.parse_word(),
            _ => Err(self.unexpected()),
        }
    }

    /// A keyword literal or a function call.
    fn parse_word(&mut self) -> ParseResult<Operand> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            self.advance();
        }
        let word = &self.input[start..self.pos];
        match word {
            "true" => return Ok(Operand::Literal(Scalar::Bool(true))),
            "false" => return Ok(Operand::Literal(Scalar::Bool(false))),
            "null" => return Ok(Operand::Literal(Scalar::Null)),
            _ => {}
        }
        if self.peek() != Some('(') {
            return Err(self.unexpected());
        }
        if !self.rfc() {
            return Err(ParseError::Unsupported("function extensions", self.dialect));
        }
        let function =
            Function::from_name(word).ok_or_else(|| ParseError::UnknownFunction(word.to_string()))?;
        self.advance();

        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
        } else {
            loop {
                self.skip_whitespace();
                let position = self.pos;
                args.push((self.parse_operand()?, position));
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.advance(),
                    Some(')') => {
                        self.advance();
                        break;
                    }
                    _ => return Err(self.unexpected()),
                }
            }
        }
        Ok(Operand::Function(self.check_call(function, args)?))
    }

    fn check_call(&self, function: Function, args: Vec<(Operand, usize)>) -> ParseResult<FunctionCall> {
        let params = function.params();
        if args.len() != params.len() {
            return Err(ParseError::Type(format!(
                "{}() takes {} argument(s), got {}",
                function.name(),
                params.len(),
                args.len()
            )));
        }

        let mut checked = Vec::with_capacity(args.len());
        for ((arg, position), param) in args.into_iter().zip(params) {
            let arg = match (arg, param) {
                (Operand::Literal(scalar), ArgType::Value) => FunctionArg::Literal(scalar),
                (Operand::Query(query), ArgType::Value) if query.is_singular() => {
                    FunctionArg::Query(query)
                }
                (Operand::Query(query), ArgType::Nodes) => FunctionArg::Query(query),
                (Operand::Function(call), ArgType::Value) if call.function.result() == ArgType::Value => {
                    FunctionArg::Function(call)
                }
                _ => {
                    return Err(ParseError::Type(format!(
                        "argument at position {position} has the wrong type for {}()",
                        function.name()
                    )))
                }
            };
            checked.push(arg);
        }
        Ok(FunctionCall {
            function,
            args: checked,
        })
    }

    fn parse_number(&mut self) -> ParseResult<Scalar> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        let digits = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        let int_part = &self.input[digits..self.pos];
        if int_part.is_empty() || (self.rfc() && int_part.len() > 1 && int_part.starts_with('0')) {
            return Err(ParseError::InvalidNumber(start));
        }

        let mut integral = true;
        if self.peek() == Some('.') {
            integral = false;
            self.advance();
            self.expect_digits(start)?;
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            integral = false;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            self.expect_digits(start)?;
        }

        let text = &self.input[start..self.pos];
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Scalar::from(n));
            }
        }
        text.parse::<f64>()
            .map(Scalar::from)
            .map_err(|_| ParseError::InvalidNumber(start))
    }

    fn expect_digits(&mut self, start: usize) -> ParseResult<()> {
        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(ParseError::InvalidNumber(start));
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        Ok(())
    }

    /// `/pattern/flags`, with `\/` standing for a literal slash.
    fn parse_regex_literal(&mut self) -> ParseResult<regex::Regex> {
        self.expect('/')?;
        let mut pattern = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEnd),
                Some('/') => {
                    self.advance();
                    break;
                }
                Some('\\') if self.peek_str("\\/") => {
                    pattern.push('/');
                    self.advance_by(2);
                }
                Some('\\') => {
                    pattern.push('\\');
                    self.advance();
                    if let Some(c) = self.peek() {
                        pattern.push(c);
                        self.advance();
                    }
                }
                Some(c) => {
                    pattern.push(c);
                    self.advance();
                }
            }
        }

        let mut builder = RegexBuilder::new(&pattern);
        while let Some(flag) = self.peek().filter(char::is_ascii_alphabetic) {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                _ => return Err(ParseError::InvalidRegex(format!("unknown flag '{flag}'"))),
            };
            self.advance();
        }
        builder
            .build()
            .map_err(|err| ParseError::InvalidRegex(err.to_string()))
    }

    fn peek_compare_op(&self) -> Option<(CompareOp, usize)> {
        if self.peek_str("==") {
            Some((CompareOp::Eq, 2))
        } else if self.peek_str("!=") {
            Some((CompareOp::Ne, 2))
        } else if self.peek_str("<=") {
            Some((CompareOp::Le, 2))
        } else if self.peek_str(">=") {
            Some((CompareOp::Ge, 2))
        } else if self.peek_str("<") {
            Some((CompareOp::Lt, 1))
        } else if self.peek_str(">") {
            Some((CompareOp::Gt, 1))
        } else {
            None
        }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                token,
                position: self.pos,
            },
            None => ParseError::UnexpectedEnd,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
    }
}

fn is_legacy_name_terminator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | '[' | ']' | '(' | ')' | ',' | '=' | '!' | '<' | '>' | '&' | '|' | '\'' | '"'
        )
}
