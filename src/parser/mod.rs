//! Object parser (§4.5), grounded on the context-stack redesign of §9 "Context-stack
//! polymorphism": an explicit stack of [`ContainerFrame`]s replaces virtual dispatch over a
//! tree of container subclasses.

use crate::config::ParserConfig;
use crate::error::{Error, ParseError};
use crate::object::{ObjectId, PdfDictionary, PdfObject, PdfStream};
use crate::source::ItemSource;
use crate::source::buffered::BufferedProvider;
use crate::token::{Token, TokenKind};

/// Default ring-buffer capacity for the token provider feeding the parser (§4.2).
pub const DEFAULT_TOKEN_BUFFER_CAPACITY: usize = 5;

/// A frame on the parser's explicit context stack (§9 "Context-stack polymorphism").
enum ContainerFrame {
    /// Bottom-of-stack sentinel: accepts exactly one child, then the parse is complete.
    Root { child: Option<PdfObject> },
    Array { items: Vec<PdfObject> },
    Dictionary {
        dict: PdfDictionary,
        pending_key: Option<Vec<u8>>,
    },
    IndirectObject { id: ObjectId, child: Option<PdfObject> },
}

/// Assembles tokens pulled from a buffered provider into a tree of [`PdfObject`]s.
pub struct Parser<S> {
    tokens: BufferedProvider<Token, S>,
    config: ParserConfig,
}

impl<S: ItemSource<Token>> Parser<S> {
    pub fn new(source: S, config: ParserConfig) -> Self {
        Self::with_capacity(source, config, DEFAULT_TOKEN_BUFFER_CAPACITY)
    }

    pub fn with_capacity(source: S, config: ParserConfig, capacity: usize) -> Self {
        Parser {
            tokens: BufferedProvider::new(source, capacity),
            config,
        }
    }

    /// Returns the first complete top-level object (§6 "Parse entry points").
    pub fn parse_object(&mut self) -> Result<PdfObject, Error> {
        let mut stack = vec![ContainerFrame::Root { child: None }];
        loop {
            if root_is_complete(&stack) {
                break;
            }
            if !self.tokens.has_next()? {
                return Err(ParseError::NoObjectParsed.into());
            }
            let current = self.tokens.next()?;
            self.step(&mut stack, current)?;
        }
        match stack.pop() {
            Some(ContainerFrame::Root { child: Some(value) }) => Ok(value),
            _ => unreachable!("root_is_complete guarantees a child is present"),
        }
    }

    /// Expects the first top-level object to be a `PdfIndirectObject` matching the given
    /// identifier and returns its inner value. `extract` narrows the value to the caller's
    /// expected variant; a mismatch is a [`ParseError::TypeMismatch`].
    pub fn parse_indirect_object<T>(
        &mut self,
        expected_object_number: u32,
        expected_generation: u16,
        extract: impl FnOnce(PdfObject) -> Result<T, &'static str>,
    ) -> Result<T, Error> {
        let object = self.parse_object()?;
        let PdfObject::IndirectObject { id, value } = object else {
            return Err(ParseError::TypeMismatch { expected: "IndirectObject", found: "other" }.into());
        };
        if id.object_number != expected_object_number || id.generation != expected_generation {
            return Err(ParseError::IdentifierMismatch {
                expected_number: expected_object_number,
                expected_generation,
                found_number: id.object_number,
                found_generation: id.generation,
            }
            .into());
        }
        extract(*value)
            .map_err(|found| ParseError::TypeMismatch { expected: "the requested variant", found }.into())
    }

    fn step(&mut self, stack: &mut Vec<ContainerFrame>, current: Token) -> Result<(), Error> {
        if let TokenKind::NumericInteger(object_number, _) = &current.kind {
            if let Some(lookahead) = self.try_lookahead(*object_number, current.start_index)? {
                return self.apply_lookahead(stack, lookahead);
            }
        }
        self.dispatch(stack, current)
    }

    /// 3-token lookahead rule (§4.5, highest priority): `N M R` vs `N M obj`.
    fn try_lookahead(&mut self, object_number: i64, offset: u64) -> Result<Option<Lookahead>, Error> {
        if !self.tokens.has_item_at(0)? {
            return Ok(None);
        }
        let TokenKind::NumericInteger(generation, _) = self.tokens.peek(0)?.kind else {
            return Ok(None);
        };
        if !self.tokens.has_item_at(1)? {
            return Ok(None);
        }
        let marker = self.tokens.peek(1)?.kind;
        let kind = match marker {
            TokenKind::IndirectReferenceMarker => LookaheadKind::Reference,
            TokenKind::IndirectObjectBegin => LookaheadKind::ObjectBegin,
            _ => return Ok(None),
        };
        let id = ObjectId::new(to_u32(object_number, offset)?, to_u16(generation, offset)?);
        self.tokens.consume(2)?;
        Ok(Some(Lookahead { id, kind, offset }))
    }

    fn apply_lookahead(&mut self, stack: &mut Vec<ContainerFrame>, lookahead: Lookahead) -> Result<(), Error> {
        match lookahead.kind {
            LookaheadKind::Reference => {
                add_child(stack, PdfObject::IndirectReference(lookahead.id), &self.config, lookahead.offset)
            }
            LookaheadKind::ObjectBegin => {
                check_stack_depth(stack, &self.config)?;
                stack.push(ContainerFrame::IndirectObject { id: lookahead.id, child: None });
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, stack: &mut Vec<ContainerFrame>, token: Token) -> Result<(), Error> {
        let offset = token.start_index;
        match token.kind {
            TokenKind::Null => add_child(stack, PdfObject::Null, &self.config, offset),
            TokenKind::Boolean(value) => add_child(stack, PdfObject::Boolean(value), &self.config, offset),
            TokenKind::NumericInteger(value, _) => add_child(stack, PdfObject::Integer(value), &self.config, offset),
            TokenKind::NumericReal(value, _) => add_child(stack, PdfObject::Real(value), &self.config, offset),
            TokenKind::String(bytes, format) => {
                add_child(stack, PdfObject::String(bytes, format), &self.config, offset)
            }
            TokenKind::Name(bytes) => add_name(stack, bytes),
            TokenKind::Comment(_) | TokenKind::HeaderComment(_) | TokenKind::BinaryIndicatorComment => Ok(()),
            TokenKind::ArrayBegin => {
                check_stack_depth(stack, &self.config)?;
                stack.push(ContainerFrame::Array { items: Vec::new() });
                Ok(())
            }
            TokenKind::ArrayEnd => close_array(stack, &self.config, offset),
            TokenKind::DictionaryBegin => {
                check_stack_depth(stack, &self.config)?;
                stack.push(ContainerFrame::Dictionary { dict: PdfDictionary::new(), pending_key: None });
                Ok(())
            }
            TokenKind::DictionaryEnd => close_dictionary(stack, &self.config, offset),
            TokenKind::IndirectObjectEnd => close_indirect_object(stack, &self.config, offset),
            TokenKind::StreamBegin { stream_start_index } => {
                promote_to_stream(stack, &self.config, stream_start_index, offset)
            }
            TokenKind::IndirectReferenceMarker
            | TokenKind::IndirectObjectBegin
            | TokenKind::StreamEnd
            | TokenKind::Dummy => Err(ParseError::UnexpectedToken { offset }.into()),
        }
    }
}

struct Lookahead {
    id: ObjectId,
    kind: LookaheadKind,
    offset: u64,
}

enum LookaheadKind {
    Reference,
    ObjectBegin,
}

/// Rejects pushing a new container once the stack is at `max_stack_depth`, warning once the
/// stack is already most of the way there so a caller can notice a runaway document before it
/// hits the hard cap.
fn check_stack_depth(stack: &[ContainerFrame], config: &ParserConfig) -> Result<(), Error> {
    if stack.len() >= config.max_stack_depth {
        return Err(ParseError::StackDepthExceeded { cap: config.max_stack_depth }.into());
    }
    if stack.len() * 10 >= config.max_stack_depth * 9 {
        log::warn!(
            "container stack at depth {} is approaching its cap of {}",
            stack.len(),
            config.max_stack_depth
        );
    }
    Ok(())
}

fn root_is_complete(stack: &[ContainerFrame]) -> bool {
    stack.len() == 1 && matches!(stack[0], ContainerFrame::Root { child: Some(_) })
}

fn to_u32(value: i64, offset: u64) -> Result<u32, Error> {
    u32::try_from(value).map_err(|_| ParseError::IdentifierOverflow { offset }.into())
}

fn to_u16(value: i64, offset: u64) -> Result<u16, Error> {
    u16::try_from(value).map_err(|_| ParseError::IdentifierOverflow { offset }.into())
}

/// Adds `value` as a child of the current top-of-stack container, per the table in §4.5.
///
/// A dictionary in expecting-key state that receives a non-`Name` value silently drops it
/// unless `config.strict_dictionary_keys` is set, resolving §9 Open Question 1.
fn add_child(stack: &mut [ContainerFrame], value: PdfObject, config: &ParserConfig, offset: u64) -> Result<(), Error> {
    match stack.last_mut().expect("stack is never empty") {
        ContainerFrame::Root { child } => *child = Some(value),
        ContainerFrame::Array { items } => items.push(value),
        ContainerFrame::Dictionary { dict, pending_key } => match pending_key.take() {
            Some(key) => dict.set(key, value),
            None => {
                if config.strict_dictionary_keys {
                    return Err(ParseError::UnexpectedToken { offset }.into());
                }
                log::warn!(
                    "dropping {} value at offset {offset} while a dictionary expected a key",
                    value.enum_variant()
                );
            }
        },
        ContainerFrame::IndirectObject { child, .. } => *child = Some(value),
    }
    Ok(())
}

/// A `Name` token is always legal in key position; elsewhere it's an ordinary scalar value.
fn add_name(stack: &mut [ContainerFrame], bytes: Vec<u8>) -> Result<(), Error> {
    if let ContainerFrame::Dictionary { pending_key, .. } = stack.last_mut().expect("stack is never empty") {
        if pending_key.is_none() {
            *pending_key = Some(bytes);
            return Ok(());
        }
    }
    match stack.last_mut().expect("stack is never empty") {
        ContainerFrame::Root { child } => *child = Some(PdfObject::Name(bytes)),
        ContainerFrame::Array { items } => items.push(PdfObject::Name(bytes)),
        ContainerFrame::Dictionary { dict, pending_key } => {
            let key = pending_key.take().expect("checked above");
            dict.set(key, PdfObject::Name(bytes));
        }
        ContainerFrame::IndirectObject { child, .. } => *child = Some(PdfObject::Name(bytes)),
    }
    Ok(())
}

fn close_array(stack: &mut Vec<ContainerFrame>, config: &ParserConfig, offset: u64) -> Result<(), Error> {
    match stack.pop() {
        Some(ContainerFrame::Array { items }) => add_child(stack, PdfObject::Array(items), config, offset),
        Some(other) => {
            stack.push(other);
            Err(ParseError::ContextMismatch { offset }.into())
        }
        None => Err(ParseError::StackUnderflow { offset }.into()),
    }
}

fn close_dictionary(stack: &mut Vec<ContainerFrame>, config: &ParserConfig, offset: u64) -> Result<(), Error> {
    match stack.pop() {
        Some(ContainerFrame::Dictionary { dict, pending_key }) => {
            // §9 Open Question 2: a dangling key with no value before `>>` is silently dropped.
            if let Some(key) = pending_key {
                log::warn!(
                    "dropping dangling dictionary key {:?} at offset {offset} with no value before `>>`",
                    String::from_utf8_lossy(&key)
                );
            }
            add_child(stack, PdfObject::Dictionary(dict), config, offset)
        }
        Some(other) => {
            stack.push(other);
            Err(ParseError::ContextMismatch { offset }.into())
        }
        None => Err(ParseError::StackUnderflow { offset }.into()),
    }
}

fn close_indirect_object(stack: &mut Vec<ContainerFrame>, config: &ParserConfig, offset: u64) -> Result<(), Error> {
    match stack.pop() {
        Some(ContainerFrame::IndirectObject { id, child }) => {
            let value = child.unwrap_or(PdfObject::Null);
            add_child(stack, PdfObject::IndirectObject { id, value: Box::new(value) }, config, offset)
        }
        Some(other) => {
            stack.push(other);
            Err(ParseError::ContextMismatch { offset }.into())
        }
        None => Err(ParseError::StackUnderflow { offset }.into()),
    }
}

fn promote_to_stream(
    stack: &mut Vec<ContainerFrame>,
    config: &ParserConfig,
    stream_start_index: u64,
    offset: u64,
) -> Result<(), Error> {
    match stack.last_mut() {
        Some(ContainerFrame::IndirectObject { id, child }) => {
            if !matches!(child, Some(PdfObject::Dictionary(_))) {
                return Err(ParseError::MissingStreamDictionary { offset }.into());
            }
            let id = *id;
            let Some(PdfObject::Dictionary(dictionary)) = child.take() else {
                unreachable!("checked above");
            };
            stack.pop();
            add_child(
                stack,
                PdfObject::IndirectObject {
                    id,
                    value: Box::new(PdfObject::Stream(PdfStream { id, dictionary, stream_start_index })),
                },
                config,
                offset,
            )
        }
        _ => Err(ParseError::MissingStreamDictionary { offset }.into()),
    }
}
