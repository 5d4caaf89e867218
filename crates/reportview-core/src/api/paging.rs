//! Pagination over list operations that return bounded pages.
//!
//! The service caps every list reply at a fixed page size. A [`Pager`] keeps
//! the argument list of one paged operation, advances the offset by the
//! number of items actually received and stops only on an empty page. A
//! short page is not taken as the end of the data.

use serde_json::Value;
use tracing::debug;

use super::error::ClientError;

/// Default maximum page size of the service's list operations.
pub const DEFAULT_MAX_QUERY_SIZE: usize = 500;

/// Prefix of the convenience names that fetch every page of an operation.
const GET_ALL_PREFIX: &str = "getAll";

/// Where `limit` and `offset` go in a paged operation's argument list.
///
/// The two values are always adjacent, `limit` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePlacement {
    /// Insert before the argument at this index.
    At(usize),
    /// Insert before the last `n` arguments. `FromEnd(0)` appends.
    FromEnd(usize),
}

impl PagePlacement {
    fn index(self, len: usize) -> Result<usize, ClientError> {
        let index = match self {
            PagePlacement::At(i) => Some(i),
            PagePlacement::FromEnd(n) => len.checked_sub(n),
        };
        index.filter(|&i| i <= len).ok_or_else(|| {
            ClientError::InvalidArgument(format!(
                "Page placement {:?} does not fit {} fixed arguments",
                self, len
            ))
        })
    }
}

/// Map a `getAllXxx` name onto the paged operation `getXxx`.
pub fn paged_operation(name: &str) -> Option<String> {
    let rest = name.strip_prefix(GET_ALL_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(format!("get{}", rest))
}

pub(crate) struct Pager<'a> {
    method: &'a str,
    args: Vec<Value>,
    index: usize,
    offset: usize,
    results: Vec<Value>,
}

impl<'a> Pager<'a> {
    pub(crate) fn new(
        method: &'a str,
        fixed_args: &[Value],
        placement: PagePlacement,
        page_size: usize,
    ) -> Result<Self, ClientError> {
        if page_size == 0 {
            return Err(ClientError::InvalidArgument("Page size must be at least 1".to_string()));
        }
        let index = placement.index(fixed_args.len())?;
        let mut args = fixed_args.to_vec();
        args.insert(index, Value::from(0));
        args.insert(index, Value::from(page_size));

        Ok(Self {
            method,
            args,
            index,
            offset: 0,
            results: Vec::new(),
        })
    }

    pub(crate) fn method(&self) -> &'a str {
        self.method
    }

    /// Arguments for the next page request.
    pub(crate) fn args(&self) -> &[Value] {
        &self.args
    }

    /// Take one page reply. Returns `true` while more pages must be requested.
    pub(crate) fn accept(&mut self, reply: Option<Value>) -> Result<bool, ClientError> {
        let page = reply.ok_or_else(|| ClientError::IncompletePage {
            method: self.method.to_string(),
            offset: self.offset,
            fetched: self.results.len(),
        })?;

        let items = match page {
            Value::Array(items) => items,
            other => {
                return Err(ClientError::Protocol(format!(
                    "{}: expected a list page at offset {}, got {}",
                    self.method,
                    self.offset,
                    kind(&other)
                )))
            }
        };

        debug!(
            method = self.method,
            offset = self.offset,
            limit = %self.args[self.index],
            count = items.len(),
            "Page received"
        );

        if items.is_empty() {
            return Ok(false);
        }

        self.offset += items.len();
        self.results.extend(items);
        self.args[self.index + 1] = Value::from(self.offset);
        Ok(true)
    }

    pub(crate) fn finish(self) -> Vec<Value> {
        self.results
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Tests
// ============================================================================
