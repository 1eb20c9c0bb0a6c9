use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Read,
    Write,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::Read => "read",
            Verb::Write => "write",
        })
    }
}

/// What a route requires of the caller.
///
/// `name_param` names the path parameter holding the resource name; `None`
/// checks the resource kind as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub verb: Verb,
    pub kind: &'static str,
    pub name_param: Option<&'static str>,
}

impl Permission {
    pub const fn read(kind: &'static str, name_param: &'static str) -> Self {
        Self { verb: Verb::Read, kind, name_param: Some(name_param) }
    }

    pub const fn write(kind: &'static str, name_param: &'static str) -> Self {
        Self { verb: Verb::Write, kind, name_param: Some(name_param) }
    }

    pub const fn write_kind(kind: &'static str) -> Self {
        Self { verb: Verb::Write, kind, name_param: None }
    }
}

/// External permission store: may `actor` perform `verb` on `kind/name`?
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_allowed(&self, actor: &str, verb: Verb, kind: &str, name: Option<&str>) -> Result<bool>;
}

/// Grants everything; used when no permission store is wired in.
#[derive(Debug, Default, Clone)]
pub struct AllowAll;

#[async_trait]
impl Authorizer for AllowAll {
    async fn is_allowed(&self, _actor: &str, _verb: Verb, _kind: &str, _name: Option<&str>) -> Result<bool> {
        Ok(true)
    }
}
