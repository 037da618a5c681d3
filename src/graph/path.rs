// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed graph paths and the ancestor chain used to locate trust certificates.
//!
//! A [`GraphPath`] is an ordered list of keys. Keys that start with `~` are
//! identity roots (a user's own sub-graph, e.g. `~<pub>/profile/email`).
//!
//! The trust lookup needs a *normalized* path: the keys between the target and
//! its nearest identity root, concatenated leaf first. [`AncestorChain`] is
//! that walk computed once as a value.

use std::fmt;

/// Separator used when rendering a path as a single string.
pub const SEPARATOR: char = '/';

/// Prefix marking an identity root key.
pub const IDENTITY_PREFIX: char = '~';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path must contain at least one key")]
    Empty,

    #[error("path key {0:?} contains the separator '/'")]
    Separator(String),
}

/// One key of a [`GraphPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    key: String,
    identity_root: bool,
}

impl PathSegment {
    fn new(key: impl Into<String>) -> Result<Self, PathError> {
        let key = key.into();
        if key.contains(SEPARATOR) {
            return Err(PathError::Separator(key));
        }
        let identity_root = key.starts_with(IDENTITY_PREFIX);
        Ok(Self { key, identity_root })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this key is an opaque identity object (a user root).
    pub fn is_identity_root(&self) -> bool {
        self.identity_root
    }
}

/// Location in the replicated graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphPath {
    segments: Vec<PathSegment>,
}

impl GraphPath {
    /// Path with a single top-level key.
    pub fn root(key: impl Into<String>) -> Result<Self, PathError> {
        Ok(Self {
            segments: vec![PathSegment::new(key)?],
        })
    }

    /// Root of the identity owning `public_key`.
    pub fn user(public_key: &str) -> Result<Self, PathError> {
        Self::root(format!("{IDENTITY_PREFIX}{public_key}"))
    }

    /// Parse a `/`-separated path. Keys beginning with `~` become identity roots.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = raw
            .split(SEPARATOR)
            .map(PathSegment::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Extend the path by one key.
    pub fn child(&self, key: impl Into<String>) -> Result<Self, PathError> {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::new(key)?);
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The target key (last segment).
    pub fn leaf(&self) -> &PathSegment {
        // Construction guarantees at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ancestor chain from the target upward.
    pub fn ancestors(&self) -> AncestorChain {
        AncestorChain {
            links: self.segments.iter().rev().cloned().collect(),
        }
    }
}

impl fmt::Display for GraphPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(&segment.key)?;
        }
        Ok(())
    }
}

/// Ordered ancestors of a node, target first, each carrying its identity-root flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    links: Vec<PathSegment>,
}

impl AncestorChain {
    pub fn links(&self) -> &[PathSegment] {
        &self.links
    }

    /// Nearest identity root above (or at) the target.
    pub fn identity_root(&self) -> Option<&PathSegment> {
        self.links.iter().find(|link| link.identity_root)
    }

    /// Keys below the nearest identity root, concatenated leaf first.
    ///
    /// A chain without any identity root normalizes to the empty string.
    pub fn normalized(&self) -> String {
        let mut acc = String::new();
        for link in &self.links {
            if link.identity_root {
                return acc;
            }
            acc.push_str(&link.key);
        }
        String::new()
    }
}
