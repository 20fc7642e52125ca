/********************************************************************************
 * Copyright (c) 2025 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Hierarchical path model with positional keys and wildcard matching.

use crate::status::{Code, Status};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One element of a hierarchical path: a name plus an optional key map.
///
/// Key order is canonicalized by the `BTreeMap` so that structurally equal
/// elements compare and hash equal regardless of construction order.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PathElem {
    name: String,
    key: BTreeMap<String, String>,
}

impl PathElem {
    /// Creates a key-less element.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: BTreeMap::new(),
        }
    }

    /// Creates an element with a single `name -> value` key, the common shape
    /// for list entries such as `interface[name=iface-1]`.
    pub fn with_key(name: &str, key_name: &str, key_value: &str) -> Self {
        let mut key = BTreeMap::new();
        key.insert(key_name.to_string(), key_value.to_string());
        Self {
            name: name.to_string(),
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &BTreeMap<String, String> {
        &self.key
    }

    /// Inserts one key entry, replacing any previous value under `key_name`.
    pub fn insert_key(&mut self, key_name: &str, key_value: &str) {
        self.key
            .insert(key_name.to_string(), key_value.to_string());
    }

    /// Returns true when any key value is the `*` wildcard.
    pub fn has_wildcard_key(&self) -> bool {
        self.key.values().any(|value| value == "*")
    }

    /// Wildcard-tolerant element match.
    ///
    /// Names must be equal and the key sets must agree; each key value pair
    /// matches when the values are equal or either side is `*`.
    pub fn matches(&self, other: &PathElem) -> bool {
        if self.name != other.name || self.key.len() != other.key.len() {
            return false;
        }
        self.key.iter().all(|(key_name, value)| {
            other
                .key
                .get(key_name)
                .is_some_and(|other_value| value == other_value || value == "*" || other_value == "*")
        })
    }
}

impl Display for PathElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key_name, key_value) in &self.key {
            write!(f, "[{key_name}={key_value}]")?;
        }
        Ok(())
    }
}

/// An ordered sequence of [`PathElem`]s.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Path {
    elem: Vec<PathElem>,
}

impl Path {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self { elem: Vec::new() }
    }

    pub fn new(elem: Vec<PathElem>) -> Self {
        Self { elem }
    }

    pub fn elem(&self) -> &[PathElem] {
        &self.elem
    }

    pub fn is_empty(&self) -> bool {
        self.elem.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elem.len()
    }

    /// Appends one element, builder style.
    pub fn push(mut self, elem: PathElem) -> Self {
        self.elem.push(elem);
        self
    }

    /// Concatenates a prefix path and a suffix path at the boundary.
    pub fn concat(prefix: &Path, suffix: &Path) -> Path {
        let mut elem = Vec::with_capacity(prefix.elem.len() + suffix.elem.len());
        elem.extend(prefix.elem.iter().cloned());
        elem.extend(suffix.elem.iter().cloned());
        Path { elem }
    }

    /// Returns true when any element carries a `*` key value.
    pub fn has_wildcard(&self) -> bool {
        self.elem.iter().any(PathElem::has_wildcard_key)
    }

    /// Element-wise wildcard-tolerant match; both paths must have equal length.
    pub fn matches(&self, other: &Path) -> bool {
        self.elem.len() == other.elem.len()
            && self
                .elem
                .iter()
                .zip(other.elem.iter())
                .all(|(mine, theirs)| mine.matches(theirs))
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.elem.is_empty() {
            return write!(f, "/");
        }
        for elem in &self.elem {
            write!(f, "/{elem}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Status;

    /// Parses the textual rendering produced by `Display`:
    /// `/interfaces/interface[name=iface-1]/state/ifindex`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(Path::root());
        }
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);

        let mut elem = Vec::new();
        for segment in split_segments(body)? {
            elem.push(parse_elem(&segment)?);
        }
        Ok(Path { elem })
    }
}

/// Splits on `/` outside `[...]` key expressions.
fn split_segments(body: &str) -> Result<Vec<String>, Status> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in body.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Status::fail_with_code(Code::InvalidArgument, "unbalanced ']' in path")
                })?;
                current.push(ch);
            }
            '/' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if depth != 0 {
        return Err(Status::fail_with_code(
            Code::InvalidArgument,
            "unbalanced '[' in path",
        ));
    }
    segments.push(current);
    if segments.iter().any(String::is_empty) {
        return Err(Status::fail_with_code(
            Code::InvalidArgument,
            "empty path element",
        ));
    }
    Ok(segments)
}

fn parse_elem(segment: &str) -> Result<PathElem, Status> {
    let Some(bracket) = segment.find('[') else {
        return Ok(PathElem::new(segment));
    };
    let mut elem = PathElem::new(&segment[..bracket]);
    let mut rest = &segment[bracket..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let end = stripped.find(']').ok_or_else(|| {
            Status::fail_with_code(Code::InvalidArgument, "key expression missing ']'")
        })?;
        let (key_name, key_value) = stripped[..end].split_once('=').ok_or_else(|| {
            Status::fail_with_code(Code::InvalidArgument, "key expression missing '='")
        })?;
        elem.insert_key(key_name, key_value);
        rest = &stripped[end + 1..];
    }
    if !rest.is_empty() {
        return Err(Status::fail_with_code(
            Code::InvalidArgument,
            "trailing characters after key expression",
        ));
    }
    Ok(elem)
}
