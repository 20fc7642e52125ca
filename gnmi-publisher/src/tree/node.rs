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

//! Schema-shaped tree nodes.
//!
//! A keyed path element such as `interface[name=iface-1]` occupies two tree
//! levels: the structural `interface` node and a key-value child named
//! `iface-1`. Each node stores its own full path, which folds the pair back
//! into a single keyed element.

use crate::event::EventKind;
use crate::subscription::EventHandler;
use gnmi_wire::{Path, PathElem, Status, Subscription};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The three handler shapes a leaf can carry, one per subscription mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandlerMode {
    OnChange,
    OnPoll,
    OnTimer,
}

/// Per-node policy translating a TARGET_DEFINED subscription into a concrete
/// mode.
pub type TargetDefinedPolicy = Arc<dyn Fn(&mut Subscription) -> Result<(), Status> + Send + Sync>;

pub struct TreeNode {
    name: String,
    path: Path,
    children: BTreeMap<String, TreeNode>,
    on_change: Option<EventHandler>,
    on_poll: Option<EventHandler>,
    on_timer: Option<EventHandler>,
    supports_on_change: bool,
    target_defined_mode: Option<TargetDefinedPolicy>,
    /// Event kinds this node's own handlers emit updates for.
    event_kinds: BTreeSet<EventKind>,
}

impl TreeNode {
    pub(crate) fn root() -> Self {
        Self::new("", Path::root())
    }

    fn new(name: &str, path: Path) -> Self {
        Self {
            name: name.to_string(),
            path,
            children: BTreeMap::new(),
            on_change: None,
            on_poll: None,
            on_timer: None,
            supports_on_change: false,
            target_defined_mode: None,
            event_kinds: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Reconstructs this node's own path, preserving wildcard keys.
    pub fn get_path(&self) -> Path {
        self.path.clone()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.values()
    }

    /// Adds (or revisits) a structural child named `name`.
    pub(crate) fn get_or_add_child(&mut self, name: &str) -> &mut TreeNode {
        let path = self.path.clone().push(PathElem::new(name));
        self.children
            .entry(name.to_string())
            .or_insert_with(|| TreeNode::new(name, path))
    }

    /// Adds (or revisits) a key-value child: `self` must be the structural
    /// node of a keyed list, `value` becomes the child's name.
    pub(crate) fn get_or_add_key_child(&mut self, key_name: &str, value: &str) -> &mut TreeNode {
        let mut elems = self.path.elem().to_vec();
        let last = elems
            .last_mut()
            .expect("key-value children hang off a named structural node");
        let mut keyed = last.clone();
        keyed.insert_key(key_name, value);
        *last = keyed;
        let path = Path::new(elems);
        self.children
            .entry(value.to_string())
            .or_insert_with(|| TreeNode::new(value, path))
    }

    pub(crate) fn set_on_poll(&mut self, handler: EventHandler) -> &mut Self {
        self.on_poll = Some(handler);
        self
    }

    pub(crate) fn set_on_timer(&mut self, handler: EventHandler) -> &mut Self {
        self.on_timer = Some(handler);
        self
    }

    pub(crate) fn set_on_change(
        &mut self,
        handler: EventHandler,
        kinds: impl IntoIterator<Item = EventKind>,
    ) -> &mut Self {
        self.on_change = Some(handler);
        self.supports_on_change = true;
        self.event_kinds.extend(kinds);
        self
    }

    pub(crate) fn set_target_defined_mode(&mut self, policy: TargetDefinedPolicy) -> &mut Self {
        self.target_defined_mode = Some(policy);
        self
    }

    pub fn handler(&self, mode: HandlerMode) -> Option<EventHandler> {
        match mode {
            HandlerMode::OnChange => self.on_change.clone(),
            HandlerMode::OnPoll => self.on_poll.clone(),
            HandlerMode::OnTimer => self.on_timer.clone(),
        }
    }

    /// True iff every leaf reachable from this node supports `mode`.
    pub fn all_subtree_leaves_support(&self, mode: HandlerMode) -> bool {
        if self.is_leaf() {
            return match mode {
                HandlerMode::OnChange => self.supports_on_change,
                HandlerMode::OnPoll => self.on_poll.is_some(),
                HandlerMode::OnTimer => self.on_timer.is_some(),
            };
        }
        self.children
            .values()
            .all(|child| child.all_subtree_leaves_support(mode))
    }

    /// Applies the target-defined policy; non-specialized nodes leave the
    /// subscription untouched.
    pub fn apply_target_defined_mode(&self, subscription: &mut Subscription) -> Result<(), Status> {
        match &self.target_defined_mode {
            Some(policy) => policy(subscription),
            None => Ok(()),
        }
    }

    /// Union of event kinds emitted anywhere in this subtree.
    pub fn subtree_event_kinds(&self) -> BTreeSet<EventKind> {
        let mut kinds = BTreeSet::new();
        self.collect_event_kinds(&mut kinds);
        kinds
    }

    fn collect_event_kinds(&self, into: &mut BTreeSet<EventKind>) {
        into.extend(self.event_kinds.iter().copied());
        for child in self.children.values() {
            child.collect_event_kinds(into);
        }
    }

    /// Collects the `mode` handlers of every leaf in this subtree.
    pub fn collect_leaf_handlers(&self, mode: HandlerMode, into: &mut Vec<EventHandler>) {
        if self.is_leaf() {
            if let Some(handler) = self.handler(mode) {
                into.push(handler);
            }
            return;
        }
        for child in self.children.values() {
            child.collect_leaf_handlers(mode, into);
        }
    }

    /// Walks the tree element by element; keyed elements descend through the
    /// structural node and then the key value, with wildcard tolerance when
    /// the exact value is absent and exactly one child matches.
    pub fn find_node(&self, path: &Path) -> Option<&TreeNode> {
        let mut node = self;
        for elem in path.elem() {
            node = node.children.get(elem.name())?;
            for key_value in elem.key().values() {
                node = node.child_for_key(key_value)?;
            }
        }
        Some(node)
    }

    fn child_for_key(&self, value: &str) -> Option<&TreeNode> {
        if let Some(child) = self.children.get(value) {
            return Some(child);
        }
        if value == "*" {
            // A wildcard request matches a single concrete entry, never an
            // ambiguous set.
            let mut concrete = self.children.values();
            let candidate = concrete.next()?;
            if concrete.next().is_some() {
                return None;
            }
            return Some(candidate);
        }
        self.children.get("*")
    }

    /// Runs `action` on the node at `subpath` under every non-wildcard
    /// key-value entry matched by `prefix`.
    ///
    /// `prefix` addresses the structural list node (keyless), e.g.
    /// `/interfaces/interface`; entries without the subpath are skipped.
    pub fn perform_action_for_all_non_wildcard_nodes(
        &self,
        prefix: &Path,
        subpath: &Path,
        action: &mut dyn FnMut(&TreeNode) -> Result<(), Status>,
    ) -> Result<(), Status> {
        let Some(list_node) = self.find_node(prefix) else {
            return Ok(());
        };
        for entry in list_node.children.values() {
            if entry.name == "*" {
                continue;
            }
            if let Some(target) = entry.find_node(subpath) {
                action(target)?;
            }
        }
        Ok(())
    }
}
