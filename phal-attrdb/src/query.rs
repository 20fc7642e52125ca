//! Wire-side path queries and their internal attribute-path form.

use gnmi_wire::{Code, Status};

/// One entry of a wire-side path query.
///
/// `indexed`/`all` address repeated groups: a concrete index, or every
/// index; `terminal_group` truncates the walk and returns the whole subtree.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryEntry {
    pub name: String,
    pub index: u32,
    pub indexed: bool,
    pub all: bool,
    pub terminal_group: bool,
}

impl QueryEntry {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn indexed(name: &str, index: u32) -> Self {
        Self {
            name: name.to_string(),
            index,
            indexed: true,
            ..Default::default()
        }
    }
}

/// A wire-side query: an ordered list of entries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathQuery {
    pub entries: Vec<QueryEntry>,
}

/// One entry of the internal attribute-database path.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AttrPathEntry {
    pub name: String,
    pub index: u32,
    pub indexed: bool,
    pub all: bool,
    pub terminal_group: bool,
}

/// The attribute database's own path form.
pub type AttrPath = Vec<AttrPathEntry>;

impl PathQuery {
    /// Converts the wire query into the database path form; an empty query
    /// is invalid.
    pub fn to_attr_path(&self) -> Result<AttrPath, Status> {
        if self.entries.is_empty() {
            return Err(Status::fail_with_code(Code::InvalidArgument, "No Path"));
        }
        Ok(self
            .entries
            .iter()
            .map(|entry| AttrPathEntry {
                name: entry.name.clone(),
                index: entry.index,
                indexed: entry.indexed,
                all: entry.all,
                terminal_group: entry.terminal_group,
            })
            .collect())
    }
}
