//! U8 archive container used by the NSMB family's level files.
//!
//! Layout (big-endian):
//! - header: magic `55 AA 38 2D`, root node offset, node table + string
//!   table size, data offset, 16 reserved bytes
//! - node table: 12-byte nodes `type:u8 name:u24 offset:u32 size:u32`.
//!   For directories `offset` is the parent index and `size` the index one
//!   past the last descendant. Node 0 is the unnamed root directory.
//! - string table of NUL-terminated names, then 32-byte aligned file data.
//!
//! Files are exposed by slash-joined path; empty directories are dropped.

use tilewright_core::LevelError;

pub const U8_MAGIC: [u8; 4] = [0x55, 0xAA, 0x38, 0x2D];

const HEADER_LEN: usize = 0x20;
const NODE_LEN: usize = 12;
const DATA_ALIGN: usize = 0x20;

const NODE_FILE: u8 = 0;
const NODE_DIR: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct U8File {
    pub path: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct U8Archive {
    files: Vec<U8File>,
}

struct RawNode {
    kind: u8,
    name_offset: usize,
    offset: u32,
    size: u32,
}

fn corrupt(msg: impl Into<String>) -> LevelError {
    LevelError::CorruptData(msg.into())
}

fn read_u32(data: &[u8], at: usize) -> Result<u32, LevelError> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| corrupt(format!("read past end of archive at {at:#x}")))
}

fn read_node(data: &[u8], at: usize) -> Result<RawNode, LevelError> {
    let word = read_u32(data, at)?;
    Ok(RawNode {
        kind: (word >> 24) as u8,
        name_offset: (word & 0x00FF_FFFF) as usize,
        offset: read_u32(data, at + 4)?,
        size: read_u32(data, at + 8)?,
    })
}

fn read_name(strings: &[u8], offset: usize) -> Result<String, LevelError> {
    let tail = strings
        .get(offset..)
        .ok_or_else(|| corrupt(format!("name offset {offset:#x} outside string table")))?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| corrupt("unterminated name in string table"))?;
    std::str::from_utf8(&tail[..len])
        .map(str::to_string)
        .map_err(|_| corrupt(format!("name at {offset:#x} is not valid UTF-8")))
}

fn align(value: usize, to: usize) -> usize {
    value.div_ceil(to) * to
}

impl U8Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap check of the magic bytes.
    pub fn sniff(data: &[u8]) -> bool {
        data.starts_with(&U8_MAGIC)
    }

    pub fn files(&self) -> &[U8File] {
        &self.files
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.data.as_slice())
    }

    /// Insert or replace a file, keeping the position of an existing entry.
    pub fn set(&mut self, path: &str, data: Vec<u8>) {
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(file) => file.data = data,
            None => self.files.push(U8File {
                path: path.to_string(),
                data,
            }),
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, LevelError> {
        if !Self::sniff(data) {
            return Err(LevelError::Format("U8 archive".into()));
        }
        if data.len() < HEADER_LEN {
            return Err(corrupt("truncated archive header"));
        }

        let root_at = read_u32(data, 4)? as usize;
        let header_size = read_u32(data, 8)? as usize;
        let root = read_node(data, root_at)?;
        if root.kind != NODE_DIR {
            return Err(corrupt("root node is not a directory"));
        }
        let count = root.size as usize;
        if count == 0 {
            return Err(corrupt("empty node table"));
        }

        let strings_start = count
            .checked_mul(NODE_LEN)
            .and_then(|len| root_at.checked_add(len))
            .ok_or_else(|| corrupt("node table size overflows"))?;
        let strings_end = root_at
            .checked_add(header_size)
            .filter(|&end| end >= strings_start && end <= data.len())
            .ok_or_else(|| corrupt("node table out of bounds"))?;
        let strings = &data[strings_start..strings_end];

        // Open directories as (name, index one past their last descendant).
        let mut dirs: Vec<(String, usize)> = Vec::new();
        let mut files = Vec::new();
        for index in 1..count {
            while dirs.last().is_some_and(|&(_, end)| index >= end) {
                dirs.pop();
            }
            let node = read_node(data, root_at + index * NODE_LEN)?;
            let name = read_name(strings, node.name_offset)?;
            match node.kind {
                NODE_FILE => {
                    let start = node.offset as usize;
                    let end = start
                        .checked_add(node.size as usize)
                        .filter(|&end| end <= data.len())
                        .ok_or_else(|| corrupt(format!("file '{name}' data out of bounds")))?;
                    let mut path: Vec<&str> = dirs.iter().map(|(d, _)| d.as_str()).collect();
                    path.push(&name);
                    files.push(U8File {
                        path: path.join("/"),
                        data: data[start..end].to_vec(),
                    });
                },
                NODE_DIR => {
                    let end = node.size as usize;
                    if end <= index || end > count {
                        return Err(corrupt(format!("directory '{name}' has invalid bounds")));
                    }
                    dirs.push((name, end));
                },
                other => return Err(corrupt(format!("unknown node type {other}"))),
            }
        }

        Ok(Self { files })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut root = DirEntry::default();
        for (index, file) in self.files.iter().enumerate() {
            root.insert(&file.path, index);
        }

        let mut nodes = vec![RawNode {
            kind: NODE_DIR,
            name_offset: 0,
            offset: 0,
            size: 0,
        }];
        let mut strings = vec![0u8];
        let mut file_nodes = Vec::new();
        root.flatten(0, &mut nodes, &mut strings, &mut file_nodes);
        nodes[0].size = nodes.len() as u32;

        let header_size = nodes.len() * NODE_LEN + strings.len();
        let data_offset = align(HEADER_LEN + header_size, DATA_ALIGN);

        let mut cursor = data_offset;
        for &(node_index, file_index) in &file_nodes {
            let data = &self.files[file_index].data;
            nodes[node_index].offset = cursor as u32;
            nodes[node_index].size = data.len() as u32;
            cursor = align(cursor + data.len(), DATA_ALIGN);
        }

        let mut out = Vec::with_capacity(cursor);
        out.extend_from_slice(&U8_MAGIC);
        out.extend_from_slice(&(HEADER_LEN as u32).to_be_bytes());
        out.extend_from_slice(&(header_size as u32).to_be_bytes());
        out.extend_from_slice(&(data_offset as u32).to_be_bytes());
        out.resize(HEADER_LEN, 0);
        for node in &nodes {
            let word = ((node.kind as u32) << 24) | (node.name_offset as u32 & 0x00FF_FFFF);
            out.extend_from_slice(&word.to_be_bytes());
            out.extend_from_slice(&node.offset.to_be_bytes());
            out.extend_from_slice(&node.size.to_be_bytes());
        }
        out.extend_from_slice(&strings);
        for &(node_index, file_index) in &file_nodes {
            out.resize(nodes[node_index].offset as usize, 0);
            out.extend_from_slice(&self.files[file_index].data);
        }
        out.resize(cursor.max(data_offset), 0);
        out
    }
}

/// Directory tree built from file paths, in first-seen order.
#[derive(Default)]
struct DirEntry {
    children: Vec<(String, Child)>,
}

enum Child {
    Dir(DirEntry),
    File(usize),
}

impl DirEntry {
    fn insert(&mut self, path: &str, file_index: usize) {
        match path.split_once('/') {
            Some((dir, rest)) => {
                let existing = self
                    .children
                    .iter()
                    .position(|(name, child)| name == dir && matches!(child, Child::Dir(_)));
                let at = existing.unwrap_or_else(|| {
                    self.children.push((dir.to_string(), Child::Dir(DirEntry::default())));
                    self.children.len() - 1
                });
                if let Child::Dir(sub) = &mut self.children[at].1 {
                    sub.insert(rest, file_index);
                }
            },
            None => self.children.push((path.to_string(), Child::File(file_index))),
        }
    }

    fn flatten(
        &self,
        parent: usize,
        nodes: &mut Vec<RawNode>,
        strings: &mut Vec<u8>,
        file_nodes: &mut Vec<(usize, usize)>,
    ) {
        for (name, child) in &self.children {
            let name_offset = strings.len();
            strings.extend_from_slice(name.as_bytes());
            strings.push(0);
            match child {
                Child::File(file_index) => {
                    file_nodes.push((nodes.len(), *file_index));
                    nodes.push(RawNode {
                        kind: NODE_FILE,
                        name_offset,
                        offset: 0,
                        size: 0,
                    });
                },
                Child::Dir(sub) => {
                    let index = nodes.len();
                    nodes.push(RawNode {
                        kind: NODE_DIR,
                        name_offset,
                        offset: parent as u32,
                        size: 0,
                    });
                    sub.flatten(index, nodes, strings, file_nodes);
                    nodes[index].size = nodes.len() as u32;
                },
            }
        }
    }
}
