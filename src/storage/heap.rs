//! A minimal in-memory slotted-page heap file and the relation built on it.
//!
//! Blocks are plain `Vec<u8>` kept in a `HashMap<u32, Vec<u8>>` rather than
//! paged out to disk. Each block has a two-byte slot count, a directory of
//! `(offset, length)` pairs (a zero length marks a deleted slot), and record
//! bytes packed after the directory in slot order. There is no space reuse
//! after a delete and no page splitting; a block simply stops accepting new
//! records once it would exceed the configured block size, and the caller
//! allocates a fresh one.

use crate::error::CoreError;
use crate::relation::{DbFile, DbRelation};
use crate::schema::{ColumnAttribute, ColumnAttributes, ColumnNames, Handle};
use crate::value::{Row, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeapError {
    #[error("file '{0}' already exists")]
    AlreadyExists(String),
    #[error("file '{0}' is not open")]
    NotOpen(String),
    #[error("block {0} does not exist")]
    NoSuchBlock(u32),
    #[error("slot {0} does not exist in block {1}")]
    NoSuchSlot(u16, u32),
    #[error("record does not fit in a block of {0} bytes")]
    RecordTooLarge(usize),
    #[error("corrupt block: {0}")]
    Corrupt(&'static str),
}

fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn read_u16(buf: &[u8], at: usize) -> Result<u16, HeapError> {
    buf.get(at..at + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(HeapError::Corrupt("truncated u16"))
}

/// Encodes a row as a sequence of `(key_len, key, tag, value)` fields, in
/// the row's natural (sorted) key order, so encoding is deterministic.
fn encode_row(row: &Row) -> Vec<u8> {
    let mut buf = Vec::new();
    for (key, value) in row.iter() {
        write_u16(&mut buf, key.len() as u16);
        buf.extend_from_slice(key.as_bytes());
        match value {
            Value::Int(n) => {
                buf.push(0);
                buf.extend_from_slice(&n.to_le_bytes());
            }
            Value::Text(s) => {
                buf.push(1);
                write_u16(&mut buf, s.len() as u16);
                buf.extend_from_slice(s.as_bytes());
            }
            Value::Boolean(b) => {
                buf.push(2);
                buf.push(if *b { 1 } else { 0 });
            }
        }
    }
    buf
}

fn decode_row(bytes: &[u8]) -> Result<Row, HeapError> {
    let mut row = Row::new();
    let mut pos = 0usize;
    while pos < bytes.len() {
        let key_len = read_u16(bytes, pos)? as usize;
        pos += 2;
        let key = std::str::from_utf8(&bytes[pos..pos + key_len])
            .map_err(|_| HeapError::Corrupt("invalid utf8 in column name"))?
            .to_string();
        pos += key_len;
        let tag = *bytes.get(pos).ok_or(HeapError::Corrupt("truncated tag"))?;
        pos += 1;
        let value = match tag {
            0 => {
                let n = i64::from_le_bytes(
                    bytes[pos..pos + 8]
                        .try_into()
                        .map_err(|_| HeapError::Corrupt("truncated int"))?,
                );
                pos += 8;
                Value::Int(n)
            }
            1 => {
                let len = read_u16(bytes, pos)? as usize;
                pos += 2;
                let s = std::str::from_utf8(&bytes[pos..pos + len])
                    .map_err(|_| HeapError::Corrupt("invalid utf8 in text value"))?
                    .to_string();
                pos += len;
                Value::Text(s)
            }
            2 => {
                let b = *bytes.get(pos).ok_or(HeapError::Corrupt("truncated bool"))?;
                pos += 1;
                Value::Boolean(b != 0)
            }
            _ => return Err(HeapError::Corrupt("unknown value tag")),
        };
        row.insert(key, value);
    }
    Ok(row)
}

fn directory_len(block: &[u8]) -> Result<u16, HeapError> {
    read_u16(block, 0)
}

fn new_block() -> Vec<u8> {
    let mut b = Vec::new();
    write_u16(&mut b, 0);
    b
}

/// Appends a record, returning its slot id and the rewritten block, or an
/// error if the record does not fit within `block_size`.
fn add_record(block: &[u8], record: &[u8], block_size: usize) -> Result<(u16, Vec<u8>), HeapError> {
    let num_slots = directory_len(block)?;
    let dir_end = 2 + num_slots as usize * 4;
    let records_start = dir_end;
    let records: Vec<u8> = block[records_start..].to_vec();

    let new_dir_end = dir_end + 4;
    let new_total = new_dir_end + records.len() + record.len();
    if new_total > block_size {
        return Err(HeapError::RecordTooLarge(record.len()));
    }

    let mut out = Vec::with_capacity(new_total);
    write_u16(&mut out, num_slots + 1);
    out.extend_from_slice(&block[2..dir_end]);
    write_u16(&mut out, records.len() as u16);
    write_u16(&mut out, record.len() as u16);
    out.extend_from_slice(&records);
    out.extend_from_slice(record);
    Ok((num_slots, out))
}

fn read_record(block: &[u8], slot_id: u16) -> Result<Option<Vec<u8>>, HeapError> {
    let num_slots = directory_len(block)?;
    if slot_id >= num_slots {
        return Err(HeapError::Corrupt("slot id out of range"));
    }
    let entry_at = 2 + slot_id as usize * 4;
    let offset = read_u16(block, entry_at)? as usize;
    let length = read_u16(block, entry_at + 2)? as usize;
    if length == 0 {
        return Ok(None);
    }
    let dir_end = 2 + num_slots as usize * 4;
    let start = dir_end + offset;
    Ok(Some(block[start..start + length].to_vec()))
}

/// Marks a slot deleted in place (zero-length directory entry). The record
/// bytes are left in the block; they are simply never addressed again.
fn delete_record(block: &[u8], slot_id: u16) -> Result<Vec<u8>, HeapError> {
    let num_slots = directory_len(block)?;
    if slot_id >= num_slots {
        return Err(HeapError::Corrupt("slot id out of range"));
    }
    let mut out = block.to_vec();
    let entry_at = 2 + slot_id as usize * 4;
    out[entry_at + 2] = 0;
    out[entry_at + 3] = 0;
    Ok(out)
}

fn live_slots(block: &[u8]) -> Result<Vec<u16>, HeapError> {
    let num_slots = directory_len(block)?;
    let mut out = Vec::new();
    for slot_id in 0..num_slots {
        let entry_at = 2 + slot_id as usize * 4;
        let length = read_u16(block, entry_at + 2)?;
        if length > 0 {
            out.push(slot_id);
        }
    }
    Ok(out)
}

/// In-memory block file, named the way spec.md §6 names on-disk files
/// (table name, or `<table>-<index>`), addressed by an incrementing block id.
pub struct HeapFile {
    name: String,
    block_size: usize,
    blocks: HashMap<u32, Vec<u8>>,
    next_block_id: u32,
    is_open: bool,
}

impl HeapFile {
    pub fn new(name: impl Into<String>, block_size: usize) -> Self {
        HeapFile {
            name: name.into(),
            block_size,
            blocks: HashMap::new(),
            next_block_id: 1,
            is_open: false,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl DbFile for HeapFile {
    fn create(&mut self) -> crate::error::Result<()> {
        if self.is_open || !self.blocks.is_empty() {
            return Err(CoreError::StorageError(HeapError::AlreadyExists(
                self.name.clone(),
            )));
        }
        self.is_open = true;
        Ok(())
    }

    fn drop_file(&mut self) -> crate::error::Result<()> {
        self.blocks.clear();
        self.next_block_id = 1;
        self.is_open = false;
        Ok(())
    }

    fn open(&mut self) -> crate::error::Result<()> {
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> crate::error::Result<()> {
        self.is_open = false;
        Ok(())
    }

    fn get_new_block(&mut self) -> crate::error::Result<u32> {
        let id = self.next_block_id;
        self.next_block_id += 1;
        self.blocks.insert(id, new_block());
        Ok(id)
    }

    fn get_block(&self, block_id: u32) -> crate::error::Result<Vec<u8>> {
        if !self.is_open {
            return Err(CoreError::StorageError(HeapError::NotOpen(self.name.clone())));
        }
        self.blocks
            .get(&block_id)
            .cloned()
            .ok_or(CoreError::StorageError(HeapError::NoSuchBlock(block_id)))
    }

    fn put_block(&mut self, block_id: u32, data: Vec<u8>) -> crate::error::Result<()> {
        if !self.blocks.contains_key(&block_id) {
            return Err(CoreError::StorageError(HeapError::NoSuchBlock(block_id)));
        }
        self.blocks.insert(block_id, data);
        Ok(())
    }

    fn block_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.blocks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// A heap-organized relation backed by a [`HeapFile`].
pub struct HeapTable {
    table_name: String,
    column_names: ColumnNames,
    column_attributes: ColumnAttributes,
    file: HeapFile,
}

impl HeapTable {
    pub fn new(
        table_name: impl Into<String>,
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
        block_size: usize,
    ) -> Self {
        let table_name = table_name.into();
        let file = HeapFile::new(table_name.clone(), block_size);
        HeapTable {
            table_name,
            column_names,
            column_attributes,
            file,
        }
    }

    fn append(&mut self, encoded: &[u8]) -> crate::error::Result<Handle> {
        let block_size = self.file.block_size();
        let mut ids = self.file.block_ids();
        if let Some(&last) = ids.last() {
            let block = self.file.get_block(last)?;
            if let Ok((slot_id, new_block)) = add_record(&block, encoded, block_size) {
                self.file.put_block(last, new_block)?;
                return Ok(Handle::new(last, slot_id));
            }
        }
        let block_id = self.file.get_new_block()?;
        ids.push(block_id);
        let block = self.file.get_block(block_id)?;
        let (slot_id, new_block) = add_record(&block, encoded, block_size)
            .map_err(CoreError::StorageError)?;
        self.file.put_block(block_id, new_block)?;
        Ok(Handle::new(block_id, slot_id))
    }

    fn row_matches(row: &Row, where_clause: &Row) -> bool {
        where_clause.iter().all(|(k, v)| row.get(k) == Some(v))
    }
}

impl DbRelation for HeapTable {
    fn create(&mut self) -> crate::error::Result<()> {
        self.file.create()
    }

    fn create_if_not_exists(&mut self) -> crate::error::Result<()> {
        match self.file.create() {
            Ok(()) => Ok(()),
            Err(CoreError::StorageError(HeapError::AlreadyExists(_))) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn drop_relation(&mut self) -> crate::error::Result<()> {
        self.file.drop_file()
    }

    fn open(&mut self) -> crate::error::Result<()> {
        self.file.open()
    }

    fn close(&mut self) -> crate::error::Result<()> {
        self.file.close()
    }

    fn insert(&mut self, row: &Row) -> crate::error::Result<Handle> {
        let encoded = encode_row(row);
        self.append(&encoded)
    }

    fn del(&mut self, handle: Handle) -> crate::error::Result<()> {
        let block = self.file.get_block(handle.block_id)?;
        let new_block =
            delete_record(&block, handle.slot_id).map_err(CoreError::StorageError)?;
        self.file.put_block(handle.block_id, new_block)
    }

    fn update(&mut self, handle: Handle, row: &Row) -> crate::error::Result<()> {
        self.del(handle)?;
        self.insert(row)?;
        Ok(())
    }

    fn select(&self, where_clause: Option<&Row>) -> crate::error::Result<Vec<Handle>> {
        let mut out = Vec::new();
        for block_id in self.file.block_ids() {
            let block = self.file.get_block(block_id)?;
            for slot_id in live_slots(&block).map_err(CoreError::StorageError)? {
                let bytes = read_record(&block, slot_id)
                    .map_err(CoreError::StorageError)?
                    .expect("slot reported live");
                let matches = match where_clause {
                    None => true,
                    Some(w) => {
                        let row = decode_row(&bytes).map_err(CoreError::StorageError)?;
                        Self::row_matches(&row, w)
                    }
                };
                if matches {
                    out.push(Handle::new(block_id, slot_id));
                }
            }
        }
        Ok(out)
    }

    fn project(&self, handle: Handle, columns: Option<&[String]>) -> crate::error::Result<Row> {
        let block = self.file.get_block(handle.block_id)?;
        let bytes = read_record(&block, handle.slot_id)
            .map_err(CoreError::StorageError)?
            .ok_or(CoreError::StorageError(HeapError::NoSuchSlot(
                handle.slot_id,
                handle.block_id,
            )))?;
        let row = decode_row(&bytes).map_err(CoreError::StorageError)?;
        match columns {
            None => Ok(row),
            Some(cols) => Ok(cols
                .iter()
                .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                .collect()),
        }
    }

    fn get_column_names(&self) -> ColumnNames {
        self.column_names.clone()
    }

    fn get_column_attributes(&self, columns: Option<&[String]>) -> ColumnAttributes {
        match columns {
            None => self.column_attributes.clone(),
            Some(cols) => cols
                .iter()
                .filter_map(|c| {
                    self.column_names
                        .iter()
                        .position(|n| n == c)
                        .map(|i| self.column_attributes[i])
                })
                .collect(),
        }
    }

    fn get_table_name(&self) -> &str {
        &self.table_name
    }
}
