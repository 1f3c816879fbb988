//! Grid cell addressing and the key → cell binding table.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::keys::KeyId;

/// Cells per grid side.
pub const GRID_SIZE: usize = 3;

/// One of the nine cells of the 3x3 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    row: u8,
    col: u8,
}

impl Cell {
    /// Panics when `row` or `col` is outside `0..3`.
    pub fn new(row: usize, col: usize) -> Self {
        Self::try_new(row, col)
            .unwrap_or_else(|| panic!("grid cell ({}, {}) outside the 3x3 grid", row, col))
    }

    pub fn try_new(row: usize, col: usize) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    /// All cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Cell::new(row, col)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Injective mapping from keys to grid cells.
///
/// Every cell has at most one key and every key at most one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    by_key: HashMap<KeyId, Cell>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            by_key: HashMap::new(),
        }
    }

    /// Build from a row-major layout where `None` leaves a cell unbound. Rows
    /// and entries beyond the 3x3 grid are rejected, as is a key listed for
    /// two cells.
    pub fn from_rows(rows: &[Vec<Option<KeyId>>]) -> Result<Self> {
        let mut bindings = Self::empty();
        for (row, keys) in rows.iter().enumerate() {
            for (col, key) in keys.iter().enumerate() {
                let cell = Cell::try_new(row, col).ok_or(Error::CellOutOfRange { row, col })?;
                let Some(key) = key else { continue };
                if let Some(first) = bindings.lookup(key) {
                    return Err(Error::DuplicateBinding {
                        key: key.to_string(),
                        first,
                        second: cell,
                    });
                }
                bindings.rebind(key.clone(), cell);
            }
        }
        Ok(bindings)
    }

    /// Bind `key` to `cell`, dropping the key's previous cell and whatever key
    /// held `cell` before. Returns the displaced key, if any.
    pub fn rebind(&mut self, key: KeyId, cell: Cell) -> Option<KeyId> {
        let displaced = self
            .by_key
            .iter()
            .find(|(k, c)| **c == cell && **k != key)
            .map(|(k, _)| k.clone());
        if let Some(ref old) = displaced {
            self.by_key.remove(old);
        }
        self.by_key.remove(&key);
        self.by_key.insert(key, cell);
        displaced
    }

    pub fn lookup(&self, key: &KeyId) -> Option<Cell> {
        self.by_key.get(key).copied()
    }

    pub fn key_for(&self, cell: Cell) -> Option<&KeyId> {
        self.by_key
            .iter()
            .find(|(_, c)| **c == cell)
            .map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Row-major layout with `None` for unbound cells.
    pub fn rows(&self) -> Vec<Vec<Option<KeyId>>> {
        (0..GRID_SIZE)
            .map(|row| {
                (0..GRID_SIZE)
                    .map(|col| self.key_for(Cell::new(row, col)).cloned())
                    .collect()
            })
            .collect()
    }
}

impl Default for KeyBindings {
    /// Left-hand QWERTY block: q w e / a s d / z x c.
    fn default() -> Self {
        let mut bindings = Self::empty();
        for (row, keys) in ["qwe", "asd", "zxc"].iter().enumerate() {
            for (col, c) in keys.chars().enumerate() {
                bindings.rebind(KeyId::Char(c), Cell::new(row, col));
            }
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyId {
        KeyId::Char(c)
    }

    fn slot(c: char) -> Option<KeyId> {
        Some(KeyId::Char(c))
    }

    #[test]
    fn default_layout() {
        let b = KeyBindings::default();
        assert_eq!(b.len(), 9);
        assert_eq!(b.lookup(&key('q')), Some(Cell::new(0, 0)));
        assert_eq!(b.lookup(&key('s')), Some(Cell::new(1, 1)));
        assert_eq!(b.lookup(&key('c')), Some(Cell::new(2, 2)));
        assert_eq!(b.lookup(&key('r')), None);
    }

    #[test]
    fn rebind_moves_key_and_displaces_holder() {
        let mut b = KeyBindings::default();
        let displaced = b.rebind(key('q'), Cell::new(2, 2));
        assert_eq!(displaced, Some(key('c')));
        assert_eq!(b.lookup(&key('q')), Some(Cell::new(2, 2)));
        assert_eq!(b.lookup(&key('c')), None);
        assert_eq!(b.key_for(Cell::new(0, 0)), None);
        assert_eq!(b.len(), 8);
    }

    #[test]
    fn rebind_same_cell_is_stable() {
        let mut b = KeyBindings::default();
        assert_eq!(b.rebind(key('w'), Cell::new(0, 1)), None);
        assert_eq!(b, KeyBindings::default());
    }

    #[test]
    fn rebind_new_key_onto_bound_cell() {
        let mut b = KeyBindings::default();
        assert_eq!(b.rebind(key('u'), Cell::new(0, 0)), Some(key('q')));
        assert_eq!(b.key_for(Cell::new(0, 0)), Some(&key('u')));
        assert_eq!(b.lookup(&key('q')), None);
    }

    #[test]
    fn from_rows_rejects_duplicates() {
        let rows = vec![vec![slot('a'), slot('b')], vec![slot('a')]];
        match KeyBindings::from_rows(&rows) {
            Err(Error::DuplicateBinding { first, second, .. }) => {
                assert_eq!(first, Cell::new(0, 0));
                assert_eq!(second, Cell::new(1, 0));
            }
            other => panic!("expected duplicate binding error, got {:?}", other),
        }
    }

    #[test]
    fn from_rows_rejects_oversized_grid() {
        let rows = vec![vec![slot('a'), slot('b'), slot('c'), slot('d')]];
        assert!(matches!(
            KeyBindings::from_rows(&rows),
            Err(Error::CellOutOfRange { row: 0, col: 3 })
        ));
    }

    #[test]
    fn rows_reports_unbound_cells() {
        let b = KeyBindings::from_rows(&[vec![None, slot('h')]]).unwrap();
        assert_eq!(b.len(), 1);
        let rows = b.rows();
        assert_eq!(rows[0][0], None);
        assert_eq!(rows[0][1], Some(key('h')));
        assert_eq!(rows[2][2], None);
    }

    #[test]
    #[should_panic(expected = "outside the 3x3 grid")]
    fn out_of_range_cell_panics() {
        Cell::new(3, 0);
    }
}
