//! Row sets over worksheet row indices, backed by roaring bitmaps.

use std::ops::Range;

use roaring::RoaringBitmap;

/// Worksheet row index as tracked by row sets.
pub type RowId = u32;

/// Borrowed iterator that yields [`RowId`] values in ascending order.
pub type RowIdIter<'a> = Box<dyn Iterator<Item = RowId> + Send + 'a>;

/// Row selection produced while evaluating a predicate over a row window.
pub trait RowSet: Send + Sync {
    /// Selected rows, ascending.
    fn iter(&self) -> RowIdIter<'_>;

    /// Rows selected by both sets.
    fn intersect(&self, other: &Self) -> Self
    where
        Self: Sized;

    /// Rows selected by either set.
    fn union(&self, other: &Self) -> Self
    where
        Self: Sized;
}

/// [`RowSet`] implementation backed by a roaring bitmap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BitmapRowSet {
    bitmap: RoaringBitmap,
}

impl BitmapRowSet {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every row of a window.
    #[must_use]
    pub fn from_range(range: Range<RowId>) -> Self {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert_range(range);
        Self { bitmap }
    }

    /// Adds a matching row.
    pub fn insert(&mut self, row: RowId) {
        self.bitmap.insert(row);
    }
}

impl RowSet for BitmapRowSet {
    fn iter(&self) -> RowIdIter<'_> {
        Box::new(self.bitmap.iter())
    }

    fn intersect(&self, other: &Self) -> Self {
        Self {
            bitmap: &self.bitmap & &other.bitmap,
        }
    }

    fn union(&self, other: &Self) -> Self {
        Self {
            bitmap: &self.bitmap | &other.bitmap,
        }
    }
}
