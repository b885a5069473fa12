//! The falling-block strip.
//!
//! Cells are stored bottom-to-top: index 0 is the floor, the last index is the
//! spawn point. Every operation keeps the length fixed at [`STRIP_LEN`].

use embassy_time::Instant;
use rand::Rng;

use crate::{
    config::STRIP_LEN,
    power_up::PowerUps,
};

/// One of the three block / shot colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BlockColor {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl BlockColor {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Colour for a button / palette index, `None` past the last colour.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }

    /// Uniformly random colour.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cell {
    #[default]
    Empty,
    Colored(BlockColor),
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn color(self) -> Option<BlockColor> {
        match self {
            Self::Empty => None,
            Self::Colored(color) => Some(color),
        }
    }
}

/// Fixed-length column of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Strip {
    cells: [Cell; STRIP_LEN],
}

impl Default for Strip {
    fn default() -> Self {
        Self::new()
    }
}

impl Strip {
    pub const fn new() -> Self {
        Self {
            cells: [Cell::Empty; STRIP_LEN],
        }
    }

    /// Strip whose bottom cells are `bottom`; the rest is empty. Extra
    /// entries beyond the strip length are ignored.
    pub fn from_bottom(bottom: &[Cell]) -> Self {
        let mut strip = Self::new();
        for (cell, &value) in strip.cells.iter_mut().zip(bottom) {
            *cell = value;
        }
        strip
    }

    pub const fn len(&self) -> usize {
        STRIP_LEN
    }

    pub fn cells(&self) -> &[Cell; STRIP_LEN] {
        &self.cells
    }

    /// Cell at `index`, `Empty` when out of range.
    pub fn get(&self, index: usize) -> Cell {
        self.cells.get(index).copied().unwrap_or(Cell::Empty)
    }

    /// Overwrites one cell. Out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = cell;
        }
    }

    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; STRIP_LEN];
    }

    /// True when no block is left ("perfect clear").
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    /// A block sits on the floor cell.
    pub fn floor_reached(&self) -> bool {
        !self.cells[0].is_empty()
    }

    /// Rolls the cell that enters at the top on the next gravity step.
    ///
    /// While mono-colour is active the only colour that can spawn is the mono
    /// colour; otherwise each of the three colours is equally likely.
    pub fn spawn_color<R: Rng>(
        now: Instant,
        power_ups: &PowerUps,
        fill_probability: f64,
        rng: &mut R,
    ) -> Cell {
        let filled = rng.gen_bool(fill_probability.clamp(0.0, 1.0));
        if let Some(mono) = power_ups.mono_color(now) {
            return if filled { Cell::Colored(mono) } else { Cell::Empty };
        }
        if filled {
            Cell::Colored(BlockColor::random(rng))
        } else {
            Cell::Empty
        }
    }

    /// Moves every cell one step towards the floor and puts `spawn()` on top.
    ///
    /// The caller must check [`floor_reached`](Self::floor_reached) afterwards.
    pub fn shift_down(&mut self, spawn: impl FnOnce() -> Cell) {
        self.cells.copy_within(1.., 0);
        self.cells[STRIP_LEN - 1] = spawn();
    }

    /// Inclusive bounds of the same-colour run containing `index`.
    fn chain_bounds(&self, index: usize) -> Option<(usize, usize)> {
        let color = self.cells.get(index)?.color()?;
        let same = |i: usize| self.cells[i].color() == Some(color);

        let mut start = index;
        while start > 0 && same(start - 1) {
            start -= 1;
        }
        let mut end = index;
        while end < STRIP_LEN - 1 && same(end + 1) {
            end += 1;
        }
        Some((start, end))
    }

    /// Removes the same-colour run through `index` and drops everything above
    /// it by the run length. Returns the run length, 0 for an empty or
    /// out-of-range cell.
    pub fn clear_chain_at(&mut self, index: usize) -> usize {
        let Some((start, end)) = self.chain_bounds(index) else {
            return 0;
        };
        let length = end - start + 1;

        self.cells.copy_within(end + 1.., start);
        self.cells[STRIP_LEN - length..].fill(Cell::Empty);
        length
    }

    /// Rocket variant: blows away the run through `index` and every block
    /// above it, then compacts the survivors to the floor in their original
    /// order. Returns the number of blocks removed.
    pub fn clear_chain_rocket(&mut self, index: usize) -> usize {
        let Some((start, _)) = self.chain_bounds(index) else {
            return 0;
        };

        let mut cleared = 0;
        for cell in &mut self.cells[start..] {
            if !cell.is_empty() {
                *cell = Cell::Empty;
                cleared += 1;
            }
        }

        self.compact();
        cleared
    }

    /// Packs all blocks against the floor, preserving order.
    fn compact(&mut self) {
        let mut write = 0;
        for read in 0..STRIP_LEN {
            if !self.cells[read].is_empty() {
                self.cells[write] = self.cells[read];
                write += 1;
            }
        }
        self.cells[write..].fill(Cell::Empty);
    }

    /// Paints every block `color` (mono-colour power-up).
    pub fn recolor_all(&mut self, color: BlockColor) {
        for cell in &mut self.cells {
            if !cell.is_empty() {
                *cell = Cell::Colored(color);
            }
        }
    }
}
