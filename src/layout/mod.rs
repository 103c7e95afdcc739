//! Placing cards on sheets for double-sided printing.
//!
//! Cards fill the front of each sheet in row-major order. When the sheet is
//! turned over to print the back, the paper is flipped: along the long edge
//! a card printed in column `c` ends up behind column `cols - 1 - c`, along
//! the short edge row `r` ends up behind row `rows - 1 - r`. Backs are placed
//! with [`Duplex::back_slot`] so that after printing and cutting every card's
//! two sides belong together.
//!
//! Everything here works on card indices; rendering lives in [`page`].

use serde::Deserialize;

pub mod page;

pub use page::{PageGeometry, PageStyle, render_page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Front slot of the `card`-th card: sheets fill one after another,
    /// row-major within a sheet.
    pub fn front_slot(&self, card: usize) -> Slot {
        let sheet = card / self.capacity();
        let pos = card % self.capacity();
        Slot {
            sheet,
            row: pos / self.cols,
            col: pos % self.cols,
        }
    }

    pub fn sheet_count(&self, cards: usize) -> usize {
        cards.div_ceil(self.capacity())
    }
}

/// Which edge the printer turns the paper over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Duplex {
    /// Most printers' default: rows stay, columns mirror.
    #[default]
    LongEdge,
    /// Columns stay, rows mirror.
    ShortEdge,
}

impl Duplex {
    /// Where the back of the card printed at `front` must go.
    pub fn back_slot(self, grid: Grid, front: Slot) -> Slot {
        match self {
            Duplex::LongEdge => Slot {
                col: grid.cols - 1 - front.col,
                ..front
            },
            Duplex::ShortEdge => Slot {
                row: grid.rows - 1 - front.row,
                ..front
            },
        }
    }
}

/// How front and back pages follow each other in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageOrder {
    /// front 1, back 1, front 2, back 2, ... for printers that duplex
    #[default]
    Interleaved,
    /// all fronts, then all backs, for feeding the stack through twice
    Grouped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub sheet: usize,
    pub row: usize,
    pub col: usize,
}

/// One side of one physical sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// 0-based
    pub number: usize,
    pub side: Side,
    pub grid: Grid,
    /// Card index per slot, row-major; `None` for the unused slots of the
    /// last sheet.
    pub slots: Vec<Option<usize>>,
}

impl Sheet {
    fn empty(number: usize, side: Side, grid: Grid) -> Self {
        Self {
            number,
            side,
            grid,
            slots: vec![None; grid.capacity()],
        }
    }

    fn put(&mut self, slot: Slot, card: usize) {
        self.slots[slot.row * self.grid.cols + slot.col] = Some(card);
    }

    /// (row, col, card) for every slot, occupied or not.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Option<usize>)> + '_ {
        let cols = self.grid.cols;
        self.slots
            .iter()
            .enumerate()
            .map(move |(i, card)| (i / cols, i % cols, *card))
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[cfg(test)]
    pub fn position_of(&self, card: usize) -> Option<(usize, usize)> {
        self.cells()
            .find(|(_, _, c)| *c == Some(card))
            .map(|(row, col, _)| (row, col))
    }

    /// Footer label: `1a` is the front of the first sheet, `1b` its back.
    pub fn label(&self) -> String {
        let side = match self.side {
            Side::Front => 'a',
            Side::Back => 'b',
        };
        format!("{}{side}", self.number + 1)
    }
}

/// Front and back of one physical sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPair {
    pub front: Sheet,
    pub back: Sheet,
}

/// Distributes `cards` cards over as many sheets as needed.
pub fn paginate(cards: usize, grid: Grid, duplex: Duplex) -> Vec<SheetPair> {
    let mut pairs = (0..grid.sheet_count(cards))
        .map(|n| SheetPair {
            front: Sheet::empty(n, Side::Front, grid),
            back: Sheet::empty(n, Side::Back, grid),
        })
        .collect::<Vec<_>>();

    for card in 0..cards {
        let front = grid.front_slot(card);
        let back = duplex.back_slot(grid, front);
        let pair = &mut pairs[front.sheet];
        pair.front.put(front, card);
        pair.back.put(back, card);
    }
    pairs
}

/// The pages of the final document, in print order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deck {
    pub pages: Vec<Sheet>,
}

impl Deck {
    pub fn new(pairs: Vec<SheetPair>, order: PageOrder) -> Self {
        let pages = match order {
            PageOrder::Interleaved => pairs
                .into_iter()
                .flat_map(|p| [p.front, p.back])
                .collect(),
            PageOrder::Grouped => {
                let (fronts, backs): (Vec<_>, Vec<_>) =
                    pairs.into_iter().map(|p| (p.front, p.back)).unzip();
                fronts.into_iter().chain(backs).collect()
            }
        };
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
