use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::Serialize;

use crate::*;

/// The board: a fixed `rows x cols` array of [`Cell`]s with mines and neighbor counts already settled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Grid {
    /// Builds the grid from a mine mask, computing every safe cell's neighbor count.
    pub fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();

        let cells = Array2::from_shape_fn(mine_mask.dim(), |(row, col)| {
            let coords: Coord2 = (row.try_into().unwrap(), col.try_into().unwrap());
            let has_mine = mine_mask[coords.to_nd_index()];
            let mines_around = if has_mine {
                0
            } else {
                mine_mask
                    .iter_neighbors(coords)
                    .filter(|&pos| mine_mask[pos.to_nd_index()])
                    .count() as u8
            };
            Cell::new(coords, has_mine, mines_around)
        });

        Self { cells, mine_count }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::EmptyBoard);
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(&mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows.try_into().unwrap(), cols.try_into().unwrap())
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    /// Panics on out-of-range coordinates.
    pub fn cell(&self, coords: Coord2) -> &Cell {
        self.check_coords(coords);
        &self.cells[coords.to_nd_index()]
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        self.check_coords(coords);
        &mut self.cells[coords.to_nd_index()]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.check_coords(coords);
        NeighborIter::new(coords, self.size())
    }

    pub fn neighbor_cells(&self, coords: Coord2) -> impl Iterator<Item = &Cell> {
        self.neighbors(coords)
            .map(move |pos| &self.cells[pos.to_nd_index()])
    }

    pub fn mine_count_around(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.has_mine())
    }

    pub fn flag_count_around(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.is_flagged())
    }

    pub fn unopened_count_around(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| !cell.is_opened())
    }

    pub fn opened_count_around(&self, coords: Coord2) -> u8 {
        self.count_neighbors(coords, |cell| cell.is_opened())
    }

    /// True when no neighbor is opened, so opening this cell is a blind guess.
    pub fn is_unconstrained(&self, coords: Coord2) -> bool {
        self.neighbor_cells(coords).all(|cell| !cell.is_opened())
    }

    pub fn unopened_unflagged_cells(&self) -> Vec<Coord2> {
        self.cells()
            .filter(|cell| cell.is_unopened_unflagged())
            .map(Cell::coords)
            .collect()
    }

    /// The frontier: unopened, unflagged cells with at least one opened neighbor.
    pub fn constrained_unopened_cells(&self) -> Vec<Coord2> {
        self.cells()
            .filter(|cell| cell.is_unopened_unflagged())
            .map(Cell::coords)
            .filter(|&coords| !self.is_unconstrained(coords))
            .collect()
    }

    pub fn unopened_count(&self) -> CellCount {
        self.cells().filter(|cell| !cell.is_opened()).count() as CellCount
    }

    pub fn flag_count(&self) -> CellCount {
        self.cells().filter(|cell| cell.is_flagged()).count() as CellCount
    }

    fn count_neighbors(&self, coords: Coord2, predicate: impl Fn(&Cell) -> bool) -> u8 {
        self.neighbor_cells(coords)
            .filter(|&cell| predicate(cell))
            .count() as u8
    }

    fn check_coords(&self, coords: Coord2) {
        assert!(
            self.contains(coords),
            "coordinates {:?} out of range for a {:?} grid",
            coords,
            self.size()
        );
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        self.cell(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn grid(size: Coord2, mines: &[Coord2]) -> Grid {
        Grid::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn neighbor_counts_match_brute_force() {
        let mines = [(0, 0), (1, 2), (3, 3), (2, 0)];
        let grid = grid((4, 5), &mines);

        for cell in grid.cells() {
            if cell.has_mine() {
                continue;
            }
            let (row, col) = cell.coords();
            let expected = mines
                .iter()
                .filter(|&&(m_row, m_col)| {
                    (m_row as i16 - row as i16).abs() <= 1
                        && (m_col as i16 - col as i16).abs() <= 1
                })
                .count() as u8;
            assert_eq!(cell.mines_around(), expected, "at {:?}", cell.coords());
        }
        assert_eq!(grid.mine_count(), 4);
    }

    #[test]
    fn rejects_mines_outside_the_board() {
        assert_eq!(
            Grid::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(
            Grid::from_mine_coords((0, 3), &[]),
            Err(GameError::EmptyBoard)
        );
    }

    #[test]
    fn frontier_only_includes_cells_next_to_opened_ones() {
        let mut grid = grid((3, 3), &[(2, 2)]);
        grid.cell_mut((0, 0)).is_opened = true;
        grid.cell_mut((0, 1)).is_flagged = true;

        assert_eq!(grid.constrained_unopened_cells(), vec![(1, 0), (1, 1)]);
        assert!(grid.is_unconstrained((2, 2)));
        assert!(!grid.is_unconstrained((1, 1)));
        assert_eq!(grid.unopened_unflagged_cells().len(), 7);
    }

    #[test]
    fn neighborhood_counters() {
        let mut grid = grid((3, 3), &[(0, 0), (0, 2)]);
        grid.cell_mut((0, 0)).is_flagged = true;
        grid.cell_mut((1, 0)).is_opened = true;

        assert_eq!(grid.mine_count_around((1, 1)), 2);
        assert_eq!(grid.flag_count_around((1, 1)), 1);
        assert_eq!(grid.opened_count_around((1, 1)), 1);
        assert_eq!(grid.unopened_count_around((1, 1)), 7);
        assert_eq!(grid.flag_count(), 1);
        assert_eq!(grid.unopened_count(), 8);
    }

    #[test]
    #[should_panic]
    fn out_of_range_query_panics() {
        grid((2, 2), &[]).neighbors((2, 0));
    }
}
