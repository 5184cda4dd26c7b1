/// Dense `width × height` grid addressed by `(x, y)`.
///
/// Iteration is row-major over `x` then `y`, the same order the song matrix
/// is walked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Grid with every cell set to `fill`.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn fill(&mut self, value: T) {
        for cell in &mut self.cells {
            *cell = value.clone();
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).map(move |index| &mut self.cells[index])
    }

    /// Every cell with its coordinate, row-major.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        let height = self.height.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| ((index / height, index % height), cell))
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y).then(|| x * self.height + y)
    }
}
