use std::ops::{Index, IndexMut};

/// Dense square table addressed by 1-based `(i, j)` positions, with a spare row and column
/// on each side so that `i - 1` and `j + 1` stay in bounds.
#[derive(Debug, Clone)]
pub(crate) struct Matrix {
    dim: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn filled(length: usize, value: f64) -> Self {
        let dim = length + 2;
        Self {
            dim,
            data: vec![value; dim * dim],
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.dim + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.dim + j]
    }
}
