//! Rolling-window shingling, turning a raw sequence into fixed-width
//! vectors a tree can ingest.
//!
//! Two variants mirror the reference source's `Shingle` (2D, rows of an
//! existing multi-dimensional sequence) and `ShingleList` (1D, scalar
//! series turned into fixed-width windows).

/// Shingles a 1D scalar sequence into fixed-width windows.
#[derive(Debug)]
pub struct Shingler {
    sequence: Vec<f64>,
    size: usize,
    row_start: usize,
}

impl Shingler {
    pub fn new(sequence: Vec<f64>, size: usize) -> Self {
        Self { sequence, size, row_start: 0 }
    }

    /// Number of windows available in total.
    pub fn total_samples(&self) -> usize {
        self.sequence.len().saturating_sub(self.size.saturating_sub(1))
    }

    /// Returns the next window and advances the start by one, or `None`
    /// once the sequence is exhausted.
    pub fn next_window(&mut self) -> Option<Vec<f64>> {
        let last = self.row_start + self.size;
        if last > self.sequence.len() {
            return None;
        }
        let window = self.sequence[self.row_start..last].to_vec();
        self.row_start += 1;
        Some(window)
    }
}

/// Shingles a 2D sequence (rows of an existing multi-dimensional series)
/// into fixed-size blocks of `size` consecutive rows.
#[derive(Debug)]
pub struct Shingler2D {
    sequence: Vec<Vec<f64>>,
    size: usize,
    row_start: usize,
}

impl Shingler2D {
    pub fn new(sequence: Vec<Vec<f64>>, size: usize) -> Self {
        Self { sequence, size, row_start: 0 }
    }

    pub fn total_samples(&self) -> usize {
        self.sequence.len().saturating_sub(self.size.saturating_sub(1))
    }

    pub fn next_window(&mut self) -> Option<Vec<Vec<f64>>> {
        let last = self.row_start + self.size;
        if last > self.sequence.len() {
            return None;
        }
        let window = self.sequence[self.row_start..last].to_vec();
        self.row_start += 1;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shingler_rolls_one_step_at_a_time() {
        let mut s = Shingler::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(s.total_samples(), 3);
        assert_eq!(s.next_window(), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(s.next_window(), Some(vec![2.0, 3.0, 4.0]));
        assert_eq!(s.next_window(), Some(vec![3.0, 4.0, 5.0]));
        assert_eq!(s.next_window(), None);
    }

    #[test]
    fn shingler_2d_rolls_over_rows() {
        let rows = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]];
        let mut s = Shingler2D::new(rows, 2);
        assert_eq!(s.total_samples(), 2);
        assert_eq!(s.next_window(), Some(vec![vec![0.0, 0.0], vec![1.0, 1.0]]));
        assert_eq!(s.next_window(), Some(vec![vec![1.0, 1.0], vec![2.0, 2.0]]));
        assert_eq!(s.next_window(), None);
    }
}
