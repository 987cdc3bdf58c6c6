use std::ops::Index;

/// A dense row-major weight matrix for a linear Q function
///
/// Row `c` holds the weights of flat action `c`; the Q value of that action in a state is the
/// dot product of the row with the state's feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl WeightMatrix {
    /// Construct an all-zero matrix with `rows` actions and `cols` features
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Returns `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Zero every weight in place
    pub fn reset(&mut self) {
        self.data.fill(0.0);
    }

    pub fn row(&self, c: usize) -> &[f32] {
        &self.data[c * self.cols..(c + 1) * self.cols]
    }

    pub fn row_mut(&mut self, c: usize) -> &mut [f32] {
        &mut self.data[c * self.cols..(c + 1) * self.cols]
    }

    /// Q value of a single action, `theta[c] · x`
    pub fn q_value(&self, c: usize, x: &[f32]) -> f32 {
        self.check_dim(x);
        self.row(c).iter().zip(x).map(|(w, x)| w * x).sum()
    }

    /// Q values of every action, `theta · x`
    pub fn q_values(&self, x: &[f32]) -> Vec<f32> {
        self.check_dim(x);
        self.data
            .chunks_exact(self.cols)
            .map(|row| row.iter().zip(x).map(|(w, x)| w * x).sum::<f32>())
            .collect()
    }

    /// Maximum Q value over all actions
    pub fn max_q(&self, x: &[f32]) -> f32 {
        self.q_values(x)
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// `theta[c] += scale * x`
    pub fn add_scaled_row(&mut self, c: usize, scale: f32, x: &[f32]) {
        self.check_dim(x);
        for (w, x) in self.row_mut(c).iter_mut().zip(x) {
            *w += scale * x;
        }
    }

    fn check_dim(&self, x: &[f32]) {
        assert_eq!(
            x.len(),
            self.cols,
            "Feature vector has {} entries but the weight matrix has {} columns.",
            x.len(),
            self.cols
        );
    }
}

impl Index<(usize, usize)> for WeightMatrix {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row * self.cols + col]
    }
}

/// Index of the first maximum, `None` for an empty slice
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
