//! Cartesian product over borrowed axes.

/// Iterator over the Cartesian product of `axes`, yielding one
/// borrowed element per axis.
///
/// The iteration order is odometer-style: the last axis varies
/// fastest. An empty axis makes the whole product empty; zero axes
/// produce a single empty selection.
pub struct CartesianProduct<'a, T> {
    axes: Vec<&'a [T]>,
    indices: Vec<usize>,
    done: bool,
}

impl<'a, T> CartesianProduct<'a, T> {
    pub fn new(axes: Vec<&'a [T]>) -> Self {
        let done = axes.iter().any(|axis| axis.is_empty());
        CartesianProduct {
            indices: vec![0; axes.len()],
            axes,
            done,
        }
    }
}

impl<'a, T> Iterator for CartesianProduct<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .axes
            .iter()
            .zip(&self.indices)
            .map(|(axis, &i)| &axis[i])
            .collect();

        // Advance the odometer, last axis first.
        self.done = true;
        for pos in (0..self.axes.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.axes[pos].len() {
                self.done = false;
                break;
            }
            self.indices[pos] = 0;
        }
        Some(item)
    }
}
