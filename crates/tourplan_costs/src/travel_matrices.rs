use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("matrix has {len} entries, expected {expected} for {num_nodes} nodes")]
    Dimension {
        len: usize,
        expected: usize,
        num_nodes: usize,
    },
}

/// Time (minutes) and energy matrices of one routing instance.
/// Stored as flat vectors, the entry for a pair is at `from * num_nodes + to`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    times: Vec<f64>,
    energies: Vec<f64>,
    num_nodes: usize,
}

fn check_len(values: &[f64], num_nodes: usize) -> Result<(), MatrixError> {
    let expected = num_nodes * num_nodes;
    if values.len() != expected {
        return Err(MatrixError::Dimension {
            len: values.len(),
            expected,
            num_nodes,
        });
    }
    Ok(())
}

impl TravelMatrices {
    pub fn from_flat(
        num_nodes: usize,
        times: Vec<f64>,
        energies: Vec<f64>,
    ) -> Result<Self, MatrixError> {
        check_len(&times, num_nodes)?;
        check_len(&energies, num_nodes)?;

        Ok(TravelMatrices {
            times,
            energies,
            num_nodes,
        })
    }

    /// Builds both matrices from a function returning `(time, energy)` for each pair.
    pub fn from_fn(num_nodes: usize, mut f: impl FnMut(usize, usize) -> (f64, f64)) -> Self {
        let mut times = Vec::with_capacity(num_nodes * num_nodes);
        let mut energies = Vec::with_capacity(num_nodes * num_nodes);

        for from in 0..num_nodes {
            for to in 0..num_nodes {
                let (time, energy) = f(from, to);
                times.push(time);
                energies.push(energy);
            }
        }

        TravelMatrices {
            times,
            energies,
            num_nodes,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    #[inline(always)]
    pub fn time(&self, from: usize, to: usize) -> f64 {
        self.times[from * self.num_nodes + to]
    }

    #[inline(always)]
    pub fn energy(&self, from: usize, to: usize) -> f64 {
        self.energies[from * self.num_nodes + to]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Same energies, new time matrix.
    pub fn with_times(&self, times: Vec<f64>) -> Result<Self, MatrixError> {
        check_len(&times, self.num_nodes)?;

        Ok(TravelMatrices {
            times,
            energies: self.energies.clone(),
            num_nodes: self.num_nodes,
        })
    }

    pub fn time_rows(&self) -> Vec<Vec<f64>> {
        if self.num_nodes == 0 {
            return Vec::new();
        }

        self.times
            .chunks(self.num_nodes)
            .map(|row| row.to_vec())
            .collect()
    }
}
