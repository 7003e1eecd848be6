//! Lazy cartesian enumeration of parameter pools in odometer order.
//!
//! The enumerator keeps one index per parameter and increments them with
//! carry, last parameter fastest. Nothing is materialized beyond the current
//! tuple, so a run can stop between any two cases.

use crate::resolver::Parameter;
use crate::value::{Value, ValueTuple};

/// Number of tuples in the product of the given pool sizes
///
/// `None` on `u64` overflow. An empty list of sizes is one case.
pub fn product_size<I>(sizes: I) -> Option<u64>
where
    I: IntoIterator<Item = usize>,
{
    sizes
        .into_iter()
        .try_fold(1u64, |acc, size| acc.checked_mul(size as u64))
}

/// Mixed-radix counter over the value pools of a theory's parameters
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    pools: Vec<&'a [Value]>,
    indices: Vec<usize>,
    exhausted: bool,
    emitted: u64,
}

impl<'a> Combinations<'a> {
    /// Enumerate over resolved parameters
    pub fn new(parameters: &'a [Parameter]) -> Self {
        Self::over_pools(parameters.iter().map(|p| p.values()).collect())
    }

    /// Enumerate over raw pools, first pool slowest
    pub fn over_pools(pools: Vec<&'a [Value]>) -> Self {
        // Upstream never passes an empty pool; if one slips through the product is empty
        let exhausted = pools.iter().any(|p| p.is_empty());
        Self {
            indices: vec![0; pools.len()],
            pools,
            exhausted,
            emitted: 0,
        }
    }

    /// Total number of tuples this enumeration produces from the start
    pub fn case_count(&self) -> Option<u64> {
        product_size(self.pools.iter().map(|p| p.len()))
    }

    /// Tuples produced since the last restart
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Rewind to the first tuple
    pub fn restart(&mut self) {
        self.indices.iter_mut().for_each(|i| *i = 0);
        self.exhausted = self.pools.iter().any(|p| p.is_empty());
        self.emitted = 0;
    }

    /// The tuple at position `index` in odometer order, without iterating
    pub fn tuple_at(&self, index: u64) -> Option<ValueTuple> {
        if index >= self.case_count()? {
            return None;
        }

        let mut remainder = index;
        let mut positions = vec![0usize; self.pools.len()];
        for (slot, pool) in self.pools.iter().enumerate().rev() {
            let radix = pool.len() as u64;
            positions[slot] = (remainder % radix) as usize;
            remainder /= radix;
        }

        Some(self.build(&positions))
    }

    fn build(&self, positions: &[usize]) -> ValueTuple {
        ValueTuple::new(
            self.pools
                .iter()
                .zip(positions)
                .map(|(pool, &i)| pool[i].clone())
                .collect(),
        )
    }

    /// Advance the counter; returns false once it wraps past the last tuple
    fn advance(&mut self) -> bool {
        for slot in (0..self.indices.len()).rev() {
            self.indices[slot] += 1;
            if self.indices[slot] < self.pools[slot].len() {
                return true;
            }
            self.indices[slot] = 0;
        }
        false
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = ValueTuple;

    fn next(&mut self) -> Option<ValueTuple> {
        if self.exhausted {
            return None;
        }

        let tuple = self.build(&self.indices);
        self.emitted += 1;
        if !self.advance() {
            self.exhausted = true;
        }
        Some(tuple)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        match self
            .case_count()
            .and_then(|total| usize::try_from(total - self.emitted).ok())
        {
            Some(remaining) => (remaining, Some(remaining)),
            None => (usize::MAX, None),
        }
    }
}
