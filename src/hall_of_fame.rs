//! Hall of fame
//!
//! A bounded archive of the best distinct individuals seen during a run.

use serde::{Deserialize, Serialize};

use crate::population::individual::Individual;

/// Archive of the `capacity` best distinct individuals, best first
///
/// Entries are snapshots: offering a population clones the individuals that
/// make it in. Individuals with identical genes are stored once. Among equal
/// fitness, the one offered first ranks first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HallOfFame {
    capacity: usize,
    entries: Vec<Individual>,
}

impl HallOfFame {
    /// Create an empty archive holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "Hall of fame capacity must be at least 1");
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been archived yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offer every individual of a population, in order
    pub fn offer<'a, I>(&mut self, individuals: I)
    where
        I: IntoIterator<Item = &'a Individual>,
    {
        for individual in individuals {
            self.offer_one(individual);
        }
    }

    /// Offer a single evaluated individual
    ///
    /// Returns true if it entered the archive.
    pub fn offer_one(&mut self, individual: &Individual) -> bool {
        assert!(
            individual.is_evaluated(),
            "Hall of fame only accepts evaluated individuals"
        );
        let fitness = individual.rank();

        if self.entries.len() == self.capacity {
            if let Some(worst) = self.entries.last() {
                if fitness <= worst.rank() {
                    return false;
                }
            }
        }
        if self.entries.iter().any(|e| e.same_genes(individual)) {
            return false;
        }

        let position = self
            .entries
            .iter()
            .position(|e| e.rank() < fitness)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, individual.clone());
        self.entries.truncate(self.capacity);
        true
    }

    /// The single best entry
    pub fn top(&self) -> Option<&Individual> {
        self.entries.first()
    }

    /// All entries, best first
    pub fn entries(&self) -> &[Individual] {
        &self.entries
    }

    /// Iterate entries, best first
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::value::ParamValue;

    fn ind(gene: i64, fitness: f64) -> Individual {
        Individual::with_fitness(vec![ParamValue::Int(gene)], fitness)
    }

    fn genes(hof: &HallOfFame) -> Vec<i64> {
        hof.iter().map(|i| i.genes[0].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_keeps_best_k() {
        let mut hof = HallOfFame::new(3);
        let pop = vec![ind(1, 0.1), ind(2, 0.9), ind(3, 0.5), ind(4, 0.7), ind(5, 0.2)];
        hof.offer(&pop);

        assert_eq!(hof.len(), 3);
        assert_eq!(genes(&hof), vec![2, 4, 3]);
        assert_eq!(hof.top().unwrap().fitness_value(), 0.9);
    }

    #[test]
    fn test_dedupes_by_genes() {
        let mut hof = HallOfFame::new(3);
        hof.offer(&[ind(1, 0.5), ind(1, 0.5), ind(1, 0.5)]);
        assert_eq!(hof.len(), 1);
    }

    #[test]
    fn test_ties_first_seen_wins() {
        let mut hof = HallOfFame::new(2);
        hof.offer(&[ind(1, 0.5), ind(2, 0.5)]);
        hof.offer(&[ind(3, 0.5)]);
        assert_eq!(genes(&hof), vec![1, 2]);

        let mut hof = HallOfFame::new(3);
        hof.offer(&[ind(1, 0.5), ind(2, 0.8), ind(3, 0.5)]);
        assert_eq!(genes(&hof), vec![2, 1, 3]);
    }

    #[test]
    fn test_content_independent_of_arrival_generation() {
        let all = vec![ind(1, 0.3), ind(2, 0.6), ind(3, 0.9), ind(4, 0.1), ind(5, 0.8)];

        let mut at_once = HallOfFame::new(2);
        at_once.offer(&all);

        let mut in_batches = HallOfFame::new(2);
        in_batches.offer(&all[3..]);
        in_batches.offer(&all[..3]);

        assert_eq!(genes(&at_once), genes(&in_batches));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut hof = HallOfFame::new(1);
        let mut pop = vec![ind(1, 0.4)];
        hof.offer(&pop);

        pop[0].genes[0] = ParamValue::Int(99);
        pop[0].invalidate();
        assert_eq!(genes(&hof), vec![1]);
    }

    #[test]
    fn test_nan_ranks_last() {
        let mut hof = HallOfFame::new(2);
        hof.offer(&[ind(1, f64::NAN), ind(2, -5.0)]);
        assert_eq!(genes(&hof), vec![2, 1]);

        hof.offer(&[ind(3, -10.0)]);
        assert_eq!(genes(&hof), vec![2, 3]);
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn test_zero_capacity_panics() {
        HallOfFame::new(0);
    }
}
