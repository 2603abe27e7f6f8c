//! Challenge grid generation.
//!
//! A grid holds every symbol of the secret plus decoys sampled without
//! replacement from the symbol pool, shuffled with Fisher-Yates over the
//! thread-local CSPRNG.

use glyphgate_common::{AuthError, Symbol};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Grid generator service
#[derive(Debug, Clone)]
pub struct GridGenerator {
    /// Decoy candidates (deduplicated)
    pool: Vec<Symbol>,
    /// Symbols per grid
    grid_size: usize,
}

impl GridGenerator {
    pub fn new<S: AsRef<str>>(pool: &[S], grid_size: usize) -> Self {
        let mut unique: Vec<Symbol> = Vec::with_capacity(pool.len());
        for symbol in pool {
            let symbol = symbol.as_ref();
            if !unique.iter().any(|s| s == symbol) {
                unique.push(symbol.to_string());
            }
        }

        Self {
            pool: unique,
            grid_size,
        }
    }

    /// Ensure the pool can always fill a grid around this secret
    pub fn check_capacity(&self, secret: &[Symbol]) -> Result<(), AuthError> {
        let needed = self.decoys_needed(secret)?;
        let eligible = self.eligible_decoys(secret).len();

        if eligible < needed {
            return Err(AuthError::Config(format!(
                "symbol pool has {} eligible decoys, grid needs {}",
                eligible, needed
            )));
        }

        Ok(())
    }

    /// Generate a shuffled grid containing the secret
    pub fn generate(&self, secret: &[Symbol]) -> Result<Vec<Symbol>, AuthError> {
        self.generate_with(secret, &mut rand::rng())
    }

    fn generate_with<R: Rng + ?Sized>(
        &self,
        secret: &[Symbol],
        rng: &mut R,
    ) -> Result<Vec<Symbol>, AuthError> {
        let needed = self.decoys_needed(secret)?;
        let eligible = self.eligible_decoys(secret);

        if eligible.len() < needed {
            return Err(AuthError::Config(format!(
                "symbol pool has {} eligible decoys, grid needs {}",
                eligible.len(),
                needed
            )));
        }

        let mut grid: Vec<Symbol> = Vec::with_capacity(self.grid_size);
        grid.extend_from_slice(secret);
        grid.extend(eligible.choose_multiple(rng, needed).map(|s| s.to_string()));
        grid.shuffle(rng);

        Ok(grid)
    }

    fn decoys_needed(&self, secret: &[Symbol]) -> Result<usize, AuthError> {
        self.grid_size.checked_sub(secret.len()).ok_or_else(|| {
            AuthError::Config(format!(
                "secret of {} symbols does not fit a grid of {}",
                secret.len(),
                self.grid_size
            ))
        })
    }

    fn eligible_decoys(&self, secret: &[Symbol]) -> Vec<&str> {
        self.pool
            .iter()
            .filter(|s| !secret.contains(s))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphgate_common::constants::{GRID_SIZE, SYMBOL_POOL};
    use std::collections::HashSet;

    fn secret(symbols: &[&str]) -> Vec<Symbol> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_grid_contains_secret_and_is_unique() {
        let generator = GridGenerator::new(SYMBOL_POOL, GRID_SIZE);
        let secret = secret(&["A", "B", "C"]);

        for _ in 0..100 {
            let grid = generator.generate(&secret).unwrap();
            assert_eq!(grid.len(), GRID_SIZE);

            let unique: HashSet<_> = grid.iter().collect();
            assert_eq!(unique.len(), GRID_SIZE);

            for symbol in &secret {
                assert_eq!(grid.iter().filter(|s| *s == symbol).count(), 1);
            }
        }
    }

    #[test]
    fn test_decoys_exclude_secret_symbols() {
        // Secret drawn from the pool itself must not be duplicated as a decoy
        let generator = GridGenerator::new(SYMBOL_POOL, GRID_SIZE);
        let secret = secret(&SYMBOL_POOL[..3]);

        let grid = generator.generate(&secret).unwrap();
        let unique: HashSet<_> = grid.iter().collect();
        assert_eq!(unique.len(), GRID_SIZE);
    }

    #[test]
    fn test_shuffle_moves_secret_everywhere() {
        let generator = GridGenerator::new(SYMBOL_POOL, GRID_SIZE);
        let secret = secret(&["A", "B", "C"]);

        let mut positions = HashSet::new();
        let mut orderings = HashSet::new();
        for _ in 0..500 {
            let grid = generator.generate(&secret).unwrap();
            let idx = grid.iter().position(|s| s == "A").unwrap();
            positions.insert(idx);
            orderings.insert(grid);
        }

        assert_eq!(positions.len(), GRID_SIZE, "secret symbol never reached some cells");
        assert!(orderings.len() > 400, "too few distinct grids: {}", orderings.len());
    }

    #[test]
    fn test_small_pool_is_config_error() {
        let generator = GridGenerator::new(&["A", "B", "C", "D", "E"], GRID_SIZE);
        let secret = secret(&["A", "B", "C"]);

        assert!(matches!(generator.check_capacity(&secret), Err(AuthError::Config(_))));
        assert!(matches!(generator.generate(&secret), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_pool_is_deduplicated() {
        let generator = GridGenerator::new(&["X", "X", "Y"], 4);
        assert!(generator.check_capacity(&secret(&["A", "B"])).is_ok());
        assert!(generator.check_capacity(&secret(&["A"])).is_err());
    }
}
