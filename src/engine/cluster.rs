//! Seeded k-means clustering over TF-IDF document vectors
//!
//! Determinism is a hard requirement: two runs over identical input must
//! produce identical assignments, so initialization uses a ChaCha RNG with a
//! fixed seed and a fixed number of restarts (best inertia wins).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::engine::extract::ExtractionError;

/// K-means run parameters
#[derive(Debug, Clone)]
pub struct KMeansParams {
    pub k: usize,
    pub max_iterations: usize,
    pub n_init: usize,
    pub seed: u64,
}

/// Clustering result
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Cluster index per input row
    pub assignments: Vec<usize>,

    /// Final centroids, `k` rows
    pub centroids: Vec<Vec<f64>>,

    /// Sum of squared distances to assigned centroids
    pub inertia: f64,
}

/// Run k-means with k-means++ initialization and restarts
pub fn kmeans(data: &[Vec<f64>], params: &KMeansParams) -> Result<KMeansResult, ExtractionError> {
    if data.is_empty() {
        return Err(ExtractionError::Clustering(
            "no document vectors to cluster".to_string(),
        ));
    }
    let k = params.k.min(data.len());
    if k == 0 {
        return Err(ExtractionError::Clustering("cluster count is zero".to_string()));
    }

    let mut best: Option<KMeansResult> = None;
    for restart in 0..params.n_init.max(1) {
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(restart as u64));
        let result = lloyd(data, k, params.max_iterations, &mut rng);
        let better = best
            .as_ref()
            .map(|b| result.inertia < b.inertia)
            .unwrap_or(true);
        if better {
            best = Some(result);
        }
    }
    Ok(best.expect("at least one restart ran"))
}

fn lloyd(data: &[Vec<f64>], k: usize, max_iterations: usize, rng: &mut ChaCha8Rng) -> KMeansResult {
    let mut centroids = init_plus_plus(data, k, rng);
    let mut assignments = vec![0usize; data.len()];

    for _ in 0..max_iterations {
        let mut changed = false;
        for (i, row) in data.iter().enumerate() {
            let nearest = nearest_centroid(row, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }

        let dims = data[0].len();
        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (row, &cluster) in data.iter().zip(assignments.iter()) {
            counts[cluster] += 1;
            for (d, value) in row.iter().enumerate() {
                sums[cluster][d] += value;
            }
        }
        for (cluster, count) in counts.iter().enumerate() {
            if *count > 0 {
                for value in sums[cluster].iter_mut() {
                    *value /= *count as f64;
                }
                centroids[cluster] = sums[cluster].clone();
            }
            // an emptied cluster keeps its previous centroid
        }

        if !changed {
            break;
        }
    }

    let inertia = data
        .iter()
        .zip(assignments.iter())
        .map(|(row, &cluster)| squared_distance(row, &centroids[cluster]))
        .sum();

    KMeansResult {
        assignments,
        centroids,
        inertia,
    }
}

/// k-means++ seeding: first centroid uniform, then proportional to squared
/// distance from the nearest chosen centroid
fn init_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    while centroids.len() < k {
        let distances: Vec<f64> = data
            .iter()
            .map(|row| {
                centroids
                    .iter()
                    .map(|c| squared_distance(row, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();
        if total <= 1e-12 {
            // all points coincide with chosen centroids
            centroids.push(data[rng.gen_range(0..data.len())].clone());
            continue;
        }
        let mut target = rng.gen::<f64>() * total;
        let mut chosen = data.len() - 1;
        for (i, d) in distances.iter().enumerate() {
            target -= d;
            if target <= 0.0 {
                chosen = i;
                break;
            }
        }
        centroids.push(data[chosen].clone());
    }
    centroids
}

fn nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(row, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(k: usize) -> KMeansParams {
        KMeansParams {
            k,
            max_iterations: 100,
            n_init: 5,
            seed: 42,
        }
    }

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![0.05, 0.05],
            vec![5.0, 5.1],
            vec![5.1, 5.0],
            vec![5.05, 5.05],
        ]
    }

    #[test]
    fn test_separates_obvious_blobs() {
        let data = two_blobs();
        let result = kmeans(&data, &params(2)).unwrap();
        assert_eq!(result.assignments[0], result.assignments[1]);
        assert_eq!(result.assignments[0], result.assignments[2]);
        assert_eq!(result.assignments[3], result.assignments[4]);
        assert_eq!(result.assignments[3], result.assignments[5]);
        assert_ne!(result.assignments[0], result.assignments[3]);
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let data = two_blobs();
        let a = kmeans(&data, &params(2)).unwrap();
        let b = kmeans(&data, &params(2)).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_k_capped_at_point_count() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let result = kmeans(&data, &params(5)).unwrap();
        assert!(result.centroids.len() <= 2);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = kmeans(&[], &params(3));
        assert!(result.is_err());
    }

    #[test]
    fn test_identical_points_do_not_hang() {
        let data = vec![vec![1.0, 1.0]; 8];
        let result = kmeans(&data, &params(3)).unwrap();
        assert_eq!(result.assignments.len(), 8);
        assert!(result.inertia < 1e-9);
    }
}
