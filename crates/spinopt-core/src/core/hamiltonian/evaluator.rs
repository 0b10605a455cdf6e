use super::potentials;
use super::term::EnergyBreakdown;
use crate::core::models::interactions::{InteractionError, InteractionStore};
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HamiltonianError {
    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error("Spin configuration has {found} sites, but the Hamiltonian was built for {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

/// Heisenberg + DMI + uniaxial anisotropy Hamiltonian over a validated interaction store.
///
/// Construction checks every site id against `num_sites` once, so evaluation can index
/// spins directly. All sums run over the listed interactions only; cost is linear in
/// the number of pairs and on-site terms.
#[derive(Debug, Clone, Copy)]
pub struct Hamiltonian<'a> {
    store: &'a InteractionStore,
    num_sites: usize,
}

impl<'a> Hamiltonian<'a> {
    pub fn new(store: &'a InteractionStore, num_sites: usize) -> Result<Self, HamiltonianError> {
        store.validate(num_sites)?;
        Ok(Self { store, num_sites })
    }

    /// Energy breakdown of `spins`, which are expected to be unit vectors.
    pub fn energy(&self, spins: &[Vector3<f64>]) -> Result<EnergyBreakdown, HamiltonianError> {
        self.check_size(spins)?;

        let heisenberg = self
            .store
            .exchange()
            .iter()
            .map(|e| potentials::exchange(&spins[e.i], &spins[e.j], e.coupling))
            .sum();
        let dmi = self
            .store
            .dmi()
            .iter()
            .map(|d| potentials::dmi(&spins[d.i], &spins[d.j], &d.vector))
            .sum();
        let anisotropy = self
            .store
            .anisotropy()
            .iter()
            .map(|a| potentials::uniaxial_anisotropy(&spins[a.site], a.constant, &a.axis))
            .sum();

        Ok(EnergyBreakdown::new(heisenberg, dmi, anisotropy))
    }

    /// Energy breakdown and the gradient of the total energy with respect to each spin.
    ///
    /// Sites untouched by any interaction receive a zero gradient.
    pub fn energy_and_gradient(
        &self,
        spins: &[Vector3<f64>],
    ) -> Result<(EnergyBreakdown, Vec<Vector3<f64>>), HamiltonianError> {
        self.check_size(spins)?;
        let mut gradient = vec![Vector3::zeros(); spins.len()];
        let mut energy = EnergyBreakdown::default();

        for e in self.store.exchange() {
            let (si, sj) = (&spins[e.i], &spins[e.j]);
            energy.heisenberg += potentials::exchange(si, sj, e.coupling);
            let (gi, gj) = potentials::exchange_gradient(si, sj, e.coupling);
            gradient[e.i] += gi;
            gradient[e.j] += gj;
        }

        for d in self.store.dmi() {
            let (si, sj) = (&spins[d.i], &spins[d.j]);
            energy.dmi += potentials::dmi(si, sj, &d.vector);
            let (gi, gj) = potentials::dmi_gradient(si, sj, &d.vector);
            gradient[d.i] += gi;
            gradient[d.j] += gj;
        }

        for a in self.store.anisotropy() {
            let s = &spins[a.site];
            energy.anisotropy += potentials::uniaxial_anisotropy(s, a.constant, &a.axis);
            gradient[a.site] += potentials::uniaxial_anisotropy_gradient(s, a.constant, &a.axis);
        }

        Ok((energy, gradient))
    }

    fn check_size(&self, spins: &[Vector3<f64>]) -> Result<(), HamiltonianError> {
        if spins.len() != self.num_sites {
            return Err(HamiltonianError::SizeMismatch {
                expected: self.num_sites,
                found: spins.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::interactions::{
        AnisotropyTerm, DmiInteraction, ExchangeInteraction, InteractionKind,
    };
    use crate::core::models::spins::SpinConfiguration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    const TOLERANCE: f64 = 1e-12;

    fn chain_store(num_sites: usize) -> InteractionStore {
        let exchange = (0..num_sites - 1)
            .map(|i| ExchangeInteraction::new(i, i + 1, 1.0 + 0.1 * i as f64))
            .collect();
        let dmi = (0..num_sites - 1)
            .map(|i| DmiInteraction::new(i, i + 1, Vector3::new(0.1, -0.2, 0.3 * i as f64)))
            .collect();
        let anisotropy = (0..num_sites)
            .map(|a| AnisotropyTerm::new(a, 0.25, Vector3::new(0.0, 0.6, 0.8)))
            .collect();
        InteractionStore::new(exchange, dmi, anisotropy)
    }

    #[test]
    fn new_rejects_store_with_out_of_range_site() {
        let store = InteractionStore::new(vec![ExchangeInteraction::new(0, 2, 1.0)], vec![], vec![]);
        let result = Hamiltonian::new(&store, 2);
        assert!(matches!(
            result,
            Err(HamiltonianError::Interaction(InteractionError::SiteOutOfRange {
                kind: InteractionKind::Exchange,
                site: 2,
                ..
            }))
        ));
    }

    #[test]
    fn energy_rejects_configuration_of_wrong_size() {
        let store = chain_store(3);
        let hamiltonian = Hamiltonian::new(&store, 3).unwrap();
        let spins = SpinConfiguration::uniform(4, Vector3::z());
        assert_eq!(
            hamiltonian.energy(spins.as_slice()),
            Err(HamiltonianError::SizeMismatch {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn gradient_size_errors_report_the_validated_site_count() {
        let store = chain_store(3);
        let hamiltonian = Hamiltonian::new(&store, 3).unwrap();
        let short = SpinConfiguration::uniform(2, Vector3::z());
        assert_eq!(
            hamiltonian.energy_and_gradient(short.as_slice()),
            Err(HamiltonianError::SizeMismatch {
                expected: 3,
                found: 2
            })
        );

        let spins = SpinConfiguration::uniform(3, Vector3::z());
        let (_, gradient) = hamiltonian.energy_and_gradient(spins.as_slice()).unwrap();
        assert_eq!(gradient.len(), 3);
    }

    #[test]
    fn empty_store_yields_exact_zero_energy_and_gradient() {
        let store = InteractionStore::default();
        let hamiltonian = Hamiltonian::new(&store, 2).unwrap();
        let spins = SpinConfiguration::from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let (energy, gradient) = hamiltonian.energy_and_gradient(spins.as_slice()).unwrap();
        assert_eq!(energy, EnergyBreakdown::default());
        assert!(gradient.iter().all(|g| *g == Vector3::zeros()));
    }

    #[test]
    fn exchange_only_store_has_total_equal_to_heisenberg() {
        let mut rng = StdRng::seed_from_u64(3);
        let store = InteractionStore::new(
            vec![
                ExchangeInteraction::new(0, 1, 1.0),
                ExchangeInteraction::new(1, 2, -0.5),
            ],
            vec![],
            vec![],
        );
        let hamiltonian = Hamiltonian::new(&store, 3).unwrap();
        for _ in 0..10 {
            let spins = SpinConfiguration::random(3, &mut rng);
            let energy = hamiltonian.energy(spins.as_slice()).unwrap();
            assert_eq!(energy.dmi, 0.0);
            assert_eq!(energy.anisotropy, 0.0);
            assert_eq!(energy.total(), energy.heisenberg);
        }
    }

    #[test]
    fn energy_and_gradient_agree_with_energy() {
        let mut rng = StdRng::seed_from_u64(11);
        let store = chain_store(6);
        let hamiltonian = Hamiltonian::new(&store, 6).unwrap();
        let spins = SpinConfiguration::random(6, &mut rng);
        let plain = hamiltonian.energy(spins.as_slice()).unwrap();
        let (with_gradient, _) = hamiltonian.energy_and_gradient(spins.as_slice()).unwrap();
        assert!((plain.total() - with_gradient.total()).abs() < TOLERANCE);
        assert!((plain.dmi - with_gradient.dmi).abs() < TOLERANCE);
    }

    #[test]
    fn gradient_matches_central_finite_differences() {
        let mut rng = StdRng::seed_from_u64(5);
        let store = chain_store(5);
        let hamiltonian = Hamiltonian::new(&store, 5).unwrap();
        let spins = SpinConfiguration::random(5, &mut rng).into_inner();
        let (_, gradient) = hamiltonian.energy_and_gradient(&spins).unwrap();

        let h = 1e-6;
        for site in 0..spins.len() {
            for k in 0..3 {
                let mut plus = spins.clone();
                let mut minus = spins.clone();
                plus[site][k] += h;
                minus[site][k] -= h;
                let numeric = (hamiltonian.energy(&plus).unwrap().total()
                    - hamiltonian.energy(&minus).unwrap().total())
                    / (2.0 * h);
                assert!(
                    (numeric - gradient[site][k]).abs() < 1e-7,
                    "site {site} component {k}: numeric {numeric}, analytic {}",
                    gradient[site][k]
                );
            }
        }
    }

    #[test]
    fn total_is_invariant_under_permutation_of_each_list() {
        let mut rng = StdRng::seed_from_u64(21);
        let store = chain_store(8);
        let spins = SpinConfiguration::random(8, &mut rng);
        let reference = Hamiltonian::new(&store, 8)
            .unwrap()
            .energy(spins.as_slice())
            .unwrap();

        let mut exchange = store.exchange().to_vec();
        let mut dmi = store.dmi().to_vec();
        let mut anisotropy = store.anisotropy().to_vec();
        exchange.shuffle(&mut rng);
        dmi.shuffle(&mut rng);
        anisotropy.shuffle(&mut rng);
        let shuffled = InteractionStore::new(exchange, dmi, anisotropy);
        let energy = Hamiltonian::new(&shuffled, 8)
            .unwrap()
            .energy(spins.as_slice())
            .unwrap();

        assert!((energy.total() - reference.total()).abs() < 1e-10);
        assert!((energy.heisenberg - reference.heisenberg).abs() < 1e-10);
        assert!((energy.dmi - reference.dmi).abs() < 1e-10);
        assert!((energy.anisotropy - reference.anisotropy).abs() < 1e-10);
    }

    #[test]
    fn dmi_swap_with_negated_vector_preserves_energy() {
        let mut rng = StdRng::seed_from_u64(8);
        let spins = SpinConfiguration::random(2, &mut rng);
        let d = Vector3::new(0.4, -0.3, 0.9);

        let energy_of = |dmi: DmiInteraction| {
            let store = InteractionStore::new(vec![], vec![dmi], vec![]);
            Hamiltonian::new(&store, 2)
                .unwrap()
                .energy(spins.as_slice())
                .unwrap()
                .dmi
        };

        let forward = energy_of(DmiInteraction::new(0, 1, d));
        let swapped_negated = energy_of(DmiInteraction::new(1, 0, -d));
        let swapped = energy_of(DmiInteraction::new(1, 0, d));

        assert!((forward - swapped_negated).abs() < TOLERANCE);
        assert!((forward + swapped).abs() < TOLERANCE);
    }

    #[test]
    fn anisotropy_is_invariant_under_axis_inversion() {
        let mut rng = StdRng::seed_from_u64(13);
        let spins = SpinConfiguration::random(1, &mut rng);
        let axis = Vector3::new(0.0, 0.6, 0.8);

        let energy_of = |axis: Vector3<f64>| {
            let store = InteractionStore::new(vec![], vec![], vec![AnisotropyTerm::new(0, 0.7, axis)]);
            Hamiltonian::new(&store, 1)
                .unwrap()
                .energy(spins.as_slice())
                .unwrap()
                .anisotropy
        };

        assert!((energy_of(axis) - energy_of(-axis)).abs() < TOLERANCE);
    }
}
