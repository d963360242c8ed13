use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// The ways of generating an initial set of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamInit {
    Const { value: f32 },
    Normal { mean: f32, std: f32 },
    Uniform { low: f32, high: f32 },
    XavierUniform { fan_in: usize, fan_out: usize },
}

impl ParamInit {
    /// Generates `len` parameters.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `len` - The amount of parameters to generate.
    ///
    /// # Returns
    /// The parameters, or an error if the distribution's arguments are invalid.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> Result<Vec<f32>> {
        match *self {
            ParamInit::Const { value } => Ok(vec![value; len]),
            ParamInit::Normal { mean, std } => {
                if std < 0. {
                    return Err(MlErr::Distribution(format!(
                        "standard deviation {std} is negative"
                    )));
                }

                let normal = Normal::new(mean, std).map_err(distribution_err)?;
                Ok(sample(rng, &normal, len))
            }
            ParamInit::Uniform { low, high } => {
                let uniform = Uniform::new(low, high).map_err(distribution_err)?;
                Ok(sample(rng, &uniform, len))
            }
            ParamInit::XavierUniform { fan_in, fan_out } => {
                if fan_in + fan_out == 0 {
                    return Err(MlErr::InvalidConfig("xavier fans must not both be zero"));
                }

                let limit = (6. / (fan_in + fan_out) as f32).sqrt();
                let uniform = Uniform::new_inclusive(-limit, limit).map_err(distribution_err)?;
                Ok(sample(rng, &uniform, len))
            }
        }
    }
}

fn sample<R, D>(rng: &mut R, distribution: &D, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
    D: Distribution<f32>,
{
    (0..len).map(|_| distribution.sample(rng)).collect()
}

pub(crate) fn distribution_err<E: std::fmt::Display>(e: E) -> MlErr {
    MlErr::Distribution(e.to_string())
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn const_fills_every_parameter() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = ParamInit::Const { value: 0.5 }.generate(&mut rng, 4).unwrap();
        assert_eq!(params, [0.5; 4]);
    }

    #[test]
    fn xavier_stays_within_its_limit() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = ParamInit::XavierUniform {
            fan_in: 4,
            fan_out: 2,
        }
        .generate(&mut rng, 1000)
        .unwrap();

        assert!(params.iter().all(|p| p.abs() <= 1.0));
    }

    #[test]
    fn invalid_distributions_fail() {
        let mut rng = StdRng::seed_from_u64(0);

        let normal = ParamInit::Normal {
            mean: 0.,
            std: -1.,
        };
        let uniform = ParamInit::Uniform { low: 1., high: 0. };

        assert!(matches!(normal.generate(&mut rng, 3), Err(MlErr::Distribution(_))));
        assert!(matches!(uniform.generate(&mut rng, 3), Err(MlErr::Distribution(_))));
    }

    #[test]
    fn negative_std_is_rejected_even_when_finite() {
        let mut rng = StdRng::seed_from_u64(0);

        for std in [-1e-3, -2., f32::NEG_INFINITY] {
            let res = ParamInit::Normal { mean: 0., std }.generate(&mut rng, 3);
            assert!(matches!(res, Err(MlErr::Distribution(_))), "std {std} was accepted");
        }

        let zero = ParamInit::Normal { mean: 1., std: 0. }.generate(&mut rng, 2).unwrap();
        assert_eq!(zero, [1., 1.]);
    }

    #[test]
    fn same_seed_same_parameters() {
        let init = ParamInit::Normal { mean: 0., std: 1. };
        let a = init.generate(&mut StdRng::seed_from_u64(3), 8).unwrap();
        let b = init.generate(&mut StdRng::seed_from_u64(3), 8).unwrap();
        assert_eq!(a, b);
    }
}
