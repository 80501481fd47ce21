//! Parameter transforms for autoregressive and moving-average polynomials
//!
//! The optimizer searches an unconstrained space. Each unconstrained value is
//! squashed into a partial autocorrelation in (-1, 1) and the Durbin-Levinson
//! recursion turns the partial autocorrelations into polynomial
//! coefficients. Any point of the unconstrained space therefore maps to a
//! stationary AR polynomial (or an invertible MA polynomial).

use crate::polynomial::LagPolynomial;

/// Map unconstrained values to the coefficients `φ` of a stationary
/// polynomial `1 - φ1 B - ... - φn B^n`
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained
        .iter()
        .map(|&x| x / x.hypot(1.0))
        .collect();

    let mut phi: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, &r) in partials.iter().enumerate() {
        let previous = phi.clone();
        for i in 0..k {
            phi[i] = previous[i] - r * previous[k - 1 - i];
        }
        phi.push(r);
    }

    phi
}

/// Map unconstrained values to the coefficients `θ` of an invertible
/// polynomial `1 + θ1 B + ... + θn B^n`
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|phi| -phi)
        .collect()
}

/// First `count` weights of the infinite moving-average representation of
/// `ar(B) y = ma(B) e`
///
/// Both polynomials must have a unit constant term.
pub fn psi_weights(ar: &LagPolynomial, ma: &LagPolynomial, count: usize) -> Vec<f64> {
    let mut psi: Vec<f64> = Vec::with_capacity(count);
    for j in 0..count {
        let mut weight = ma.coefficient(j);
        for i in 1..=j.min(ar.degree()) {
            weight -= ar.coefficient(i) * psi[j - i];
        }
        psi.push(weight);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_coefficient_stays_inside_unit_interval() {
        for x in [-50.0, -1.0, 0.0, 0.75, 1e6] {
            let phi = constrain_stationary(&[x]);
            assert_eq!(phi.len(), 1);
            assert!(phi[0].abs() < 1.0);
        }
        assert_relative_eq!(constrain_stationary(&[0.75])[0], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_huge_values_saturate_towards_unit_root() {
        assert_relative_eq!(constrain_stationary(&[1e200])[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(constrain_stationary(&[-1e200])[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(constrain_invertible(&[1e300])[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_coefficients_inside_stationarity_triangle() {
        for a in [-8.0, -1.5, 0.0, 0.3, 4.0] {
            for b in [-6.0, -0.2, 0.0, 1.0, 9.0] {
                let phi = constrain_stationary(&[a, b]);
                assert!(phi[1].abs() < 1.0);
                assert!(phi[0] + phi[1] < 1.0);
                assert!(phi[1] - phi[0] < 1.0);
            }
        }
    }

    #[test]
    fn test_invertible_is_negated_stationary() {
        let theta = constrain_invertible(&[0.4, -0.9, 2.0]);
        let phi = constrain_stationary(&[0.4, -0.9, 2.0]);
        for (t, p) in theta.iter().zip(phi.iter()) {
            assert_relative_eq!(*t, -*p);
        }
    }

    #[test]
    fn test_psi_weights_of_ar1() {
        // (1 - 0.5B) y = e  =>  psi_j = 0.5^j
        let ar = LagPolynomial::autoregressive(&[0.5], 1).unwrap();
        let psi = psi_weights(&ar, &LagPolynomial::one(), 5);
        for (j, weight) in psi.iter().enumerate() {
            assert_relative_eq!(*weight, 0.5_f64.powi(j as i32), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_psi_weights_of_random_walk_with_ma() {
        // (1 - B) y = (1 + 0.3B) e  =>  psi = 1, 1.3, 1.3, ...
        let ar = LagPolynomial::difference(1, 1).unwrap();
        let ma = LagPolynomial::moving_average(&[0.3], 1).unwrap();
        let psi = psi_weights(&ar, &ma, 4);
        assert_relative_eq!(psi[0], 1.0);
        for weight in &psi[1..] {
            assert_relative_eq!(*weight, 1.3, epsilon = 1e-12);
        }
    }
}
