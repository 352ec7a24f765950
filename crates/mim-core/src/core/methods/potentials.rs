const MIN_DISTANCE: f64 = 1e-6;
const OVERLAP_ENERGY: f64 = 1e10;

/// Lennard-Jones 12-6 energy in the `r_min` form: `ε[(r_min/r)^12 - 2(r_min/r)^6]`.
#[inline]
pub fn lennard_jones_12_6(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    if dist < MIN_DISTANCE {
        return OVERLAP_ENERGY;
    }
    let rho6 = (r_min / dist).powi(6);
    well_depth * (rho6 * rho6 - 2.0 * rho6)
}

/// Radial derivative `dE/dr` of [`lennard_jones_12_6`].
///
/// Zero below the overlap guard distance, where the energy is clamped.
#[inline]
pub fn lennard_jones_12_6_dr(dist: f64, r_min: f64, well_depth: f64) -> f64 {
    if dist < MIN_DISTANCE {
        return 0.0;
    }
    let rho6 = (r_min / dist).powi(6);
    12.0 * well_depth * (rho6 - rho6 * rho6) / dist
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn energy_at_minimum_is_negative_well_depth() {
        assert!((lennard_jones_12_6(2.0, 2.0, 10.0) + 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn energy_is_clamped_at_overlap() {
        assert_eq!(lennard_jones_12_6(1e-7, 2.0, 10.0), OVERLAP_ENERGY);
        assert_eq!(lennard_jones_12_6_dr(1e-7, 2.0, 10.0), 0.0);
    }

    #[test]
    fn derivative_vanishes_at_minimum() {
        assert!(lennard_jones_12_6_dr(2.0, 2.0, 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn derivative_matches_central_difference() {
        let (r, h) = (2.3, 1e-6);
        let numeric =
            (lennard_jones_12_6(r + h, 2.0, 0.5) - lennard_jones_12_6(r - h, 2.0, 0.5)) / (2.0 * h);
        assert!((numeric - lennard_jones_12_6_dr(r, 2.0, 0.5)).abs() < 1e-6);
    }

    #[test]
    fn derivative_sign_is_repulsive_inside_and_attractive_outside() {
        assert!(lennard_jones_12_6_dr(1.8, 2.0, 1.0) < 0.0);
        assert!(lennard_jones_12_6_dr(2.5, 2.0, 1.0) > 0.0);
    }
}
