//! Property-based tests for the modular layer.

#[cfg(test)]
mod tests {
    use num_traits::One;
    use proptest::prelude::*;
    use quintus_ball::BallComplex;
    use quintus_exact::Integer;

    use crate::reduce::reduce_fundamental;
    use crate::transform::ModularGroupElement;

    /// Random group element as a word in S and T; keeps entries tame.
    fn word_element(word: &[(bool, i8)]) -> ModularGroupElement {
        let mut g = ModularGroupElement::identity();
        for &(invert, shift) in word {
            if invert {
                g = g.compose(&ModularGroupElement::inversion());
            }
            let t = ModularGroupElement::translation(&Integer::new(i64::from(shift)));
            g = g.compose(&t);
        }
        g
    }

    fn word_strategy() -> impl Strategy<Value = Vec<(bool, i8)>> {
        prop::collection::vec((any::<bool>(), -6i8..=6), 0..6)
    }

    proptest! {
        #[test]
        fn group_determinant_exact(w in word_strategy()) {
            let g = word_element(&w);
            let (a, b, c, d) = g.entries();
            let det = &(a * d) - &(b * c);
            prop_assert!(det.is_one());
        }

        #[test]
        fn group_associativity(
            w1 in word_strategy(),
            w2 in word_strategy(),
            w3 in word_strategy(),
        ) {
            let f = word_element(&w1);
            let g = word_element(&w2);
            let h = word_element(&w3);
            prop_assert_eq!(
                f.compose(&g).compose(&h),
                f.compose(&g.compose(&h))
            );
        }

        #[test]
        fn group_inverse_is_identity(w in word_strategy()) {
            let g = word_element(&w);
            prop_assert!(g.compose(&g.inverse()).is_identity());
            prop_assert!(g.inverse().compose(&g).is_identity());
        }

        #[test]
        fn action_respects_composition(
            w1 in word_strategy(),
            w2 in word_strategy(),
            re in -3.0f64..3.0,
            im in 0.05f64..4.0,
        ) {
            let f = word_element(&w1);
            let g = word_element(&w2);
            let z = BallComplex::from_f64_pair(re, im, 160);
            let lhs = f.compose(&g).apply(&z, 160);
            let rhs = f.apply(&g.apply(&z, 160), 160);
            prop_assert!(lhs.overlaps(&rhs));
        }

        #[test]
        fn reduction_lands_in_domain(
            re in -8.0f64..8.0,
            im in 0.02f64..6.0,
        ) {
            let eps = 1.0e-9;
            let z = BallComplex::from_f64_pair(re, im, 160);
            let (g, w) = reduce_fundamental(&z, eps, 160);
            prop_assert!(w.is_finite());
            // eps-relaxed domain membership, checked generously.
            let re_hi = w.re().upper_mag().to_f64();
            prop_assert!(re_hi <= 0.5 + 1.0e-6);
            let r2 = w.norm_sq(160).lower_mag().to_f64();
            prop_assert!(r2 >= (1.0 - 1.0e-6) * (1.0 - 1.0e-6));
            // And the transform actually maps z there.
            let back = g.inverse().apply(&w, 160);
            prop_assert!(back.overlaps(&z));
        }

        #[test]
        fn epsilon_arg_in_range(w in word_strategy()) {
            let g = word_element(&w);
            let e = crate::dedekind::epsilon_arg(&g);
            prop_assert!((0..24).contains(&e));
        }

        #[test]
        fn eta_transformation_law(
            w in word_strategy(),
            re in -0.5f64..0.5,
            im in 0.4f64..1.6,
        ) {
            // eta(g tau) = eps(g) (c tau + d)^(1/2) eta(tau), with the
            // epsilon predicted exactly from the Dedekind sum.
            let prec = 160;
            let g = word_element(&w);
            let tau = BallComplex::from_f64_pair(re, im, prec);
            let lhs = crate::functions::eta(&g.apply(&tau, prec), prec);
            let eps = BallComplex::root_of_unity_24(
                crate::dedekind::epsilon_arg(&g),
                prec,
            );
            let rhs = eps
                .mul(&g.cocycle(&tau, prec).sqrt(prec), prec)
                .mul(&crate::functions::eta(&tau, prec), prec);
            prop_assert!(lhs.overlaps(&rhs));
        }

        #[test]
        fn g4_automorphy_law(
            w in word_strategy(),
            re in -0.5f64..0.5,
            im in 0.4f64..1.6,
        ) {
            // Weight 4: G4(g tau) = (c tau + d)^4 G4(tau).
            let prec = 160;
            let g = word_element(&w);
            let tau = BallComplex::from_f64_pair(re, im, prec);
            let lhs = crate::functions::eisenstein_g4(&g.apply(&tau, prec), prec);
            let cz4 = g.cocycle(&tau, prec).pow_i(4, prec);
            let rhs = cz4.mul(&crate::functions::eisenstein_g4(&tau, prec), prec);
            prop_assert!(lhs.overlaps(&rhs));
        }
    }
}
