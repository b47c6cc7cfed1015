/////////////////////////////TESTS////////////////////////////////////////////////////
/*
estimated order for Euler, Heun, RK4 against the analytic solution
estimated order against the auto-built reference (Euler, Heun, RK4)
reference built once per sweep, injected reference solver
default step sizes, power-law fit
errors tagged with the failing step size
method comparison: ordering, analytic failure, truncated grid
parallel sweep of several methods
*/
#[cfg(test)]
mod tests {
    use crate::numerical::ExplicitFixedStep::steppers::{FixedStepSolver, Method, RK4, SolverFactory};
    use crate::numerical::convergence::{ConvergenceAnalysis, estimate_order, fit_power_law};
    use crate::numerical::ode_errors::OdeError;
    use crate::symbolic::function_evaluator::{FunctionParser, ScalarFn, SymbolicParser};
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RK4_STEP_SIZES: [f64; 7] = [0.5, 0.2, 0.1, 0.05, 0.02, 0.01, 0.005];

    #[test]
    fn test_estimated_order_with_analytic_solution() {
        let analysis = ConvergenceAnalysis::new();
        for (method, order) in [("euler", 1.0), ("heun", 2.0)] {
            let sweep = analysis
                .analyze_step_size(method, "y", 0.0, 1.0, 1.0, Some("exp(t)"), None)
                .unwrap();
            assert_eq!(sweep.step_sizes.len(), 10);
            assert_eq!(sweep.errors.len(), sweep.step_sizes.len());
            let estimated = sweep.estimated_order.unwrap();
            assert!(
                (estimated - order).abs() < 0.3,
                "{}: estimated order {}",
                method,
                estimated
            );
        }
    }

    #[test]
    fn test_rk4_estimated_order() {
        // default step sizes reach round-off for RK4, so a coarser range is used
        let analysis = ConvergenceAnalysis::new();
        let sweep = analysis
            .analyze_step_size("rk4", "y", 0.0, 1.0, 1.0, Some("exp(t)"), Some(&RK4_STEP_SIZES))
            .unwrap();
        let estimated = sweep.estimated_order.unwrap();
        assert!((estimated - 4.0).abs() < 0.3, "estimated order {}", estimated);
        // errors shrink with h
        assert!(sweep.errors.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_estimated_order_with_reference_solution() {
        let analysis = ConvergenceAnalysis::new();
        for (method, order) in [("euler", 1.0), ("heun", 2.0)] {
            let sweep = analysis
                .analyze_step_size(method, "y", 0.0, 1.0, 1.0, None, None)
                .unwrap();
            let estimated = sweep.estimated_order.unwrap();
            assert!(
                (estimated - order).abs() < 0.3,
                "{}: estimated order {}",
                method,
                estimated
            );
        }
    }

    #[test]
    fn test_rk4_estimated_order_with_reference_solution() {
        // the reference must reach t_end, a clamped tail would flatten the RK4 errors
        let analysis = ConvergenceAnalysis::new();
        let sweep = analysis
            .analyze_step_size("rk4", "y", 0.0, 1.0, 1.0, None, Some(&RK4_STEP_SIZES))
            .unwrap();
        let estimated = sweep.estimated_order.unwrap();
        assert!((estimated - 4.0).abs() < 0.3, "estimated order {}", estimated);
        let exact = analysis
            .analyze_step_size("rk4", "y", 0.0, 1.0, 1.0, Some("exp(t)"), Some(&RK4_STEP_SIZES))
            .unwrap();
        for (against_reference, against_exact) in sweep.errors.iter().zip(exact.errors.iter()) {
            assert_relative_eq!(
                *against_reference,
                *against_exact,
                epsilon = 1e-12,
                max_relative = 1e-2
            );
        }
    }

    #[test]
    fn test_reference_failure_carries_reference_step_size() {
        // y' = ln(y) drives y from 0.5 to zero well before t = 2
        let mut analysis = ConvergenceAnalysis::new();
        analysis.set_reference_refinement(10.0).unwrap();
        let err = analysis
            .analyze_step_size("euler", "ln(y)", 0.0, 0.5, 2.0, None, Some(&[0.1]))
            .err()
            .unwrap();
        match &err {
            OdeError::AtStepSize { h, .. } => assert_relative_eq!(*h, 0.01, epsilon = 1e-15),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(err.root_cause(), OdeError::FunctionEvaluation { .. }));
    }

    #[test]
    fn test_reference_factory_called_once_per_sweep() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let factory: SolverFactory = Arc::new(move || -> Box<dyn FixedStepSolver + Send + Sync> {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(RK4)
        });
        let analysis = ConvergenceAnalysis::new().with_reference_factory(factory);
        let sweep = analysis
            .analyze_step_size("euler", "-0.5*y", 0.0, 2.0, 2.0, None, Some(&[0.1, 0.05, 0.02]))
            .unwrap();
        assert_eq!(sweep.errors.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // an analytic solution needs no reference
        analysis
            .analyze_step_size("euler", "-0.5*y", 0.0, 2.0, 2.0, Some("2*exp(-0.5*t)"), Some(&[0.1]))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reference_solver_is_the_measure() {
        // with Euler as its own reference at the same step, the error vanishes
        let factory: SolverFactory =
            Arc::new(|| -> Box<dyn FixedStepSolver + Send + Sync> { Box::new(Method::Euler.solver()) });
        let mut analysis = ConvergenceAnalysis::new().with_reference_factory(factory);
        analysis.set_reference_refinement(10.0).unwrap();
        let sweep = analysis
            .analyze_step_size("euler", "0", 0.0, 1.0, 1.0, None, Some(&[0.1, 0.01]))
            .unwrap();
        assert_eq!(sweep.errors, vec![0.0, 0.0]);
        assert_eq!(sweep.estimated_order, None);
    }

    #[test]
    fn test_default_step_sizes() {
        let mut analysis = ConvergenceAnalysis::new();
        let log_sizes = analysis.default_step_sizes();
        assert_eq!(log_sizes.len(), 10);
        assert_relative_eq!(log_sizes[0], 1e-4, max_relative = 1e-12);
        assert_relative_eq!(log_sizes[9], 1e-1, max_relative = 1e-12);
        assert_relative_eq!(log_sizes[1] / log_sizes[0], 10f64.powf(1.0 / 3.0), max_relative = 1e-12);

        analysis.set_log_scale(false);
        let lin_sizes = analysis.default_step_sizes();
        assert_relative_eq!(lin_sizes[0], 0.001, epsilon = 1e-15);
        assert_relative_eq!(lin_sizes[9], 0.1, epsilon = 1e-15);
        assert_relative_eq!(lin_sizes[1] - lin_sizes[0], 0.011, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_power_law() {
        let h = [0.1, 0.05, 0.02, 0.01];
        let errors: Vec<f64> = h.iter().map(|h| 3.0 * h * h).collect();
        let fit = fit_power_law(&h, &errors).unwrap();
        assert_relative_eq!(fit.order, 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 3f64.log10(), epsilon = 1e-10);
        assert_relative_eq!(fit.predict(0.2), 0.12, max_relative = 1e-10);

        // fewer than two usable distinct step sizes
        assert_eq!(estimate_order(&[0.1], &[0.01]), None);
        assert_eq!(estimate_order(&[0.1, 0.1], &[0.01, 0.02]), None);
        assert_eq!(estimate_order(&[0.1, 0.05], &[0.01, 0.0]), None);
        assert_eq!(estimate_order(&[], &[]), None);
        // zero errors are skipped, the rest is still fitted
        let order = estimate_order(&[0.1, 0.05, 0.01], &[0.1, 0.05, 0.0]).unwrap();
        assert_relative_eq!(order, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_single_step_size_has_no_order() {
        let analysis = ConvergenceAnalysis::new();
        let sweep = analysis
            .analyze_step_size("heun", "y", 0.0, 1.0, 1.0, Some("exp(t)"), Some(&[0.1]))
            .unwrap();
        assert_eq!(sweep.errors.len(), 1);
        assert!(sweep.estimated_order.is_none());
        assert!(sweep.fit.is_none());
    }

    #[test]
    fn test_errors_carry_step_size() {
        let analysis = ConvergenceAnalysis::new();
        let err = analysis
            .analyze_step_size("euler", "y", 0.0, 1.0, 1.0, Some("exp(t)"), Some(&[0.1, 2.0]))
            .err()
            .unwrap();
        match &err {
            OdeError::AtStepSize { h, source } => {
                assert_eq!(*h, 2.0);
                assert!(matches!(**source, OdeError::InvalidParameter(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }

        // ln(y) breaks down once Euler drives y below zero
        let err = analysis
            .analyze_step_size("euler", "ln(y)", 0.0, 0.5, 1.0, Some("exp(t)"), Some(&[0.1]))
            .err()
            .unwrap();
        assert!(err.is_function_evaluation_error());
        assert!(matches!(err, OdeError::AtStepSize { h, .. } if h == 0.1));
        assert!(matches!(err.root_cause(), OdeError::FunctionEvaluation { step: 5, .. }));
    }

    #[test]
    fn test_invalid_sweep_requests() {
        let analysis = ConvergenceAnalysis::new();
        assert!(matches!(
            analysis.analyze_step_size("bdf", "y", 0.0, 1.0, 1.0, None, None),
            Err(OdeError::UnsupportedMethod { .. })
        ));
        for sizes in [&[][..], &[0.1, -0.01][..], &[f64::NAN][..]] {
            assert!(matches!(
                analysis.analyze_step_size("euler", "y", 0.0, 1.0, 1.0, None, Some(sizes)),
                Err(OdeError::InvalidParameter(_))
            ));
        }
        assert!(matches!(
            analysis.analyze_step_size("euler", "y", 1.0, 1.0, 0.0, None, None),
            Err(OdeError::InvalidParameter(_))
        ));
        let bad_parse = analysis
            .analyze_step_size("euler", "y*(", 0.0, 1.0, 1.0, None, None)
            .err()
            .unwrap();
        assert!(bad_parse.is_function_evaluation_error());

        let mut analysis = ConvergenceAnalysis::new();
        assert!(analysis.set_reference_refinement(5.0).is_err());
        assert!(analysis.set_reference_refinement(f64::NAN).is_err());
        assert!(analysis.set_reference_refinement(20.0).is_ok());
        assert_eq!(analysis.reference_refinement(), 20.0);
    }

    #[test]
    fn test_compare_methods_default_all() {
        let analysis = ConvergenceAnalysis::new();
        let comparison = analysis
            .compare_methods("y", 0.0, 1.0, 1.0, Some("exp(t)"), None, 0.1)
            .unwrap();
        let methods: Vec<Method> = comparison.results.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![Method::Euler, Method::Heun, Method::RK4]);
        assert_eq!(comparison.t_values.len(), 11);
        assert!(comparison.results.iter().all(|(_, y)| y.len() == 11));
        assert!(comparison.analytic_values.is_some());
        assert!(comparison.analytic_error.is_none());

        let max = |m: Method| comparison.error_report(m).unwrap().max;
        assert!(max(Method::Euler) > max(Method::Heun));
        assert!(max(Method::Heun) > max(Method::RK4));
        assert_relative_eq!(
            comparison.get(Method::Heun).unwrap()[10],
            1.105f64.powi(10),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_compare_methods_keeps_numeric_results_when_analytic_fails() {
        let analysis = ConvergenceAnalysis::new();
        let comparison = analysis
            .compare_methods("-y", 0.0, 1.0, 1.0, Some("ln(t - 0.5)"), Some(&["rk4", "euler"]), 0.25)
            .unwrap();
        let methods: Vec<Method> = comparison.results.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![Method::RK4, Method::Euler]);
        assert!(comparison.analytic_values.is_none());
        assert!(comparison.error_reports.is_empty());
        assert!(matches!(
            comparison.analytic_error,
            Some(OdeError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_compare_methods_truncated_grid() {
        let analysis = ConvergenceAnalysis::new();
        let comparison = analysis
            .compare_methods("t", 0.0, 0.0, 1.0, Some("t^2/2"), Some(&["heun"]), 0.3)
            .unwrap();
        // floor(1/0.3) = 3 steps, the grid stops short of t_end
        assert_eq!(comparison.t_values.len(), 4);
        assert_relative_eq!(comparison.t_values[3], 0.9, epsilon = 1e-12);
        // Heun integrates a linear slope exactly
        assert!(comparison.error_report(Method::Heun).unwrap().max < 1e-14);
        assert!(matches!(
            analysis.compare_methods("t", 0.0, 0.0, 1.0, None, Some(&["leapfrog"]), 0.1),
            Err(OdeError::UnsupportedMethod { .. })
        ));
        assert!(matches!(
            analysis.compare_methods("t", 0.0, 0.0, 1.0, None, None, 1.5),
            Err(OdeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_analyze_methods_in_parallel() {
        let analysis = ConvergenceAnalysis::new();
        let sweeps = analysis
            .analyze_methods(&["heun", "euler"], "y", 0.0, 1.0, 1.0, Some("exp(t)"), None)
            .unwrap();
        assert_eq!(sweeps.len(), 2);
        assert_eq!(sweeps[0].method, Method::Heun);
        assert_eq!(sweeps[1].method, Method::Euler);
        assert!((sweeps[0].estimated_order.unwrap() - 2.0).abs() < 0.3);
        assert!((sweeps[1].estimated_order.unwrap() - 1.0).abs() < 0.3);

        let all = analysis
            .analyze_methods(&[], "-0.5*y", 0.0, 1.0, 1.0, Some("exp(-0.5*t)"), Some(&RK4_STEP_SIZES))
            .unwrap();
        assert_eq!(all.len(), 3);
        let err = analysis
            .analyze_methods(&["euler", "nope"], "y", 0.0, 1.0, 1.0, None, None)
            .err()
            .unwrap();
        assert!(matches!(err, OdeError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_custom_parser_injection() {
        // parser that ignores the text and always returns the slope y
        struct Fixed;
        impl FunctionParser for Fixed {
            fn parse(&self, _expr: &str, vars: &[&str]) -> Result<ScalarFn, OdeError> {
                if vars.len() == 2 {
                    Ok(Arc::new(|args: &[f64]| args[1]))
                } else {
                    SymbolicParser.parse("exp(t)", vars)
                }
            }
        }
        let analysis = ConvergenceAnalysis::new().with_parser(Arc::new(Fixed));
        let sweep = analysis
            .analyze_step_size("euler", "anything", 0.0, 1.0, 1.0, Some("ignored"), None)
            .unwrap();
        assert!((sweep.estimated_order.unwrap() - 1.0).abs() < 0.3);
    }
}
