/////////////////////////////TESTS////////////////////////////////////////////////////
/*
document level tests:
Basic parsing test
Mixed type parsing test
Template usage test
Empty document test
Malformed document test
Comments and quoted expressions
File-based parsing test
Task file to TaskConfig
*/

#[cfg(test)]
mod tests1 {
    use crate::Utils::task_parser::{
        Value, parse_document, parse_document_as_strings, parse_task_document, template_from,
    };

    #[test]
    fn test_parse_document_basic() {
        let input = "title1\n key1: value1, value2\n key2: value3\ntitle2\n key3: value4, value5";
        let (remaining, result) = parse_document(input).unwrap();
        assert_eq!(remaining, "");
        assert_eq!(result.len(), 2);
        assert_eq!(
            result["title1"]["key1"],
            Some(vec![
                Value::String("value1".to_string()),
                Value::String("value2".to_string())
            ])
        );
        assert_eq!(
            result["title2"]["key3"].as_ref().unwrap()[1],
            Value::String("value5".to_string())
        );
    }

    #[test]
    fn test_parse_document_with_mixed_types() {
        let input = "solver\n method: rk4\n step: 0.05\n n_steps: 40\nconvergence\n log_scale: false";
        let result = parse_task_document(input, None).unwrap();
        assert_eq!(
            result["solver"]["method"],
            Some(vec![Value::String("rk4".to_string())])
        );
        assert_eq!(result["solver"]["step"], Some(vec![Value::Float(0.05)]));
        assert_eq!(result["solver"]["n_steps"], Some(vec![Value::Integer(40)]));
        assert_eq!(
            result["convergence"]["log_scale"],
            Some(vec![Value::Boolean(false)])
        );
    }

    #[test]
    fn test_several_pairs_on_one_line() {
        let input = "problem t0: 0 y0: -1.5 t_end: 2";
        let result = parse_task_document(input, None).unwrap();
        let problem = &result["problem"];
        assert_eq!(problem.len(), 3);
        assert_eq!(problem["t0"], Some(vec![Value::Integer(0)]));
        assert_eq!(problem["y0"], Some(vec![Value::Float(-1.5)]));
        assert_eq!(problem["t_end"], Some(vec![Value::Integer(2)]));
    }

    #[test]
    fn test_parse_document_with_template() {
        let input = "solver\n method: euler";
        let template = template_from(&[
            ("solver", &["method", "step"]),
            ("output", &["csv"]),
        ]);
        let result = parse_task_document(input, Some(&template)).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result["solver"]["step"].is_none());
        assert!(result["output"]["csv"].is_none());
        assert!(result["solver"]["method"].is_some());
    }

    #[test]
    fn test_parse_document_empty() {
        assert!(parse_task_document("", None).is_err());
        assert!(parse_task_document("// only a comment\n# and another", None).is_err());
    }

    #[test]
    fn test_parse_document_malformed() {
        let input = "title1\n key1: value1, \n invalid structure";
        assert!(parse_task_document(input, None).is_err());
        // a title without any key
        assert!(parse_task_document("problem\nsolver method: rk4", None).is_err());
    }

    #[test]
    fn test_comments_and_quoted_expressions() {
        let input = r#"
        // the right-hand side contains commas and spaces
        problem
          # quoted so the comma is not a separator
          function: "max(y, 0) - 0.5*t"
          solution: "exp(-t)"
        ; trailing comment
        "#;
        let result = parse_task_document(input, None).unwrap();
        assert_eq!(
            result["problem"]["function"],
            Some(vec![Value::String("max(y, 0) - 0.5*t".to_string())])
        );
        assert_eq!(
            result["problem"]["solution"].as_ref().unwrap()[0].as_string().unwrap(),
            "exp(-t)"
        );
    }

    #[test]
    fn test_parse_document_as_strings() {
        let input = "convergence\n step_sizes: 0.1, 0.05\n methods: euler, rk4";
        let result = parse_document_as_strings(input).unwrap();
        assert_eq!(
            result["convergence"]["step_sizes"],
            Some(vec!["0.1".to_string(), "0.05".to_string()])
        );
        assert_eq!(
            result["convergence"]["methods"],
            Some(vec!["euler".to_string(), "rk4".to_string()])
        );
    }
}

#[cfg(test)]
mod tests2 {
    use crate::Utils::task_config::{TaskConfig, TaskKind};
    use crate::Utils::task_parser::parse_document_as_strings;
    use crate::numerical::ExplicitFixedStep::steppers::Method;
    use crate::numerical::ode_errors::OdeError;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_parse_document_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("task.txt");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "solver").unwrap();
        writeln!(file, "  method: heun").unwrap();
        writeln!(file, "convergence").unwrap();
        writeln!(file, "  step_sizes: 0.2, 0.1").unwrap();
        drop(file);

        let contents = std::fs::read_to_string(&file_path).unwrap();
        let result = parse_document_as_strings(&contents).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["solver"]["method"], Some(vec!["heun".to_string()]));
        assert_eq!(
            result["convergence"]["step_sizes"],
            Some(vec!["0.2".to_string(), "0.1".to_string()])
        );
    }

    #[test]
    fn test_task_config_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("convergence.task");
        let mut file = File::create(&file_path).unwrap();
        write!(
            file,
            r#"
// convergence study of the logistic equation
task
  kind: convergence
  loglevel: warn
problem
  function: "y*(1 - y/10)"
  solution: "10/(1 + 9*exp(-t))"
  t0: 0 y0: 1 t_end: 2
convergence
  methods: euler, RK4
  step_sizes: 0.1, 0.05, 0.02
  log_scale: false
  reference_refinement: 20
output
  csv: sweep.csv
"#
        )
        .unwrap();
        drop(file);

        let config = TaskConfig::from_file(&file_path).unwrap();
        assert_eq!(config.kind, TaskKind::Convergence);
        assert_eq!(config.loglevel.as_deref(), Some("warn"));
        assert_eq!(config.problem.solution.as_deref(), Some("10/(1 + 9*exp(-t))"));
        assert_eq!(config.t_end().unwrap(), 2.0);
        assert_eq!(config.convergence.methods, vec![Method::Euler, Method::RK4]);
        assert_eq!(config.convergence.step_sizes, Some(vec![0.1, 0.05, 0.02]));
        assert!(!config.convergence.log_scale);
        assert_eq!(config.convergence.reference_refinement, 20.0);
        assert_eq!(config.output.csv, Some(PathBuf::from("sweep.csv")));
        assert_eq!(config.method_names(), vec!["euler", "rk4"]);
    }

    #[test]
    fn test_task_config_missing_file() {
        let dir = tempdir().unwrap();
        let err = TaskConfig::from_file(dir.path().join("absent.task")).unwrap_err();
        assert!(matches!(err, OdeError::Io(_)));
    }
}
