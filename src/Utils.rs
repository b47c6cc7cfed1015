//! different utility modules used throughout the project
/// tiny module to start logging and save results into csv files
pub mod logger;
/// pretty-printing of trajectories, error summaries and convergence sweeps
pub mod tables;
/// typed task (problem, solver, convergence study, output) read from a task document
pub mod task_config;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
///
mod task_parser_tests;
