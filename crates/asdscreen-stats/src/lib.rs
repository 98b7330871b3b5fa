//! Statistical utilities for the asdscreen project.
//!
//! This crate provides the statistical building blocks used by the analysis
//! crates:
//!
//! - **Explicit measures**: [`measure::Measure`] distinguishes computed values
//!   from undefined, unavailable and never-computed statistics
//! - **Rates**: [`rate::Rate`] keeps numerator and denominator counts alongside the ratio
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Percentiles**: percentiles interpolated between closest ranks
//! - **Frequency tables**: per-value counts over a closed integer domain
//! - **Correlation**: Pearson/phi coefficients and correlation matrices
//! - **Hypothesis tests**: Kruskal–Wallis and χ² independence tests
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use asdscreen_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Rates with an explicit undefined case
//!
//! ```
//! use asdscreen_stats::rate::Rate;
//!
//! let rate = Rate::from_observations([Some(true), Some(false), None]);
//! assert_eq!(rate.trials, 2);
//! assert!(Rate::new(0, 0).value.is_undefined());
//! ```
//!
//! ## Comparing groups
//!
//! ```
//! use asdscreen_stats::hypothesis::chi_square_independence;
//!
//! // rows: groups, columns: outcome no/yes
//! let table = vec![vec![150, 142], vec![55, 49], vec![515, 189]];
//! let test = chi_square_independence(&table);
//! assert!(test.value().unwrap().p_value < 0.05);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod frequency;
pub mod hypothesis;
pub mod measure;
pub mod percentiles;
pub mod rate;
