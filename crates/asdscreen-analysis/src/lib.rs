//! Comparative metrics over AQ-10 screening records.
//!
//! This crate computes per-group metrics from normalized records and
//! assembles them into a [`ComparativeModel`](report::ComparativeModel) that
//! can be queried and compared across the child, adolescent and adult groups.
//!
//! # Overview
//!
//! Per group, [`report::GroupReport::compute`] runs:
//!
//! - [`detection`]: overall and gender-stratified detection rates
//! - [`score`]: score frequencies, summary statistics and quartiles
//! - [`items`]: per-item response rates, discriminative power, phi, and the
//!   item/score correlation matrix
//! - [`risk`]: relative risk and odds ratio of family history and jaundice
//! - [`importance`]: standardized logistic-regression coefficients and a
//!   holdout evaluation of the same model
//! - [`demographics`]: age, categorical counts and flag prevalences
//!
//! Across groups, [`comparison`] runs the Kruskal–Wallis test on the score and
//! χ² tests of independence on the outcome and jaundice.
//!
//! [`pipeline::Pipeline`] drives load, normalization and analysis for the
//! three sources, in parallel by default.
//!
//! # Non-values
//!
//! Every statistic that can be absent is a
//! [`Measure`](asdscreen_stats::measure::Measure). Metrics never silently turn
//! a zero denominator into `0.0`; lookups of metrics that were not computed
//! return [`Measure::NotComputed`](asdscreen_stats::measure::Measure::NotComputed).
//!
//! # Example
//!
//! ```
//! use asdscreen_analysis::{
//!     config::AnalysisConfig,
//!     metric::MetricKey,
//!     report::{ComparativeModel, GroupReport},
//! };
//! use asdscreen_dataset::{
//!     dataset::GroupDataset, encoding::GroupEncoding, group::AgeGroup, loader,
//! };
//!
//! let csv = "\
//! A1_Score,A2_Score,A3_Score,A4_Score,A5_Score,A6_Score,A7_Score,A8_Score,A9_Score,A10_Score,\
//! age,gender,ethnicity,jundice,austim,contry_of_res,used_app_before,result,age_desc,relation,Class/ASD
//! 1,1,1,1,1,1,1,1,0,0,6,m,Others,no,yes,Jordan,no,8,4-11 years,Parent,YES
//! 1,0,0,0,1,1,0,1,0,0,7,f,Others,no,no,Jordan,no,4,4-11 years,Parent,NO
//! ";
//! let encoding = GroupEncoding::reference(AgeGroup::Child);
//! let source = loader::load_reader(AgeGroup::Child, csv.as_bytes(), &encoding).unwrap();
//! let dataset = GroupDataset::from_source(&source, &encoding);
//!
//! let config = AnalysisConfig::default();
//! let report = GroupReport::compute(&dataset, &config);
//! let generated_at = chrono::Utc::now();
//! let model = ComparativeModel::assemble(&[dataset], vec![report], vec![], &config, generated_at);
//!
//! let key: MetricKey = "detection_rate".parse().unwrap();
//! assert_eq!(model.metric(AgeGroup::Child, &key).into_value(), Some(0.5));
//! assert!(model.metric(AgeGroup::Adult, &key).into_value().is_none());
//! ```

pub mod comparison;
pub mod config;
pub mod demographics;
pub mod detection;
pub mod importance;
pub mod items;
pub mod metric;
pub mod pipeline;
pub mod report;
pub mod risk;
pub mod score;

#[cfg(test)]
mod test_util;
