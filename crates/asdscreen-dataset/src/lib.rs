//! Loading and normalization of AQ-10 screening records.
//!
//! Each age group comes from its own CSV source with its own quirks. This
//! crate turns those sources into one canonical record shape:
//!
//! 1. [`loader`] reads a source into [`RawRecord`](record::RawRecord)s,
//!    skipping and counting malformed rows.
//! 2. [`normalize`] maps raw labels onto the canonical vocabularies using the
//!    group's [`GroupEncoding`](encoding::GroupEncoding).
//! 3. [`dataset::GroupDataset`] ties both steps together and keeps the drop
//!    counts and the sample-size check.
//!
//! # Example
//!
//! ```
//! use asdscreen_dataset::{
//!     dataset::GroupDataset, encoding::GroupEncoding, group::AgeGroup, loader,
//! };
//!
//! let csv = "\
//! A1_Score,A2_Score,A3_Score,A4_Score,A5_Score,A6_Score,A7_Score,A8_Score,A9_Score,A10_Score,\
//! age,gender,ethnicity,jundice,austim,contry_of_res,used_app_before,result,age_desc,relation,Class/ASD
//! 1,1,0,0,1,1,0,1,0,0,6,m,Others,no,no,Jordan,no,5,4-11 years,Parent,NO
//! ";
//! let encoding = GroupEncoding::reference(AgeGroup::Child);
//! let source = loader::load_reader(AgeGroup::Child, csv.as_bytes(), &encoding).unwrap();
//! let dataset = GroupDataset::from_source(&source, &encoding);
//! assert_eq!(dataset.len(), 1);
//! assert_eq!(dataset.records[0].score, Some(5));
//! ```

pub mod dataset;
pub mod encoding;
pub mod group;
pub mod loader;
pub mod normalize;
pub mod record;
pub mod vocabulary;
