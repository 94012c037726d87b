//! # Metadata Table Types Module
//!
//! The shared infrastructure of every metadata table: table identifiers, coded indexes,
//! index width computation and the row (de)serialization traits.
//!
//! - [`TableId`]: Enumeration of all metadata table types
//! - [`CodedIndex`] and [`CodedIndexType`]: Compact cross-table references
//! - [`TableInfo`] and [`TableInfoRef`]: Row counts and the index widths they imply
//! - [`RowReadable`] / [`RowWritable`]: How a row is parsed from and written to `#~`
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Partition II, Section 22

mod codedindex;
mod tableid;
mod tableinfo;
mod traits;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};
pub use traits::{RowReadable, RowWritable};
