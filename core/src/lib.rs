//! Named collections of geographic reference regions that are fetched from
//! a remote archive on first use and derived into cached views.

pub mod collection;
pub mod dataset;
pub mod defined;
pub mod regions;
pub mod remote;
pub mod util;
