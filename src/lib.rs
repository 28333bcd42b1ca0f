pub mod breakdown;
pub mod collect;
pub mod convert;
pub mod errors;
pub mod information;
pub mod input;
pub mod normalize;
pub mod output;
pub mod parallelism;
pub mod results;
pub mod scorecard;
pub mod sentinel;
pub mod table;
