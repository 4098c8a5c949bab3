pub mod deposits;
pub mod inflation;
pub mod lumpsum;
pub mod sip;

/// Longest investment horizon accepted, in years.
pub const MAX_YEARS: u32 = 100;
