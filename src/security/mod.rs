/*!
 * Side-channel protections used by tag verification
 */

pub mod constant_time;

pub use constant_time::{
    measure_comparison_timing, tags_equal, ComparisonTiming, ComparisonTimingConfig,
};
