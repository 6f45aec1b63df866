use error_chain::*;

error_chain! {

    errors {
        InvalidDimension(axis: &'static str, value: usize) {
            description("grid dimension out of range")
            display("grid {} must be at least 1 cell, got {}", axis, value)
        }
        InvalidInterval(milliseconds: u64) {
            description("carve tick interval out of range")
            display("carve tick interval must be greater than zero, got {}ms", milliseconds)
        }
    }
}
