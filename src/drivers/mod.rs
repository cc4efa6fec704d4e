//! Device register maps and value encoding.

pub mod pca9685;
