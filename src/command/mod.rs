mod copy;

pub use copy::copy;
