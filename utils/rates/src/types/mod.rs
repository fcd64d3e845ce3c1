mod counter;
mod gauge;

pub use counter::Counter;
pub use gauge::Gauge;
