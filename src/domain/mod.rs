// Domain layer - Pure models and transformations
pub mod board;
pub mod channel;
pub mod mode;
pub mod sample;
pub mod threshold;
pub mod variable;
