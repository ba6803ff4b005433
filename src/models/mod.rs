pub mod assessment;
pub mod behavior;
pub mod recommendation;
pub mod tracking;
