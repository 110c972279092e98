pub mod checklist;
pub mod interchange;
pub mod model;
pub mod risk;
