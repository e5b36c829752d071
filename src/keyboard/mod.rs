pub mod display;
pub mod finger;
pub mod layout;
pub mod model;
