pub mod model;
pub mod results;
pub mod validation;

pub use model::*;
pub use results::*;
pub use validation::*;
