mod hints;
mod stage;
mod state;

pub use hints::*;
pub use stage::*;
pub use state::*;
