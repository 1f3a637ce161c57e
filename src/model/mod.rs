pub mod bacterium {
    pub use capsim_core::bacterium::*;
}
pub mod behavior {
    pub use capsim_core::behavior::*;
}
pub mod config {
    pub use capsim_core::config::*;
}
pub mod environment {
    pub use capsim_core::environment::*;
}
pub mod field {
    pub use capsim_core::field::*;
}
pub mod history {
    pub use capsim_core::history::*;
}
pub mod lineage_registry {
    pub use capsim_core::lineage_registry::*;
}
pub mod mover {
    pub use capsim_core::mover::*;
}
pub mod spatial_hash {
    pub use capsim_core::spatial_hash::*;
}

pub mod seeding;
pub mod world;
