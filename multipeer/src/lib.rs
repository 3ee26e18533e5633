pub use multipeer_core::model::PeerId;

pub mod model {
    pub use multipeer_core::model::*;
}

#[cfg(feature = "mesh")]
pub mod mesh {
    pub use multipeer_mesh::*;
}
