pub mod activations;
pub mod losses;
pub mod topology;
pub mod weights;
pub mod network;
pub mod forward;
pub mod backpropagation;
pub mod cases;
pub mod population;
pub mod training;

pub mod prelude {
    pub use super::activations::*;
    pub use super::losses::*;
    pub use super::topology::*;
    pub use super::weights::*;
    pub use super::network::Network;
    pub use super::backpropagation::*;
    pub use super::cases::*;
    pub use super::population::*;
    pub use super::training::*;
}
