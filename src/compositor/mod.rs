pub mod inputs;
pub mod scheduler;
pub mod snapshot;

pub use inputs::ChartInputs;
pub use scheduler::{Compositor, compute_subset};
pub use snapshot::{
    BasalGeometry, ChartGeometry, GeometrySubset, GlucoseGeometry, PublishedSubset,
    SubsetGeometry, SubsetState,
};
