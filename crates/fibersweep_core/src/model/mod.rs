mod array;
mod node;
mod value;

pub use array::{ArrayData, DType, NdArray};
pub use node::ModelNode;
pub use value::{Complex, Value, ValueMap};
