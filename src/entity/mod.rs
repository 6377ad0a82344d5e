pub mod attrs;
pub mod derived;
pub mod descriptor;
pub mod network;
pub mod proxy;

pub use attrs::{AttrFilter, Attribute};
pub use descriptor::Descriptor;
pub use network::is_private;
pub use proxy::EntityProxy;
